use {
    crate::*,
    image::{DecodedImage, SubsampleRatio, encode_jpeg},
    std::{fmt, str::FromStr},
};

/// Turns decoded frames into a codec bitstream.
pub trait Encoder: Send {
    /// Encode one frame, replacing the contents of `dst`.
    ///
    /// Returns the number of bytes written. Zero means the encoder produced
    /// nothing for this frame, which is not an error.
    fn encode_frame(
        &mut self,
        dst: &mut Vec<u8>,
        image: &DecodedImage<'_>,
    ) -> Result<usize, VideoError>;

    /// Make the next frame independently decodable, where the codec has such a notion.
    fn force_keyframe(&mut self) {}

    /// Whether input must be converted to YUV 4:2:0 first.
    fn needs_yuv420(&self) -> bool {
        true
    }

    fn close(&mut self) -> Result<(), VideoError> {
        Ok(())
    }
}

/// Output codec selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    H264,
    Vp8,
    Vp9,
    I420,
    Mjpeg,
}

impl Codec {
    /// RTP payload type used when streaming this codec.
    pub fn payload_type(&self) -> u8 {
        match self {
            Codec::H264 => 125,
            Codec::Vp8 => 100,
            Codec::Vp9 => 101,
            Codec::I420 => 96,
            Codec::Mjpeg => 26,
        }
    }

    /// Whether this codec's encoder only takes YUV 4:2:0 input.
    pub fn needs_yuv420(&self) -> bool {
        !matches!(self, Codec::Mjpeg)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::Vp8 => "vp8",
            Codec::Vp9 => "vp9",
            Codec::I420 => "i420",
            Codec::Mjpeg => "mjpeg",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = VideoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h264" | "264" => Ok(Codec::H264),
            "vp8" => Ok(Codec::Vp8),
            "vp9" => Ok(Codec::Vp9),
            "i420" => Ok(Codec::I420),
            "mjpeg" | "mjpg" | "jpeg" => Ok(Codec::Mjpeg),
            _ => Err(VideoError::Config(format!("unknown codec {s:?}"))),
        }
    }
}

/// Build the encoder for `codec` at the session's geometry and rate.
pub fn create_encoder(
    codec: Codec,
    property: &SessionProperty,
    bitrate: u32,
    quality: u8,
) -> Result<Box<dyn Encoder>, VideoError> {
    match codec {
        Codec::I420 => Ok(Box::new(I420Encoder::new())),
        Codec::Mjpeg => Ok(Box::new(MjpegEncoder::new(quality))),
        Codec::H264 => h264_encoder(property, bitrate),
        Codec::Vp8 | Codec::Vp9 => Err(VideoError::Config(format!("no {codec} encoder available"))),
    }
}

#[cfg(feature = "h264")]
fn h264_encoder(
    property: &SessionProperty,
    bitrate: u32,
) -> Result<Box<dyn Encoder>, VideoError> {
    Ok(Box::new(H264Encoder::new(property, bitrate)?))
}

#[cfg(not(feature = "h264"))]
fn h264_encoder(
    _property: &SessionProperty,
    _bitrate: u32,
) -> Result<Box<dyn Encoder>, VideoError> {
    Err(VideoError::Config("built without h264 support".to_string()))
}

/// Writes planar YUV 4:2:0 frames back to back, as raw `.yuv` files expect.
#[derive(Debug, Default)]
pub struct I420Encoder;

impl I420Encoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for I420Encoder {
    fn encode_frame(
        &mut self,
        dst: &mut Vec<u8>,
        image: &DecodedImage<'_>,
    ) -> Result<usize, VideoError> {
        let image = match image {
            DecodedImage::YCbCr(image) if image.ratio == SubsampleRatio::Yuv420 => image,
            _ => {
                return Err(VideoError::Encode(
                    "I420 output needs a YUV 4:2:0 frame".to_string(),
                ));
            }
        };
        let chroma = image.ratio.chroma_size(image.size);
        dst.clear();
        dst.reserve(image.y.len() + image.cb.len() + image.cr.len());
        for row in image.y.chunks(image.y_stride.max(1)).take(image.size.y) {
            dst.extend_from_slice(&row[..image.size.x]);
        }
        for plane in [&image.cb, &image.cr] {
            for row in plane.chunks(image.c_stride.max(1)).take(chroma.y) {
                dst.extend_from_slice(&row[..chroma.x]);
            }
        }
        Ok(dst.len())
    }
}

/// Encodes every frame as a standalone JPEG.
#[derive(Debug)]
pub struct MjpegEncoder {
    quality: u8,
}

impl MjpegEncoder {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl Encoder for MjpegEncoder {
    fn encode_frame(
        &mut self,
        dst: &mut Vec<u8>,
        image: &DecodedImage<'_>,
    ) -> Result<usize, VideoError> {
        dst.clear();
        encode_jpeg(image, self.quality, &mut *dst)?;
        Ok(dst.len())
    }

    fn needs_yuv420(&self) -> bool {
        false
    }
}
