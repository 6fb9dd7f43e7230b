//! H.264 encoding through OpenH264.

use {
    crate::*,
    base::Vec2,
    image::{DecodedImage, SubsampleRatio},
    openh264::{
        OpenH264API,
        encoder::{BitRate, Encoder as OpenH264Encoder, EncoderConfig, FrameRate, RateControlMode},
        formats::YUVSlices,
    },
};

pub struct H264Encoder {
    encoder: OpenH264Encoder,
    size: Vec2<usize>,
}

impl H264Encoder {
    /// `bitrate` is in bits per second.
    pub fn new(property: &SessionProperty, bitrate: u32) -> Result<Self, VideoError> {
        let size = property.size;
        if size.is_empty() || size.x % 2 != 0 || size.y % 2 != 0 {
            return Err(VideoError::Config(format!(
                "H.264 needs even, non-zero dimensions, got {size}"
            )));
        }
        let config = EncoderConfig::new()
            .bitrate(BitRate::from_bps(bitrate))
            .max_frame_rate(FrameRate::from_hz(property.frame_rate))
            .rate_control_mode(RateControlMode::Bitrate);
        let api = OpenH264API::from_source();
        let encoder = OpenH264Encoder::with_api_config(api, config)
            .map_err(|e| VideoError::Encode(e.to_string()))?;
        log::info!("h264 encoder: {size}, {} fps, {bitrate} bps", property.frame_rate);
        Ok(Self { encoder, size })
    }
}

impl Encoder for H264Encoder {
    fn encode_frame(
        &mut self,
        dst: &mut Vec<u8>,
        image: &DecodedImage<'_>,
    ) -> Result<usize, VideoError> {
        let image = match image {
            DecodedImage::YCbCr(image)
                if image.ratio == SubsampleRatio::Yuv420 && image.size == self.size =>
            {
                image
            }
            _ => {
                return Err(VideoError::Encode(format!(
                    "H.264 input must be a {} YUV 4:2:0 frame",
                    self.size
                )));
            }
        };
        let yuv = YUVSlices::new(
            (&image.y[..], &image.cb[..], &image.cr[..]),
            (self.size.x, self.size.y),
            (image.y_stride, image.c_stride, image.c_stride),
        );
        let bitstream = self
            .encoder
            .encode(&yuv)
            .map_err(|e| VideoError::Encode(e.to_string()))?;
        dst.clear();
        dst.extend_from_slice(&bitstream.to_vec());
        Ok(dst.len())
    }

    fn force_keyframe(&mut self) {
        self.encoder.force_intra_frame();
        log::debug!("h264 encoder: forced keyframe");
    }
}
