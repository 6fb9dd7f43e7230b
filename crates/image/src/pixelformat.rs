use {
    crate::*,
    base::Vec2,
    std::{fmt, str::FromStr},
};

// fourcc codes, as libyuv names them
pub(crate) const FOURCC_I420: u32 = u32::from_le_bytes(*b"I420");
pub(crate) const FOURCC_I422: u32 = u32::from_le_bytes(*b"I422");
pub(crate) const FOURCC_I444: u32 = u32::from_le_bytes(*b"I444");
pub(crate) const FOURCC_NV12: u32 = u32::from_le_bytes(*b"NV12");
pub(crate) const FOURCC_NV21: u32 = u32::from_le_bytes(*b"NV21");
pub(crate) const FOURCC_YUY2: u32 = u32::from_le_bytes(*b"YUY2");
pub(crate) const FOURCC_UYVY: u32 = u32::from_le_bytes(*b"UYVY");
pub(crate) const FOURCC_ARGB: u32 = u32::from_le_bytes(*b"ARGB");
pub(crate) const FOURCC_BGRA: u32 = u32::from_le_bytes(*b"BGRA");
pub(crate) const FOURCC_RAW: u32 = u32::from_le_bytes(*b"raw ");
pub(crate) const FOURCC_RGBA: u32 = u32::from_le_bytes(*b"RGBA");
pub(crate) const FOURCC_MJPG: u32 = u32::from_le_bytes(*b"MJPG");

/// Convert a fourcc code to a readable 4-character string.
pub fn fourcc_to_string(fourcc: u32) -> String {
    String::from_utf8_lossy(&fourcc.to_le_bytes()).into_owned()
}

/// Layout of a raw capture buffer.
///
/// Packed RGB names follow libyuv, where the name reads the 32-bit word
/// most significant byte first: `Argb` is B,G,R,A in memory and `Bgra` is
/// A,R,G,B in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    I420,
    I422,
    I444,
    Nv12,
    Nv21,
    Yuy2,
    Uyvy,
    Argb,
    Bgra,
    Raw,
    Rgba,
    Mjpg,
}

// canonical names first, then aliases for byte-identical layouts
const NAMES: &[(&str, PixelFormat)] = &[
    ("I420", PixelFormat::I420),
    ("I422", PixelFormat::I422),
    ("I444", PixelFormat::I444),
    ("NV12", PixelFormat::Nv12),
    ("NV21", PixelFormat::Nv21),
    ("YUY2", PixelFormat::Yuy2),
    ("UYVY", PixelFormat::Uyvy),
    ("ARGB", PixelFormat::Argb),
    ("BGRA", PixelFormat::Bgra),
    ("RAW", PixelFormat::Raw),
    ("RGBA", PixelFormat::Rgba),
    ("MJPG", PixelFormat::Mjpg),
    ("IYUV", PixelFormat::I420),
    ("YU16", PixelFormat::I422),
    ("YU24", PixelFormat::I444),
    ("YUYV", PixelFormat::Yuy2),
    ("YUVS", PixelFormat::Yuy2),
    ("JPEG", PixelFormat::Mjpg),
    ("RGB3", PixelFormat::Raw),
    ("CM32", PixelFormat::Bgra),
    ("CM24", PixelFormat::Raw),
];

impl PixelFormat {
    pub const ALL: [PixelFormat; 12] = [
        PixelFormat::I420,
        PixelFormat::I422,
        PixelFormat::I444,
        PixelFormat::Nv12,
        PixelFormat::Nv21,
        PixelFormat::Yuy2,
        PixelFormat::Uyvy,
        PixelFormat::Argb,
        PixelFormat::Bgra,
        PixelFormat::Raw,
        PixelFormat::Rgba,
        PixelFormat::Mjpg,
    ];

    pub fn name(&self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, format)| format == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    pub fn from_fourcc(fourcc: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_fourcc() == fourcc)
    }

    pub fn as_fourcc(&self) -> u32 {
        match self {
            PixelFormat::I420 => FOURCC_I420,
            PixelFormat::I422 => FOURCC_I422,
            PixelFormat::I444 => FOURCC_I444,
            PixelFormat::Nv12 => FOURCC_NV12,
            PixelFormat::Nv21 => FOURCC_NV21,
            PixelFormat::Yuy2 => FOURCC_YUY2,
            PixelFormat::Uyvy => FOURCC_UYVY,
            PixelFormat::Argb => FOURCC_ARGB,
            PixelFormat::Bgra => FOURCC_BGRA,
            PixelFormat::Raw => FOURCC_RAW,
            PixelFormat::Rgba => FOURCC_RGBA,
            PixelFormat::Mjpg => FOURCC_MJPG,
        }
    }

    pub fn is_rgb(&self) -> bool {
        matches!(
            self,
            PixelFormat::Argb | PixelFormat::Bgra | PixelFormat::Raw | PixelFormat::Rgba
        )
    }

    /// Chroma subsampling of the decoded image, `None` for RGB and compressed formats.
    pub fn subsample_ratio(&self) -> Option<SubsampleRatio> {
        match self {
            PixelFormat::I420 | PixelFormat::Nv12 | PixelFormat::Nv21 => {
                Some(SubsampleRatio::Yuv420)
            }
            PixelFormat::I422 | PixelFormat::Yuy2 | PixelFormat::Uyvy => {
                Some(SubsampleRatio::Yuv422)
            }
            PixelFormat::I444 => Some(SubsampleRatio::Yuv444),
            PixelFormat::Argb
            | PixelFormat::Bgra
            | PixelFormat::Raw
            | PixelFormat::Rgba
            | PixelFormat::Mjpg => None,
        }
    }

    /// Minimum number of bytes a raw frame of `size` occupies in this format.
    pub fn frame_size(&self, size: Vec2<usize>) -> Result<usize, ImageError> {
        let overflow = || ImageError::InvalidDimensions(size);
        let luma = size.checked_area().ok_or_else(overflow)?;
        let total = match self {
            PixelFormat::I420
            | PixelFormat::I422
            | PixelFormat::I444
            | PixelFormat::Nv12
            | PixelFormat::Nv21 => {
                let ratio = self.subsample_ratio().ok_or(ImageError::UnsupportedFormat(*self))?;
                ratio
                    .chroma_size(size)
                    .checked_area()
                    .and_then(|chroma| chroma.checked_mul(2))
                    .and_then(|chroma| chroma.checked_add(luma))
            }
            PixelFormat::Yuy2 | PixelFormat::Uyvy => size
                .x
                .div_ceil(2)
                .checked_mul(4)
                .and_then(|row| row.checked_mul(size.y)),
            PixelFormat::Argb | PixelFormat::Bgra | PixelFormat::Rgba => luma.checked_mul(4),
            PixelFormat::Raw => luma.checked_mul(3),
            PixelFormat::Mjpg => return Err(ImageError::UnsupportedFormat(*self)),
        };
        total.ok_or_else(overflow)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        NAMES
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, format)| *format)
            .ok_or_else(|| ImageError::UnknownFormat(s.to_string()))
    }
}

// BT.601 YUV-to-RGB conversion for a single pixel (fixed-point, shift 8)
pub(crate) fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    let r = (y + ((359 * v) >> 8)).clamp(0, 255) as u8;
    let g = (y - ((88 * u + 183 * v) >> 8)).clamp(0, 255) as u8;
    let b = (y + ((454 * u) >> 8)).clamp(0, 255) as u8;
    (r, g, b)
}
