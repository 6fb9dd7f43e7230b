use {crate::PixelFormat, base::Vec2, std::fmt};

#[derive(Debug)]
pub enum ImageError {
    InsufficientBuffer { required: usize, actual: usize },
    UnsupportedFormat(PixelFormat),
    UnknownFormat(String),
    UnsupportedConversion(&'static str),
    InvalidDimensions(Vec2<usize>),
    Encode(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::InsufficientBuffer { required, actual } => write!(
                f,
                "insufficient frame buffer: need {required} bytes, got {actual}"
            ),
            ImageError::UnsupportedFormat(format) => {
                write!(f, "no decoder for pixel format {format}")
            }
            ImageError::UnknownFormat(name) => write!(f, "unknown pixel format {name:?}"),
            ImageError::UnsupportedConversion(msg) => write!(f, "unsupported conversion: {msg}"),
            ImageError::InvalidDimensions(size) => write!(f, "invalid frame dimensions {size}"),
            ImageError::Encode(msg) => write!(f, "encode error: {msg}"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<crates_image::ImageError> for ImageError {
    fn from(err: crates_image::ImageError) -> Self {
        ImageError::Encode(err.to_string())
    }
}
