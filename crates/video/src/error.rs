use {image::ImageError, std::fmt};

#[derive(Debug)]
pub enum VideoError {
    Device(String),
    Capture(String),
    Image(ImageError),
    Encode(String),
    Transport(std::io::Error),
    Config(String),
}

impl VideoError {
    /// Whether the error came from the far side of a sink, typically a
    /// disconnected client, rather than from capture or processing.
    pub fn is_transport(&self) -> bool {
        matches!(self, VideoError::Transport(_))
    }
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::Device(msg) => write!(f, "device error: {msg}"),
            VideoError::Capture(msg) => write!(f, "capture error: {msg}"),
            VideoError::Image(err) => write!(f, "image error: {err}"),
            VideoError::Encode(msg) => write!(f, "encode error: {msg}"),
            VideoError::Transport(err) => write!(f, "transport error: {err}"),
            VideoError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for VideoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VideoError::Image(err) => Some(err),
            VideoError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VideoError {
    fn from(err: std::io::Error) -> Self {
        VideoError::Transport(err)
    }
}

impl From<ImageError> for VideoError {
    fn from(err: ImageError) -> Self {
        VideoError::Image(err)
    }
}
