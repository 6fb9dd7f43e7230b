use {
    crate::*,
    base::Vec2,
    image::PixelFormat,
    std::{fmt, sync::Arc},
};

/// Device name that selects the built-in [`PatternSource`].
pub const PATTERN_DEVICE: &str = "pattern";

/// Requested capture parameters.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    device: String,
    size: Vec2<usize>,
    format: PixelFormat,
    frame_rate: f32,
    buffer_count: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            size: Vec2::new(640, 480),
            format: PixelFormat::Nv12,
            frame_rate: 30.0,
            buffer_count: 4,
        }
    }
}

impl CaptureConfig {
    /// Set the device path (e.g., "/dev/video0"), or [`PATTERN_DEVICE`].
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set the capture size in pixels.
    pub fn with_size(mut self, size: Vec2<usize>) -> Self {
        self.size = size;
        self
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the frames per second.
    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Set the number of driver buffers for the capture stream.
    pub fn with_buffer_count(mut self, buffer_count: u32) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    // Getters
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }
}

/// What a capture backend actually negotiated. Fixed for the life of the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionProperty {
    pub size: Vec2<usize>,
    pub frame_rate: f32,
    pub format: PixelFormat,
}

impl fmt::Display for SessionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {} fps", self.size, self.format, self.frame_rate)
    }
}

/// An open capture session.
///
/// Methods take `&self` so one session can feed several loops at once;
/// backends serialize device access internally. Each caller brings its own
/// frame buffer.
pub trait CaptureSession: Send + Sync {
    fn property(&self) -> SessionProperty;

    /// Minimum length of the buffer passed to [`CaptureSession::read_frame`].
    fn buffer_size(&self) -> usize;

    /// Block until the next frame is available and copy it into `buf`.
    ///
    /// Returns the number of bytes written.
    fn read_frame(&self, buf: &mut [u8]) -> Result<usize, VideoError>;

    /// Stop capturing. Later reads fail.
    fn close(&self);
}

/// Open the capture backend named by `config.device()`.
pub fn open_session(config: &CaptureConfig) -> Result<Arc<dyn CaptureSession>, VideoError> {
    if config.device() == PATTERN_DEVICE {
        let source = PatternSource::open(config)?.with_pacing(true);
        return Ok(Arc::new(source));
    }
    open_device(config)
}

#[cfg(feature = "v4l2")]
fn open_device(config: &CaptureConfig) -> Result<Arc<dyn CaptureSession>, VideoError> {
    Ok(Arc::new(V4l2Session::open(config)?))
}

#[cfg(not(feature = "v4l2"))]
fn open_device(config: &CaptureConfig) -> Result<Arc<dyn CaptureSession>, VideoError> {
    Err(VideoError::Config(format!(
        "cannot open {}: built without v4l2 support",
        config.device()
    )))
}
