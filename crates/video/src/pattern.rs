use {
    crate::*,
    std::{
        sync::{
            Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        thread,
        time::{Duration, Instant},
    },
};

/// Synthetic capture source.
///
/// Every byte of frame `n` holds `n % 256`, so any mix of two frames inside
/// one buffer is detectable. Reads can be paced at the session frame rate or
/// delivered as fast as they are requested, and the source can be told to
/// fail after a number of frames.
pub struct PatternSource {
    property: SessionProperty,
    frame_size: usize,
    next_frame: AtomicUsize,
    reads: AtomicUsize,
    closed: AtomicBool,
    frame_limit: Option<usize>,
    interval: Option<Duration>,
    pacing: Option<Mutex<Instant>>,
}

impl PatternSource {
    pub fn open(config: &CaptureConfig) -> Result<Self, VideoError> {
        let property = SessionProperty {
            size: config.size(),
            frame_rate: config.frame_rate(),
            format: config.format(),
        };
        Self::new(property)
    }

    pub fn new(property: SessionProperty) -> Result<Self, VideoError> {
        let frame_size = property.format.frame_size(property.size)?;
        let interval = frame_interval(property.frame_rate)?;
        log::info!("pattern source: {property}, {frame_size} bytes per frame");
        Ok(Self {
            property,
            frame_size,
            next_frame: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            frame_limit: None,
            interval,
            pacing: None,
        })
    }

    /// Sleep between frames so reads arrive at the session frame rate.
    pub fn with_pacing(mut self, enabled: bool) -> Self {
        self.pacing = enabled.then(|| Mutex::new(Instant::now()));
        self
    }

    /// Fail every read after `frames` frames were delivered.
    pub fn with_frame_limit(mut self, frames: usize) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Number of successful reads so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn pace(&self) -> Result<(), VideoError> {
        let (Some(pacing), Some(interval)) = (&self.pacing, self.interval) else {
            return Ok(());
        };
        let mut deadline = pacing
            .lock()
            .map_err(|_| VideoError::Capture("pattern clock poisoned".to_string()))?;
        let now = Instant::now();
        if *deadline > now {
            thread::sleep(*deadline - now);
        }
        *deadline = (*deadline).max(now) + interval;
        Ok(())
    }
}

// time between paced frames; no pacing for non-positive rates
fn frame_interval(frame_rate: f32) -> Result<Option<Duration>, VideoError> {
    if !(frame_rate > 0.0) {
        return Ok(None);
    }
    Duration::try_from_secs_f32(1.0 / frame_rate)
        .map(Some)
        .map_err(|e| VideoError::Config(format!("frame rate {frame_rate} out of range: {e}")))
}

impl CaptureSession for PatternSource {
    fn property(&self) -> SessionProperty {
        self.property
    }

    fn buffer_size(&self) -> usize {
        self.frame_size
    }

    fn read_frame(&self, buf: &mut [u8]) -> Result<usize, VideoError> {
        if self.is_closed() {
            return Err(VideoError::Capture("session closed".to_string()));
        }
        if buf.len() < self.frame_size {
            return Err(VideoError::Capture(format!(
                "frame buffer holds {} bytes, need {}",
                buf.len(),
                self.frame_size
            )));
        }
        self.pace()?;

        let index = self.next_frame.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.frame_limit {
            if index >= limit {
                return Err(VideoError::Capture(format!(
                    "pattern exhausted after {limit} frames"
                )));
            }
        }

        buf[..self.frame_size].fill(index as u8);
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.frame_size)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            log::info!("pattern source: closed after {} frames", self.reads());
        }
    }
}
