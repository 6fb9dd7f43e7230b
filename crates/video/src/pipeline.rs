use {
    crate::*,
    image::{decode, decode_to_yuv420},
    std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// How a loop relates to its capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The loop owns the session and closes it on exit.
    Streaming,
    /// One of several loops sharing a session, e.g. one per HTTP client.
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    Cancelled,
    Failed,
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug)]
pub struct PipelineReport {
    pub state: PipelineState,
    /// Frames captured, decoded and consumed.
    pub frames: usize,
    pub error: Option<VideoError>,
}

/// Capture, decode and distribute loop for one sink.
///
/// Owns a frame buffer sized for the session, reused for every capture.
pub struct Pipeline<S> {
    session: Arc<dyn CaptureSession>,
    property: SessionProperty,
    sink: S,
    mode: Mode,
    buffer: Vec<u8>,
    cancel: Arc<AtomicBool>,
    frames: usize,
    state: PipelineState,
}

impl<S: FrameSink> Pipeline<S> {
    pub fn new(
        session: Arc<dyn CaptureSession>,
        sink: S,
        mode: Mode,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let property = session.property();
        let buffer = vec![0u8; session.buffer_size()];
        Self {
            session,
            property,
            sink,
            mode,
            buffer,
            cancel,
            frames: 0,
            state: PipelineState::Running,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Capture one frame and pass it through the sink.
    pub fn step(&mut self) -> Result<(), VideoError> {
        let n = self.session.read_frame(&mut self.buffer)?.min(self.buffer.len());
        let format = self.property.format;
        let size = self.property.size;
        let frame = &mut self.buffer[..n];
        let image = if self.sink.needs_yuv420() {
            decode_to_yuv420(format, frame, size)?
        } else {
            decode(format, frame, size)?
        };
        self.sink.consume(image)?;
        self.frames += 1;
        log::debug!("pipeline: frame {} done", self.frames);
        Ok(())
    }

    /// Loop until cancelled or until any step fails, then close the sink
    /// (and the session in [`Mode::Streaming`]).
    ///
    /// A sink that fails to close turns an otherwise cancelled run into
    /// [`PipelineState::Failed`].
    pub fn run(mut self) -> PipelineReport {
        log::info!(
            "pipeline: {:?} loop on {}, {} byte frame buffer",
            self.mode,
            self.property,
            self.buffer.len()
        );
        let mut error = None;
        while self.state == PipelineState::Running {
            if self.cancel.load(Ordering::SeqCst) {
                self.state = PipelineState::Cancelled;
                break;
            }
            if let Err(e) = self.step() {
                error = Some(e);
                self.state = PipelineState::Failed;
            }
        }

        // closing flushes buffered output, so its failure fails a clean run
        if let Err(e) = self.sink.close() {
            if error.is_none() {
                error = Some(e);
                self.state = PipelineState::Failed;
            } else {
                log::warn!("pipeline: closing sink failed: {e}");
            }
        }
        if self.mode == Mode::Streaming {
            self.session.close();
        }

        match &error {
            Some(e) if self.mode == Mode::Snapshot && e.is_transport() => {
                log::info!("pipeline: client gone after {} frames: {e}", self.frames);
            }
            Some(e) => log::error!("pipeline: failed after {} frames: {e}", self.frames),
            None => log::info!("pipeline: cancelled after {} frames", self.frames),
        }

        PipelineReport {
            state: self.state,
            frames: self.frames,
            error,
        }
    }
}
