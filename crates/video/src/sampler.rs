use std::time::Instant;

/// Converts wall-clock time between emitted frames into media clock samples.
///
/// One sampler belongs to one outbound stream and is asked once per frame.
#[derive(Debug)]
pub struct Sampler {
    clock_rate: u32,
    last: Instant,
}

impl Sampler {
    pub fn new(clock_rate: u32) -> Self {
        Self::starting_at(clock_rate, Instant::now())
    }

    pub fn starting_at(clock_rate: u32, start: Instant) -> Self {
        Self {
            clock_rate,
            last: start,
        }
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Samples elapsed since the previous call (or construction).
    pub fn samples(&mut self) -> u32 {
        self.samples_at(Instant::now())
    }

    /// [`Sampler::samples`] against an explicit clock reading.
    ///
    /// A reading earlier than the previous one counts as no time passed.
    pub fn samples_at(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = self.last.max(now);
        (self.clock_rate as f64 * elapsed.as_secs_f64()).round() as u32
    }
}
