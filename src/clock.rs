use std::time::{Duration, Instant};

/// Wall-clock frame timer with a ceiling on the step it reports.
pub struct FrameClock {
    last: Instant,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: Instant::now(),
            max_dt,
        }
    }

    /// Seconds since the previous call, clamped to `max_dt`.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        self.clamp(elapsed)
    }

    pub fn clamp(&self, elapsed: Duration) -> f32 {
        elapsed.as_secs_f32().min(self.max_dt)
    }
}
