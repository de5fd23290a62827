use std::time::{Duration, Instant};

/// Elapsed session time, accumulated from per-frame deltas.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub time_seconds: f32,
}

impl PlaybackClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f32) {
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f32(self.time_seconds)
    }
}

/// Measures wall-clock time between consecutive render frames.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last: Instant,
}

impl FrameTimer {
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call (or since [`FrameTimer::start`]).
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        delta
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::start()
    }
}
