use core::time::Duration;
use web_time::Instant;

/// Converts wall-clock readings into the durations fed to [`crate::GameSession::advance`].
#[derive(Copy, Clone, Debug)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(instant: Instant) -> Self {
        Self { last: instant }
    }

    /// Time since the previous lap, never negative.
    pub fn lap_at(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = self.last.max(now);
        elapsed
    }

    pub fn lap(&mut self) -> Duration {
        self.lap_at(Instant::now())
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}
