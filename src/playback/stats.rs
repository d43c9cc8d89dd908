//! Frame presentation timing.

use std::time::Duration;

/// Number of presents averaged per window.
pub const STATS_WINDOW: u32 = 10;

/// Rolling measurement of how long fetching and presenting a frame takes.
#[derive(Debug, Clone, Default)]
pub struct PlaybackStats {
    window_sum: Duration,
    window_count: u32,
    average: Option<Duration>,
    presented: u64,
}

impl PlaybackStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed present that took `elapsed`.
    pub fn record(&mut self, elapsed: Duration) {
        self.presented += 1;
        self.window_sum += elapsed;
        self.window_count += 1;

        if self.window_count >= STATS_WINDOW {
            self.average = Some(self.window_sum / self.window_count);
            self.window_sum = Duration::ZERO;
            self.window_count = 0;
        }
    }

    /// Average present time over the last complete window.
    pub fn average_present_time(&self) -> Option<Duration> {
        self.average
    }

    /// Highest frame rate the last window could have sustained.
    pub fn achievable_fps(&self) -> Option<f64> {
        self.average
            .filter(|d| !d.is_zero())
            .map(|d| 1.0 / d.as_secs_f64())
    }

    /// Total frames presented.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl std::fmt::Display for PlaybackStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.average {
            Some(avg) => write!(
                f,
                "{} frames presented, {:.2} ms/frame avg",
                self.presented,
                avg.as_secs_f64() * 1000.0
            ),
            None => write!(f, "{} frames presented", self.presented),
        }
    }
}
