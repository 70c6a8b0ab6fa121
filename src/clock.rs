use std::time::{Duration, Instant};

/// Used when neither the source metadata nor --fps gives a usable rate.
pub const DEFAULT_FPS: f64 = 30.0;

/// Paces frame emission against a virtual deadline that advances by exactly
/// one frame duration per tick, independent of how long the frame actually
/// took. A late frame is absorbed (no sleep) instead of pushing every later
/// deadline back, so the long-run average rate stays correct and catch-up
/// after a slow stretch is bounded.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackClock {
    frame_duration: Duration,
    next_deadline: Instant,
}

impl PlaybackClock {
    pub fn start(fps: f64, now: Instant) -> Self {
        debug_assert!(fps.is_finite() && fps > 0.0);
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / fps),
            next_deadline: now,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Returns the wait before the next frame is due, or `None` when the
    /// frame is already behind schedule.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        self.next_deadline += self.frame_duration;
        self.next_deadline.checked_duration_since(now)
    }
}
