//! Frame-rate meter for the host loop.

use std::time::{Duration, Instant};

/// Counts frames over a fixed window and reports the rounded rate
#[derive(Debug, Clone)]
pub struct FrameRateMeter {
    window: Duration,
    window_start: Option<Instant>,
    frames: u32,
    fps: u32,
}

impl FrameRateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_start: None,
            frames: 0,
            fps: 0,
        }
    }

    /// Record a frame at `now`; returns the new rate when a window closes
    pub fn frame(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.window {
            return None;
        }

        self.fps = (self.frames as f64 / elapsed.as_secs_f64()).round() as u32;
        self.frames = 0;
        self.window_start = Some(now);
        Some(self.fps)
    }

    /// Last reported rate (0 until the first window closes)
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
