//! Frame clock driven by host timestamps.
//!
//! The host passes the timestamp it receives with each animation frame
//! (for example the `requestAnimationFrame` time or an `Instant` offset).
//! Elapsed time only ever moves forward.
//!
//! ```ignore
//! let mut time = Time::new();
//! let (elapsed, delta) = time.advance(Duration::from_millis(16));
//! ```

use std::time::Duration;

/// Largest delta accepted from one frame, in seconds.
///
/// Hosts pause frames while hidden; a long gap would otherwise arrive as one
/// huge step.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Time tracking for the field.
#[derive(Debug, Clone)]
pub struct Time {
    /// Timestamp of the previous frame, `None` before the first one.
    last_frame: Option<Duration>,
    /// Scaled elapsed time in seconds.
    elapsed_secs: f32,
    /// Scaled time since the previous frame in seconds.
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    /// Frames with a non-zero delta since the last FPS sample.
    fps_frames: u32,
    /// Unscaled seconds accumulated since the last FPS sample.
    fps_window: f32,
    fps_update_interval: f32,
    paused: bool,
    time_scale: f32,
}

impl Time {
    pub fn new() -> Self {
        Self {
            last_frame: None,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_window: 0.0,
            fps_update_interval: 0.5,
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Advance to the frame timestamp `now`. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn advance(&mut self, now: Duration) -> (f32, f32) {
        let raw_delta = match self.last_frame {
            Some(last) => now.saturating_sub(last).as_secs_f32().min(MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last_frame = Some(now);

        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        self.delta_secs = raw_delta * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        if raw_delta > 0.0 {
            self.fps_frames += 1;
            self.fps_window += raw_delta;
        }
        if self.fps_window >= self.fps_update_interval {
            self.fps = self.fps_frames as f32 / self.fps_window;
            self.fps_frames = 0;
            self.fps_window = 0.0;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total scaled time in seconds since the first frame.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Scaled time since the previous frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames advanced while not paused.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last half-second window, 0 until the first sample.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// While paused, `delta()` is 0 and `elapsed()` stops increasing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set time scale multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
