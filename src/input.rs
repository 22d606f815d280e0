//! Pointer state for the field.
//!
//! Raw pointer coordinates are written by event handlers and read on the
//! next frame. Two exponentially smoothed copies follow them at different
//! rates: a fast cursor that drives attraction, and a slow parallax target
//! that sways the camera.

use glam::Vec2;

/// Smoothing rate of the attraction cursor, tracks almost immediately.
pub const CURSOR_SMOOTHING: f32 = 0.15;

/// Smoothing rate of the camera parallax, lags for a soft drift.
pub const PARALLAX_SMOOTHING: f32 = 0.025;

/// A value that eases toward its target: `value += (target - value) * rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed {
    value: Vec2,
    rate: f32,
}

impl Smoothed {
    pub fn new(rate: f32) -> Self {
        Self {
            value: Vec2::ZERO,
            rate: rate.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn value(&self) -> Vec2 {
        self.value
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn update(&mut self, target: Vec2) {
        self.value += (target - self.value) * self.rate;
    }

    /// Jump straight to `target`.
    pub fn snap(&mut self, target: Vec2) {
        self.value = target;
    }
}

/// Pointer position in viewport pixels, with its smoothed followers.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    raw: Option<Vec2>,
    seen: bool,
    cursor: Smoothed,
    parallax: Smoothed,
}

impl Pointer {
    pub fn new(cursor_rate: f32, parallax_rate: f32) -> Self {
        Self {
            raw: None,
            seen: false,
            cursor: Smoothed::new(cursor_rate),
            parallax: Smoothed::new(parallax_rate),
        }
    }

    /// Record a pointer move. The cursor snaps whenever the pointer enters and
    /// the parallax snaps on the very first move, so neither sweeps in from the origin.
    pub fn moved(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        if self.raw.is_none() {
            self.cursor.snap(position);
        }
        if !self.seen {
            self.parallax.snap(position);
            self.seen = true;
        }
        self.raw = Some(position);
    }

    /// The pointer left the surface; attraction stops until it returns.
    pub fn left(&mut self) {
        self.raw = None;
    }

    /// Ease both followers toward the raw position. Called once per frame.
    pub fn update(&mut self) {
        if let Some(raw) = self.raw {
            self.cursor.update(raw);
            self.parallax.update(raw);
        }
    }

    pub fn raw(&self) -> Option<Vec2> {
        self.raw
    }

    pub fn is_present(&self) -> bool {
        self.raw.is_some()
    }

    /// Fast follower, `None` while the pointer is absent.
    pub fn cursor(&self) -> Option<Vec2> {
        self.raw.map(|_| self.cursor.value())
    }

    /// Slow follower, `None` until the first move. Keeps its last value
    /// when the pointer leaves.
    pub fn parallax(&self) -> Option<Vec2> {
        self.seen.then(|| self.parallax.value())
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new(CURSOR_SMOOTHING, PARALLAX_SMOOTHING)
    }
}
