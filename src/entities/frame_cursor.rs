//! Timeline cursor: current frame and the derived frame range.
//!
//! Frames are 1-based. `total` is never below 1 (or the configured floor),
//! and `current` always stays in `[1, total]`.

/// Current frame + total frame count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCursor {
    current: i32,
    total: i32,
    min_total: i32,
}

impl Default for FrameCursor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FrameCursor {
    pub fn new(min_total: i32) -> Self {
        let min_total = min_total.max(1);
        Self { current: 1, total: min_total, min_total }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    /// Set the current frame, clamped into range. Returns the applied value.
    pub fn set_current(&mut self, frame: i32) -> i32 {
        self.current = frame.clamp(1, self.total);
        self.current
    }

    /// Move by `delta` frames (saturating, clamped).
    pub fn step(&mut self, delta: i32) -> i32 {
        self.set_current(self.current.saturating_add(delta))
    }

    /// Replace the frame range and re-clamp the current frame.
    pub fn set_total(&mut self, total: i32) {
        self.total = total.max(self.min_total);
        self.current = self.current.clamp(1, self.total);
    }

    /// Range from loaded data: max curve frame vs. image count.
    pub fn derive_total(max_curve_frame: Option<i32>, image_count: usize) -> i32 {
        let images = i32::try_from(image_count).unwrap_or(i32::MAX);
        max_curve_frame.unwrap_or(1).max(images).max(1)
    }
}
