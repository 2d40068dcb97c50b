//! Calibration button edge detection
//!
//! The button is pulled up and active-low. Comparing consecutive polls
//! turns a press into exactly one event, however long it is held.

/// Falling-edge detector for an active-low input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeDetector {
    last_high: bool,
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeDetector {
    /// Start in the released (high) state
    pub const fn new() -> Self {
        Self { last_high: true }
    }

    /// Feed the current line level; returns `true` on a high-to-low transition
    pub fn poll(&mut self, high: bool) -> bool {
        let pressed = self.last_high && !high;
        self.last_high = high;
        pressed
    }
}
