//! Frame-tick bookkeeping.

/// Tracks the upstream frame size from tick to tick.
#[derive(Debug, Clone, Default)]
pub struct FrameTick {
    size: Option<(u32, u32)>,
    ticks: u64,
}

impl FrameTick {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this tick's source size and report whether it changed.
    ///
    /// The first observation only establishes a baseline. A zero size is a
    /// size like any other, so 0x0 followed by 640x480 is a change.
    pub fn observe(&mut self, width: u32, height: u32) -> bool {
        self.ticks += 1;
        let changed = self.size.is_some_and(|size| size != (width, height));
        self.size = Some((width, height));
        changed
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Number of ticks observed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_detected_only_on_resize() {
        let mut tick = FrameTick::new();
        assert!(!tick.observe(640, 480));
        assert!(!tick.observe(640, 480));
        assert!(tick.observe(800, 480));
        assert_eq!(tick.ticks(), 3);
        assert_eq!(tick.size(), Some((800, 480)));
    }

    #[test]
    fn test_zero_to_nonzero_is_a_change() {
        let mut tick = FrameTick::new();
        assert!(!tick.observe(0, 0));
        assert!(tick.observe(640, 480));
        assert!(tick.observe(0, 480));
    }
}
