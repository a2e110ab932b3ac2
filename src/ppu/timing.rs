/// Number of dots per scanline
const DOTS_PER_SCANLINE: u16 = 341;
/// Number of scanlines per frame, visible plus vblank plus pre-render
const SCANLINES_PER_FRAME: u16 = 262;

/// Scanline on which the vertical blank flag is raised (at dot 1)
pub const VBLANK_SCANLINE: u16 = 241;
/// Pre-render scanline, where per-frame flags are cleared
pub const PRE_RENDER_SCANLINE: u16 = 261;

/// Tracks the PPU's position within the frame: scanline, dot and frame
/// parity for the odd-frame dot skip.
pub struct Timing {
    /// Total number of PPU ticks since reset
    total_cycles: u64,
    /// Current scanline (0-261)
    pub scanline: u16,
    /// Current dot within the scanline (0-340)
    pub dot: u16,
    /// Frame counter, used for odd/even frame tracking
    frame_count: u64,
}

impl Timing {
    pub fn new() -> Self {
        Self {
            total_cycles: 0,
            scanline: 0,
            dot: 0,
            frame_count: 0,
        }
    }

    pub fn reset(&mut self) {
        self.total_cycles = 0;
        self.scanline = 0;
        self.dot = 0;
        self.frame_count = 0;
    }

    /// Advance by one dot. Returns true if the odd-frame skip fired.
    ///
    /// On odd frames with rendering enabled, dot 340 of the pre-render
    /// scanline is skipped and the frame jumps straight to (0, 0).
    pub fn tick(&mut self, rendering_enabled: bool) -> bool {
        self.total_cycles += 1;

        let skip_odd_frame = (self.frame_count & 1) == 1
            && rendering_enabled
            && self.scanline == PRE_RENDER_SCANLINE
            && self.dot == 339;

        if skip_odd_frame {
            self.dot = 0;
            self.scanline = 0;
            self.frame_count += 1;
            true
        } else {
            self.dot += 1;
            if self.dot >= DOTS_PER_SCANLINE {
                self.dot = 0;
                self.scanline += 1;
                if self.scanline >= SCANLINES_PER_FRAME {
                    self.scanline = 0;
                    self.frame_count += 1;
                }
            }
            false
        }
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Scanlines that run the fetch pipeline: visible lines and pre-render
    pub fn is_fetch_scanline(&self) -> bool {
        self.scanline < 240 || self.scanline == PRE_RENDER_SCANLINE
    }

    /// True while positioned on a pixel that reaches the screen
    /// (scanlines 0-239, dots 1-256)
    pub fn is_visible_pixel(&self) -> bool {
        self.scanline < 240 && self.dot >= 1 && self.dot <= 256
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_tick_increments_dot() {
        let mut timing = Timing::new();
        timing.tick(false);
        assert_eq!(timing.dot, 1);
        assert_eq!(timing.total_cycles(), 1);
    }

    #[test]
    fn test_timing_scanline_wraps() {
        let mut timing = Timing::new();
        for _ in 0..341 {
            timing.tick(false);
        }
        assert_eq!(timing.scanline, 1);
        assert_eq!(timing.dot, 0);
    }

    #[test]
    fn test_timing_frame_wraps() {
        let mut timing = Timing::new();
        for _ in 0..(262 * 341) {
            timing.tick(false);
        }
        assert_eq!(timing.scanline, 0);
        assert_eq!(timing.dot, 0);
        assert_eq!(timing.frame_count(), 1);
    }

    #[test]
    fn test_odd_frame_skip() {
        let mut timing = Timing::new();
        timing.frame_count = 1;
        timing.scanline = PRE_RENDER_SCANLINE;
        timing.dot = 339;

        let skipped = timing.tick(true);
        assert!(skipped);
        assert_eq!(timing.scanline, 0);
        assert_eq!(timing.dot, 0);
        assert_eq!(timing.frame_count(), 2);
    }

    #[test]
    fn test_even_frame_no_skip() {
        let mut timing = Timing::new();
        timing.scanline = PRE_RENDER_SCANLINE;
        timing.dot = 339;

        assert!(!timing.tick(true));
        assert_eq!(timing.dot, 340);
    }

    #[test]
    fn test_no_skip_with_rendering_disabled() {
        let mut timing = Timing::new();
        timing.frame_count = 1;
        timing.scanline = PRE_RENDER_SCANLINE;
        timing.dot = 339;

        assert!(!timing.tick(false));
        assert_eq!(timing.dot, 340);
    }

    #[test]
    fn test_odd_frame_cycle_count() {
        let mut timing = Timing::new();
        timing.frame_count = 1;
        // Odd frame with rendering loses exactly one dot
        let start = timing.total_cycles();
        while timing.frame_count() < 2 {
            timing.tick(true);
        }
        assert_eq!(timing.total_cycles() - start, 262 * 341 - 1);
    }

    #[test]
    fn test_is_visible_pixel() {
        let mut timing = Timing::new();
        timing.scanline = 100;
        timing.dot = 100;
        assert!(timing.is_visible_pixel());

        timing.dot = 0;
        assert!(!timing.is_visible_pixel());

        timing.scanline = VBLANK_SCANLINE;
        timing.dot = 100;
        assert!(!timing.is_visible_pixel());
    }

    #[test]
    fn test_fetch_scanlines() {
        let mut timing = Timing::new();
        timing.scanline = 0;
        assert!(timing.is_fetch_scanline());
        timing.scanline = 239;
        assert!(timing.is_fetch_scanline());
        timing.scanline = 240;
        assert!(!timing.is_fetch_scanline());
        timing.scanline = PRE_RENDER_SCANLINE;
        assert!(timing.is_fetch_scanline());
    }
}
