/// PPUSTATUS flags plus the two one-shot signals the orchestrator polls:
/// the NMI request and the frame-complete notification.
pub struct Status {
    /// Vertical blank flag (bit 7)
    vblank: bool,
    /// Sprite 0 hit flag (bit 6)
    sprite_zero_hit: bool,
    /// Sprite overflow flag (bit 5)
    sprite_overflow: bool,
    /// Latched NMI request, cleared when polled
    nmi_pending: bool,
    /// Set at the start of every vertical blank, cleared when polled
    frame_complete: bool,
}

impl Status {
    pub fn new() -> Self {
        Self {
            vblank: false,
            sprite_zero_hit: false,
            sprite_overflow: false,
            nmi_pending: false,
            frame_complete: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Enter vertical blank. The frame-complete signal fires whether or not
    /// NMI generation is enabled.
    pub fn enter_vblank(&mut self, nmi_enabled: bool) {
        self.vblank = true;
        self.frame_complete = true;
        if nmi_enabled {
            self.nmi_pending = true;
        }
    }

    /// Clear the per-frame flags at the start of the pre-render scanline.
    pub fn clear_frame_flags(&mut self) {
        self.vblank = false;
        self.sprite_zero_hit = false;
        self.sprite_overflow = false;
    }

    /// Request an NMI outside the normal vblank edge. Used when NMI
    /// generation is switched on while the vblank flag is already set.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Compose the PPUSTATUS byte. The low five bits come from the I/O bus
    /// latch. Reading clears the vblank flag; `suppress_side_effects`
    /// leaves it alone for debugger-style peeks.
    pub fn read(&mut self, io_bus: u8, suppress_side_effects: bool) -> u8 {
        let mut value = io_bus & 0x1F;
        if self.vblank {
            value |= 0x80;
        }
        if self.sprite_zero_hit {
            value |= 0x40;
        }
        if self.sprite_overflow {
            value |= 0x20;
        }
        if !suppress_side_effects {
            self.vblank = false;
        }
        value
    }

    /// Take the pending NMI request, clearing it.
    pub fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// Take the frame-complete signal, clearing it.
    pub fn poll_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    pub fn in_vblank(&self) -> bool {
        self.vblank
    }

    pub fn set_sprite_zero_hit(&mut self) {
        self.sprite_zero_hit = true;
    }

    pub fn set_sprite_overflow(&mut self) {
        self.sprite_overflow = true;
    }

    #[cfg(test)]
    pub fn sprite_zero_hit(&self) -> bool {
        self.sprite_zero_hit
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_vblank_signals_frame() {
        let mut status = Status::new();
        status.enter_vblank(false);
        assert!(status.in_vblank());
        assert!(status.poll_frame_complete());
        assert!(!status.poll_frame_complete());
        // NMI generation was off
        assert!(!status.poll_nmi());
    }

    #[test]
    fn test_enter_vblank_with_nmi() {
        let mut status = Status::new();
        status.enter_vblank(true);
        assert!(status.poll_nmi());
        assert!(!status.poll_nmi());
    }

    #[test]
    fn test_read_clears_vblank() {
        let mut status = Status::new();
        status.enter_vblank(false);
        let value = status.read(0, false);
        assert_eq!(value & 0x80, 0x80);
        assert!(!status.in_vblank());
    }

    #[test]
    fn test_suppressed_read_keeps_vblank() {
        let mut status = Status::new();
        status.enter_vblank(false);
        let value = status.read(0, true);
        assert_eq!(value & 0x80, 0x80);
        assert!(status.in_vblank());
    }

    #[test]
    fn test_low_bits_come_from_io_bus() {
        let mut status = Status::new();
        let value = status.read(0xFF, false);
        assert_eq!(value & 0x1F, 0x1F);
        assert_eq!(value & 0xE0, 0x00);
    }

    #[test]
    fn test_sprite_flags() {
        let mut status = Status::new();
        status.set_sprite_zero_hit();
        status.set_sprite_overflow();
        let value = status.read(0, false);
        assert_eq!(value & 0x60, 0x60);

        status.clear_frame_flags();
        let value = status.read(0, false);
        assert_eq!(value & 0x60, 0x00);
    }
}
