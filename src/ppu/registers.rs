use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_SELECT = 0b0000_0011;
        const VRAM_INCREMENT_32 = 0b0000_0100;
        const SPRITE_PATTERN_HIGH = 0b0000_1000;
        const BACKGROUND_PATTERN_HIGH = 0b0001_0000;
        const SPRITE_8X16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        const GENERATE_NMI = 0b1000_0000;
    }
}

bitflags! {
    /// PPUMASK ($2001)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PpuMask: u8 {
        const GRAYSCALE = 0b0000_0001;
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

/// PPUCTRL, PPUMASK and the internal scroll state: the current and
/// temporary VRAM addresses v and t, the fine X scroll and the shared
/// write toggle.
pub struct Registers {
    pub ctrl: PpuCtrl,
    pub mask: PpuMask,
    /// OAM address register ($2003)
    pub oam_address: u8,
    /// PPUDATA read buffer
    data_buffer: u8,
    /// I/O bus latch, refreshed by every register access
    io_bus: u8,
    /// v: current VRAM address (15 bits)
    v: u16,
    /// t: temporary VRAM address (15 bits)
    t: u16,
    /// x: fine X scroll (3 bits)
    x: u8,
    /// w: write toggle shared by $2005 and $2006
    w: bool,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            oam_address: 0,
            data_buffer: 0,
            io_bus: 0,
            v: 0,
            t: 0,
            x: 0,
            w: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write PPUCTRL ($2000)
    pub fn write_ctrl(&mut self, value: u8) {
        self.ctrl = PpuCtrl::from_bits_truncate(value);
        // t: ...GH.. ........ <- d: ......GH
        self.t = (self.t & 0xF3FF) | (((value & 0x03) as u16) << 10);
    }

    /// Write PPUMASK ($2001)
    pub fn write_mask(&mut self, value: u8) {
        self.mask = PpuMask::from_bits_truncate(value);
    }

    /// Write PPUSCROLL ($2005)
    pub fn write_scroll(&mut self, value: u8) {
        if !self.w {
            // t: ....... ...ABCDE <- d: ABCDE...
            // x:              FGH <- d: .....FGH
            self.t = (self.t & 0xFFE0) | ((value as u16) >> 3);
            self.x = value & 0x07;
            self.w = true;
        } else {
            // t: FGH..AB CDE..... <- d: ABCDEFGH
            self.t = (self.t & 0x8FFF) | (((value as u16) & 0x07) << 12);
            self.t = (self.t & 0xFC1F) | (((value as u16) & 0xF8) << 2);
            self.w = false;
        }
    }

    /// Write PPUADDR ($2006)
    pub fn write_address(&mut self, value: u8) {
        if !self.w {
            // t: .CDEFGH ........ <- d: ..CDEFGH, bit 14 cleared
            self.t = (self.t & 0x00FF) | (((value & 0x3F) as u16) << 8);
            self.w = true;
        } else {
            // t: ....... ABCDEFGH <- d: ABCDEFGH, then v <- t
            self.t = (self.t & 0xFF00) | (value as u16);
            self.v = self.t;
            self.w = false;
        }
    }

    pub fn data_buffer(&self) -> u8 {
        self.data_buffer
    }

    pub fn set_data_buffer(&mut self, value: u8) {
        self.data_buffer = value;
    }

    pub fn io_bus(&self) -> u8 {
        self.io_bus
    }

    pub fn set_io_bus(&mut self, value: u8) {
        self.io_bus = value;
    }

    /// Advance v after a PPUDATA access, by 1 or 32 per PPUCTRL bit 2
    pub fn increment_vram_address(&mut self) {
        let increment = if self.ctrl.contains(PpuCtrl::VRAM_INCREMENT_32) {
            32
        } else {
            1
        };
        // v is 15 bits; only bus accesses wrap at $4000
        self.v = self.v.wrapping_add(increment) & 0x7FFF;
    }

    /// Increment coarse X, wrapping into the adjacent horizontal nametable
    pub fn increment_coarse_x(&mut self) {
        if (self.v & 0x001F) == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Increment fine Y. Coarse Y 29 flips the vertical nametable; rows 30
    /// and 31 are attribute territory and wrap without flipping.
    pub fn increment_fine_y(&mut self) {
        if (self.v & 0x7000) != 0x7000 {
            self.v += 0x1000;
        } else {
            self.v &= !0x7000;
            let mut y = (self.v & 0x03E0) >> 5;
            if y == 29 {
                y = 0;
                self.v ^= 0x0800;
            } else if y == 31 {
                y = 0;
            } else {
                y += 1;
            }
            self.v = (self.v & !0x03E0) | (y << 5);
        }
    }

    /// v: ....A.. ...BCDEF <- t: ....A.. ...BCDEF
    pub fn copy_horizontal_bits(&mut self) {
        self.v = (self.v & 0xFBE0) | (self.t & 0x041F);
    }

    /// v: GHIA.BC DEF..... <- t: GHIA.BC DEF.....
    pub fn copy_vertical_bits(&mut self) {
        self.v = (self.v & 0x841F) | (self.t & 0x7BE0);
    }

    pub fn v(&self) -> u16 {
        self.v
    }

    pub fn fine_x(&self) -> u8 {
        self.x
    }

    pub fn clear_write_toggle(&mut self) {
        self.w = false;
    }

    pub fn nmi_enabled(&self) -> bool {
        self.ctrl.contains(PpuCtrl::GENERATE_NMI)
    }

    pub fn background_enabled(&self) -> bool {
        self.mask.contains(PpuMask::SHOW_BACKGROUND)
    }

    pub fn sprites_enabled(&self) -> bool {
        self.mask.contains(PpuMask::SHOW_SPRITES)
    }

    pub fn rendering_enabled(&self) -> bool {
        self.background_enabled() || self.sprites_enabled()
    }

    /// Sprite height in pixels, 8 or 16
    pub fn sprite_height(&self) -> u16 {
        if self.ctrl.contains(PpuCtrl::SPRITE_8X16) {
            16
        } else {
            8
        }
    }

    pub fn background_pattern_base(&self) -> u16 {
        if self.ctrl.contains(PpuCtrl::BACKGROUND_PATTERN_HIGH) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite pattern table base, ignored in 8x16 mode
    pub fn sprite_pattern_base(&self) -> u16 {
        if self.ctrl.contains(PpuCtrl::SPRITE_PATTERN_HIGH) {
            0x1000
        } else {
            0x0000
        }
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
