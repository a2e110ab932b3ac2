use super::memory::PpuBus;

/// Background tile pipeline: the per-tile fetch latches and the 16-bit
/// shift registers the pixel mux reads through fine X.
///
/// Every eight dots the pipeline fetches a nametable byte, an attribute
/// quadrant, and the two pattern planes for one tile, then reloads the low
/// half of the shifters while the high half plays out the previous tile.
pub struct Background {
    /// Tile index fetched from the nametable
    nametable_latch: u8,
    /// 2-bit palette selection for the fetched tile
    attribute_latch: u8,
    pattern_low_latch: u8,
    pattern_high_latch: u8,

    pattern_low_shift: u16,
    pattern_high_shift: u16,
    /// Attribute bits replicated across a full byte so they shift in step
    /// with the pattern bits
    attribute_low_shift: u16,
    attribute_high_shift: u16,
}

impl Background {
    pub fn new() -> Self {
        Self {
            nametable_latch: 0,
            attribute_latch: 0,
            pattern_low_latch: 0,
            pattern_high_latch: 0,
            pattern_low_shift: 0,
            pattern_high_shift: 0,
            attribute_low_shift: 0,
            attribute_high_shift: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Shift all four registers left by one dot.
    pub fn shift(&mut self) {
        self.pattern_low_shift <<= 1;
        self.pattern_high_shift <<= 1;
        self.attribute_low_shift <<= 1;
        self.attribute_high_shift <<= 1;
    }

    /// Reload the low bytes of the shifters from the fetch latches.
    pub fn load_shifters(&mut self) {
        self.pattern_low_shift =
            (self.pattern_low_shift & 0xFF00) | self.pattern_low_latch as u16;
        self.pattern_high_shift =
            (self.pattern_high_shift & 0xFF00) | self.pattern_high_latch as u16;
        let attr_low = if self.attribute_latch & 0x01 != 0 { 0xFF } else { 0x00 };
        let attr_high = if self.attribute_latch & 0x02 != 0 { 0xFF } else { 0x00 };
        self.attribute_low_shift = (self.attribute_low_shift & 0xFF00) | attr_low;
        self.attribute_high_shift = (self.attribute_high_shift & 0xFF00) | attr_high;
    }

    /// Fetch the tile index at the address selected by v.
    pub fn fetch_nametable(&mut self, bus: &mut PpuBus, v: u16) {
        self.nametable_latch = bus.read(0x2000 | (v & 0x0FFF), false);
    }

    /// Fetch the attribute byte covering v's 4x4 tile area and extract the
    /// 2-bit quadrant for this tile.
    pub fn fetch_attribute(&mut self, bus: &mut PpuBus, v: u16) {
        let addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
        let byte = bus.read(addr, false);
        let shift = ((v >> 4) & 0x04) | (v & 0x02);
        self.attribute_latch = (byte >> shift) & 0x03;
    }

    /// Fetch the low pattern plane for the latched tile at v's fine Y.
    pub fn fetch_pattern_low(&mut self, bus: &mut PpuBus, v: u16, pattern_base: u16) {
        let addr = pattern_base + (self.nametable_latch as u16) * 16 + ((v >> 12) & 0x07);
        self.pattern_low_latch = bus.read(addr, false);
    }

    /// Fetch the high pattern plane, 8 bytes above the low plane.
    pub fn fetch_pattern_high(&mut self, bus: &mut PpuBus, v: u16, pattern_base: u16) {
        let addr =
            pattern_base + (self.nametable_latch as u16) * 16 + ((v >> 12) & 0x07) + 8;
        self.pattern_high_latch = bus.read(addr, false);
    }

    /// Select the current dot's 2-bit pattern value and 2-bit palette
    /// through the fine X mux.
    pub fn pixel(&self, fine_x: u8) -> (u8, u8) {
        let mux = 0x8000u16 >> fine_x;
        let p0 = (self.pattern_low_shift & mux != 0) as u8;
        let p1 = (self.pattern_high_shift & mux != 0) as u8;
        let a0 = (self.attribute_low_shift & mux != 0) as u8;
        let a1 = (self.attribute_high_shift & mux != 0) as u8;
        ((p1 << 1) | p0, (a1 << 1) | a0)
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}
