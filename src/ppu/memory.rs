use std::cell::RefCell;
use std::rc::Rc;

use crate::cartridge::Cartridge;

/// The PPU's private 14-bit address space: palette RAM lives here, while
/// pattern tables and nametables are forwarded to the cartridge, which owns
/// CHR memory and the nametable VRAM banks.
pub struct PpuBus {
    /// 32 bytes of palette RAM at $3F00-$3F1F, mirrored through $3FFF
    palette: [u8; 32],
    cartridge: Option<Rc<RefCell<Cartridge>>>,
}

impl PpuBus {
    pub fn new() -> Self {
        Self {
            palette: [0; 32],
            cartridge: None,
        }
    }

    pub fn attach_cartridge(&mut self, cartridge: Rc<RefCell<Cartridge>>) {
        self.cartridge = Some(cartridge);
    }

    pub fn read(&mut self, addr: u16, suppress_side_effects: bool) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x3F00..=0x3FFF => self.palette[palette_index(addr)],
            _ => match &self.cartridge {
                Some(cartridge) => cartridge
                    .borrow_mut()
                    .ppu_read(addr, suppress_side_effects),
                None => 0xFF,
            },
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x3F00..=0x3FFF => self.palette[palette_index(addr)] = value,
            _ => {
                if let Some(cartridge) = &self.cartridge {
                    cartridge.borrow_mut().ppu_write(addr, value);
                }
            }
        }
    }

    /// Direct palette lookup for pixel output, bypassing the cartridge path
    pub fn palette_entry(&self, index: u16) -> u8 {
        self.palette[palette_index(0x3F00 | (index & 0x1F))]
    }
}

impl Default for PpuBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a $3Fxx address to its palette RAM slot. Entries $3F10/$3F14/$3F18/
/// $3F1C mirror their background counterparts.
fn palette_index(addr: u16) -> usize {
    let mut index = (addr & 0x1F) as usize;
    if index >= 16 && index % 4 == 0 {
        index -= 16;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_read_write() {
        let mut bus = PpuBus::new();
        bus.write(0x3F00, 0x21);
        bus.write(0x3F07, 0x15);
        assert_eq!(bus.read(0x3F00, false), 0x21);
        assert_eq!(bus.read(0x3F07, false), 0x15);
    }

    #[test]
    fn test_palette_mirrors_through_3fff() {
        let mut bus = PpuBus::new();
        bus.write(0x3F01, 0x30);
        assert_eq!(bus.read(0x3F21, false), 0x30);
        assert_eq!(bus.read(0x3FE1, false), 0x30);
    }

    #[test]
    fn test_sprite_backdrop_mirrors_background() {
        let mut bus = PpuBus::new();
        bus.write(0x3F10, 0x0F);
        assert_eq!(bus.read(0x3F00, false), 0x0F);
        bus.write(0x3F04, 0x2A);
        assert_eq!(bus.read(0x3F14, false), 0x2A);
        // Non-multiple-of-four sprite entries are distinct
        bus.write(0x3F11, 0x01);
        bus.write(0x3F01, 0x02);
        assert_eq!(bus.read(0x3F11, false), 0x01);
    }

    #[test]
    fn test_missing_cartridge_reads_open() {
        let mut bus = PpuBus::new();
        assert_eq!(bus.read(0x0000, false), 0xFF);
        assert_eq!(bus.read(0x2000, false), 0xFF);
    }

    #[test]
    fn test_address_wraps_at_14_bits() {
        let mut bus = PpuBus::new();
        bus.write(0x3F02, 0x13);
        // $7F02 folds into the palette range
        assert_eq!(bus.read(0x7F02, false), 0x13);
    }
}
