use super::memory::PpuBus;
use super::palette;
use super::registers::{PpuMask, Registers};
use super::status::Status;
use crate::screen_buffer::ScreenBuffer;

/// OAM attribute byte mask; bits 2-4 are unimplemented and read back as 0
const OAM_ATTRIBUTE_MASK: u8 = 0xE3;

/// OAM storage and whole-frame sprite compositing.
///
/// Sprites are not evaluated per scanline. At the start of vertical blank
/// the full OAM is composited over the finished background in one pass,
/// back to front so that lower-index sprites win overlaps. Per-sprite
/// priority against the background uses the background opacity recorded
/// during the scan.
pub struct Sprites {
    oam: [u8; 256],
}

impl Sprites {
    pub fn new() -> Self {
        Self { oam: [0xFF; 256] }
    }

    pub fn reset(&mut self) {
        self.oam = [0xFF; 256];
    }

    pub fn read_oam(&self, addr: u8) -> u8 {
        self.oam[addr as usize]
    }

    pub fn write_oam(&mut self, addr: u8, value: u8) {
        let value = if addr % 4 == 2 {
            value & OAM_ATTRIBUTE_MASK
        } else {
            value
        };
        self.oam[addr as usize] = value;
    }

    /// Draw every visible sprite into the frame. `bg_opaque` holds one flag
    /// per screen pixel, set where the background drew a non-zero pattern
    /// value this frame.
    pub fn composite(
        &self,
        bus: &mut PpuBus,
        registers: &Registers,
        status: &mut Status,
        bg_opaque: &[bool],
        screen: &mut ScreenBuffer,
    ) {
        if !registers.sprites_enabled() {
            return;
        }

        let height = registers.sprite_height();
        self.check_overflow(status, height);

        let grayscale = registers.mask.contains(PpuMask::GRAYSCALE);
        let show_left = registers.mask.contains(PpuMask::SHOW_SPRITES_LEFT);

        // Rear to front: sprite 0 is drawn last and wins overlaps
        for index in (0..64).rev() {
            let base = index * 4;
            let top = self.oam[base] as u16 + 1;
            let tile = self.oam[base + 1];
            let attributes = self.oam[base + 2];
            let left = self.oam[base + 3] as u16;

            let palette_select = (attributes & 0x03) as u16;
            let behind_background = attributes & 0x20 != 0;
            let flip_horizontal = attributes & 0x40 != 0;
            let flip_vertical = attributes & 0x80 != 0;

            for row in 0..height {
                let screen_y = top + row;
                if screen_y >= ScreenBuffer::HEIGHT as u16 {
                    continue;
                }
                let sprite_row = if flip_vertical { height - 1 - row } else { row };
                let (pattern_addr, fine_y) = if height == 16 {
                    let bank = ((tile & 0x01) as u16) << 12;
                    let tile_index = (tile & 0xFE) as u16 + (sprite_row >= 8) as u16;
                    (bank + tile_index * 16, sprite_row % 8)
                } else {
                    (
                        registers.sprite_pattern_base() + tile as u16 * 16,
                        sprite_row,
                    )
                };
                let low = bus.read(pattern_addr + fine_y, false);
                let high = bus.read(pattern_addr + fine_y + 8, false);

                for column in 0..8u16 {
                    let screen_x = left + column;
                    if screen_x >= ScreenBuffer::WIDTH as u16 {
                        continue;
                    }
                    if screen_x < 8 && !show_left {
                        continue;
                    }
                    let bit = if flip_horizontal { column } else { 7 - column };
                    let value = (((high >> bit) & 1) << 1) | ((low >> bit) & 1);
                    if value == 0 {
                        continue;
                    }

                    let over_background = bg_opaque
                        [screen_y as usize * ScreenBuffer::WIDTH as usize + screen_x as usize];

                    if index == 0
                        && over_background
                        && registers.background_enabled()
                        && screen_x != 255
                    {
                        status.set_sprite_zero_hit();
                    }
                    if behind_background && over_background {
                        continue;
                    }

                    let entry =
                        bus.palette_entry(0x10 + palette_select * 4 + value as u16);
                    let (r, g, b) = palette::resolve(entry, grayscale);
                    screen.set_pixel(screen_x as u32, screen_y as u32, r, g, b);
                }
            }
        }
    }

    /// Set the overflow flag when any scanline holds more than eight
    /// sprites. The hardware's buggy diagonal evaluation is not modeled.
    fn check_overflow(&self, status: &mut Status, height: u16) {
        let mut counts = [0u8; ScreenBuffer::HEIGHT as usize];
        for index in 0..64 {
            let top = self.oam[index * 4] as u16 + 1;
            for row in 0..height {
                let screen_y = top + row;
                if let Some(count) = counts.get_mut(screen_y as usize) {
                    *count += 1;
                    if *count > 8 {
                        status.set_sprite_overflow();
                        return;
                    }
                }
            }
        }
    }
}

impl Default for Sprites {
    fn default() -> Self {
        Self::new()
    }
}
