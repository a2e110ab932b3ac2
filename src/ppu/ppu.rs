use std::cell::RefCell;
use std::rc::Rc;

use crate::cartridge::Cartridge;
use crate::screen_buffer::ScreenBuffer;

use super::background::Background;
use super::memory::PpuBus;
use super::palette;
use super::registers::{PpuMask, Registers};
use super::sprites::Sprites;
use super::status::Status;
use super::timing::{PRE_RENDER_SCANLINE, Timing, VBLANK_SCANLINE};

/// The dot-stepped picture processor.
///
/// Each call to `tick` handles one dot at the current (scanline, dot)
/// position and then advances. The background pipeline runs dot by dot;
/// sprites are composited in a single pass when the frame enters vertical
/// blank, so the finished frame and the frame-complete signal appear
/// together at (241, 1).
pub struct Ppu {
    timing: Timing,
    status: Status,
    pub registers: Registers,
    bus: PpuBus,
    background: Background,
    sprites: Sprites,
    screen: ScreenBuffer,
    /// Per-pixel background opacity for sprite priority and sprite 0 hit
    bg_opaque: Vec<bool>,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            timing: Timing::new(),
            status: Status::new(),
            registers: Registers::new(),
            bus: PpuBus::new(),
            background: Background::new(),
            sprites: Sprites::new(),
            screen: ScreenBuffer::new(),
            bg_opaque: vec![false; (ScreenBuffer::WIDTH * ScreenBuffer::HEIGHT) as usize],
        }
    }

    pub fn reset(&mut self) {
        self.timing.reset();
        self.status.reset();
        self.registers.reset();
        self.background.reset();
        self.sprites.reset();
        self.bg_opaque.fill(false);
    }

    pub fn attach_cartridge(&mut self, cartridge: Rc<RefCell<Cartridge>>) {
        self.bus.attach_cartridge(cartridge);
    }

    /// Run one PPU dot.
    pub fn tick(&mut self) {
        let scanline = self.timing.scanline;
        let dot = self.timing.dot;
        let rendering = self.registers.rendering_enabled();

        if scanline == VBLANK_SCANLINE && dot == 1 {
            // Layer sprites over the finished background, then raise the
            // vblank flag and the frame-complete signal
            self.sprites.composite(
                &mut self.bus,
                &self.registers,
                &mut self.status,
                &self.bg_opaque,
                &mut self.screen,
            );
            self.status.enter_vblank(self.registers.nmi_enabled());
        }

        if scanline == PRE_RENDER_SCANLINE && dot == 1 {
            self.status.clear_frame_flags();
        }

        if rendering && self.timing.is_fetch_scanline() {
            self.run_background_pipeline(scanline, dot);
        }

        if self.timing.is_visible_pixel() {
            self.draw_background_pixel(scanline, dot);
        }

        self.timing.tick(rendering);
    }

    /// Background fetches and scroll-register bookkeeping for one dot of a
    /// visible or pre-render scanline.
    fn run_background_pipeline(&mut self, scanline: u16, dot: u16) {
        if (2..=257).contains(&dot) || (321..=337).contains(&dot) {
            self.background.shift();
            match (dot - 1) % 8 {
                0 => {
                    self.background.load_shifters();
                    self.background
                        .fetch_nametable(&mut self.bus, self.registers.v());
                }
                2 => self
                    .background
                    .fetch_attribute(&mut self.bus, self.registers.v()),
                4 => self.background.fetch_pattern_low(
                    &mut self.bus,
                    self.registers.v(),
                    self.registers.background_pattern_base(),
                ),
                6 => self.background.fetch_pattern_high(
                    &mut self.bus,
                    self.registers.v(),
                    self.registers.background_pattern_base(),
                ),
                7 => self.registers.increment_coarse_x(),
                _ => {}
            }
        }

        if dot == 256 {
            self.registers.increment_fine_y();
        }
        if dot == 257 {
            self.registers.copy_horizontal_bits();
        }
        if scanline == PRE_RENDER_SCANLINE && (280..=304).contains(&dot) {
            self.registers.copy_vertical_bits();
        }
    }

    fn draw_background_pixel(&mut self, scanline: u16, dot: u16) {
        let x = dot - 1;
        let y = scanline;

        let show_background = self.registers.background_enabled()
            && (x >= 8 || self.registers.mask.contains(PpuMask::SHOW_BACKGROUND_LEFT));

        let (pattern, palette_select) = if show_background {
            self.background.pixel(self.registers.fine_x())
        } else {
            (0, 0)
        };

        let entry = if pattern == 0 {
            self.bus.palette_entry(0)
        } else {
            self.bus
                .palette_entry(palette_select as u16 * 4 + pattern as u16)
        };

        self.bg_opaque[y as usize * ScreenBuffer::WIDTH as usize + x as usize] = pattern != 0;

        let grayscale = self.registers.mask.contains(PpuMask::GRAYSCALE);
        let (r, g, b) = palette::resolve(entry, grayscale);
        self.screen.set_pixel(x as u32, y as u32, r, g, b);
    }

    /// Read one of the eight CPU-visible registers ($2000-$2007, already
    /// mirrored down by the caller). Write-only registers return the I/O
    /// bus latch.
    pub fn read_register(&mut self, register: u16, suppress_side_effects: bool) -> u8 {
        let value = match register & 0x07 {
            2 => {
                let value = self
                    .status
                    .read(self.registers.io_bus(), suppress_side_effects);
                if !suppress_side_effects {
                    self.registers.clear_write_toggle();
                }
                value
            }
            4 => self.sprites.read_oam(self.registers.oam_address),
            7 => self.read_data(suppress_side_effects),
            _ => self.registers.io_bus(),
        };
        if !suppress_side_effects {
            self.registers.set_io_bus(value);
        }
        value
    }

    /// Write one of the eight CPU-visible registers.
    pub fn write_register(&mut self, register: u16, value: u8) {
        self.registers.set_io_bus(value);
        match register & 0x07 {
            0 => {
                let was_enabled = self.registers.nmi_enabled();
                self.registers.write_ctrl(value);
                // Enabling NMI generation while the vblank flag is still
                // set fires one immediately
                if !was_enabled && self.registers.nmi_enabled() && self.status.in_vblank() {
                    self.status.trigger_nmi();
                }
            }
            1 => self.registers.write_mask(value),
            3 => self.registers.oam_address = value,
            4 => self.oam_dma_write(value),
            5 => self.registers.write_scroll(value),
            6 => self.registers.write_address(value),
            7 => {
                self.bus.write(self.registers.v() & 0x3FFF, value);
                self.registers.increment_vram_address();
            }
            _ => {}
        }
    }

    /// Store one byte at the current OAM address and advance it. Used by
    /// the $2004 port and by OAM DMA.
    pub fn oam_dma_write(&mut self, value: u8) {
        self.sprites.write_oam(self.registers.oam_address, value);
        self.registers.oam_address = self.registers.oam_address.wrapping_add(1);
    }

    /// PPUDATA read with the one-byte buffer delay. Palette addresses
    /// bypass the buffer; the buffer refills from the nametable underneath.
    fn read_data(&mut self, suppress_side_effects: bool) -> u8 {
        let addr = self.registers.v() & 0x3FFF;
        if suppress_side_effects {
            return if addr >= 0x3F00 {
                self.bus.read(addr, true)
            } else {
                self.registers.data_buffer()
            };
        }

        let value = if addr >= 0x3F00 {
            let direct = self.bus.read(addr, false);
            let beneath = self.bus.read(addr - 0x1000, false);
            self.registers.set_data_buffer(beneath);
            direct
        } else {
            let buffered = self.registers.data_buffer();
            let fresh = self.bus.read(addr, false);
            self.registers.set_data_buffer(fresh);
            buffered
        };
        self.registers.increment_vram_address();
        value
    }

    /// Take the pending NMI request, if any.
    pub fn poll_nmi(&mut self) -> bool {
        self.status.poll_nmi()
    }

    /// Take the frame-complete signal, if any.
    pub fn poll_frame_complete(&mut self) -> bool {
        self.status.poll_frame_complete()
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn rendering_enabled(&self) -> bool {
        self.registers.rendering_enabled()
    }

    pub fn frame_count(&self) -> u64 {
        self.timing.frame_count()
    }

    pub fn total_cycles(&self) -> u64 {
        self.timing.total_cycles()
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
