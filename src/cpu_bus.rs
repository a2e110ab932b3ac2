use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::joypad::Joypad;
use crate::ppu::Ppu;

/// The CPU's 64KB address space: 2KB of internal RAM mirrored to $1FFF,
/// the PPU register window, the controller ports, the OAM DMA port, and
/// the cartridge from $4020 up.
///
/// Unmapped reads return the open-bus value, the last byte driven onto the
/// data bus.
pub struct CpuBus {
    ram: [u8; 0x0800],
    ppu: Rc<RefCell<Ppu>>,
    cartridge: Option<Rc<RefCell<Cartridge>>>,
    joypad1: Joypad,
    joypad2: Joypad,
    /// Page latched by a $4014 write, consumed by the orchestrator
    pending_oam_dma: Option<u8>,
    open_bus: u8,
}

impl CpuBus {
    pub fn new(ppu: Rc<RefCell<Ppu>>) -> Self {
        Self {
            ram: [0; 0x0800],
            ppu,
            cartridge: None,
            joypad1: Joypad::new(),
            joypad2: Joypad::new(),
            pending_oam_dma: None,
            open_bus: 0xFF,
        }
    }

    pub fn attach_cartridge(&mut self, cartridge: Rc<RefCell<Cartridge>>) {
        self.cartridge = Some(cartridge);
    }

    pub fn joypad1_mut(&mut self) -> &mut Joypad {
        &mut self.joypad1
    }

    pub fn joypad2_mut(&mut self) -> &mut Joypad {
        &mut self.joypad2
    }

    /// Take the page number of a pending OAM DMA, if a $4014 write landed
    /// since the last call.
    pub fn take_pending_oam_dma(&mut self) -> Option<u8> {
        self.pending_oam_dma.take()
    }
}

impl Bus for CpuBus {
    fn read(&mut self, addr: u16, suppress_side_effects: bool) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers, mirrored every 8 bytes through $3FFF
            0x2000..=0x3FFF => self
                .ppu
                .borrow_mut()
                .read_register(addr & 0x0007, suppress_side_effects),

            0x4016 => {
                let bit = if suppress_side_effects {
                    self.joypad1.peek()
                } else {
                    self.joypad1.read()
                };
                (self.open_bus & 0xE0) | bit
            }
            0x4017 => {
                let bit = if suppress_side_effects {
                    self.joypad2.peek()
                } else {
                    self.joypad2.read()
                };
                (self.open_bus & 0xE0) | bit
            }

            // APU registers and $4014 are write-only
            0x4000..=0x401F => self.open_bus,

            0x4020..=0xFFFF => match &self.cartridge {
                Some(cartridge) => cartridge
                    .borrow_mut()
                    .cpu_read(addr, suppress_side_effects),
                None => 0xFF,
            },
        };

        if !suppress_side_effects {
            self.open_bus = value;
        }
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,

            0x2000..=0x3FFF => self
                .ppu
                .borrow_mut()
                .write_register(addr & 0x0007, value),

            0x4014 => self.pending_oam_dma = Some(value),

            0x4016 => {
                self.joypad1.write_strobe(value);
                self.joypad2.write_strobe(value);
            }

            // Remaining APU and I/O registers are not modeled
            0x4000..=0x401F => {}

            0x4020..=0xFFFF => {
                if let Some(cartridge) = &self.cartridge {
                    cartridge.borrow_mut().cpu_write(addr, value);
                }
            }
        }
    }
}
