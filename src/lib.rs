//! A cycle-stepped NES emulator core: 6502 CPU, dot-stepped PPU, NROM
//! cartridges and standard controllers, driven off a single master clock.

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod cpu_bus;
pub mod eventloop;
pub mod joypad;
pub mod nes;
pub mod ppu;
pub mod screen_buffer;
