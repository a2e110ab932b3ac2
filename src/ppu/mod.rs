//! Dot-stepped PPU: timing, registers, background pipeline, batch sprite
//! compositing and the PPU-side bus.

mod background;
mod memory;
mod palette;
#[allow(clippy::module_inception)]
mod ppu;
mod registers;
mod sprites;
mod status;
mod timing;

pub use palette::SYSTEM_PALETTE;
pub use ppu::Ppu;
pub use registers::{PpuCtrl, PpuMask};
