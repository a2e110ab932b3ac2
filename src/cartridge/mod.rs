mod cartridge;
mod mapper;
mod nrom;

pub use cartridge::{Cartridge, CartridgeError, MirroringMode};
pub use mapper::Mapper;
pub use nrom::NromMapper;
