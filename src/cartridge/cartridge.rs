use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::cartridge::{Mapper, NromMapper};

const INES_MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];
const INES_HEADER_SIZE: usize = 16;
const PRG_BANK_SIZE: usize = 16384; // 16KB units in the header
const CHR_BANK_SIZE: usize = 8192; // 8KB units in the header

/// Errors raised while loading or parsing a cartridge image.
#[derive(Debug, Error)]
pub enum CartridgeError {
    /// I/O error while reading the ROM file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The image is not a well-formed iNES v1 container
    #[error("malformed iNES image: {0}")]
    MalformedRom(String),

    /// The image needs mapping hardware this emulator does not model
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),

    /// The image uses a cartridge feature this emulator does not model
    /// (battery RAM, trainer, four-screen VRAM, non-NES console types)
    #[error("unsupported cartridge feature: {0}")]
    UnsupportedFeature(&'static str),
}

/// Nametable mirroring wiring of the board.
///
/// Selects which of the two physical 1KiB VRAM banks backs each of the four
/// logical nametables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirroringMode {
    Vertical,
    Horizontal,
}

/// An NES cartridge: PRG/CHR storage behind pluggable mapping hardware.
pub struct Cartridge {
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Parse iNES v1 image data into a cartridge.
    pub fn new(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < INES_HEADER_SIZE || data[0..4] != INES_MAGIC {
            return Err(CartridgeError::MalformedRom(
                "missing NES<EOF> magic number".to_string(),
            ));
        }

        let prg_rom_size = data[4] as usize * PRG_BANK_SIZE;
        let chr_rom_size = data[5] as usize * CHR_BANK_SIZE;
        let flags6 = data[6];
        let flags7 = data[7];

        if prg_rom_size == 0 {
            return Err(CartridgeError::MalformedRom(
                "image declares no PRG-ROM".to_string(),
            ));
        }

        // Flags 6: low nibble of the mapper number plus board capabilities
        if flags6 & 0x02 != 0 {
            return Err(CartridgeError::UnsupportedFeature("battery-backed PRG-RAM"));
        }
        if flags6 & 0x04 != 0 {
            return Err(CartridgeError::UnsupportedFeature("512-byte trainer"));
        }
        if flags6 & 0x08 != 0 {
            return Err(CartridgeError::UnsupportedFeature("four-screen VRAM"));
        }

        // Flags 7: console type bits (VS System / PlayChoice-10)
        if flags7 & 0x03 != 0 {
            return Err(CartridgeError::UnsupportedFeature("non-NES console type"));
        }

        let mapper_number = (flags6 >> 4) | (flags7 & 0xF0);
        if mapper_number != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper_number));
        }

        let mirroring = if flags6 & 0x01 != 0 {
            MirroringMode::Vertical
        } else {
            MirroringMode::Horizontal
        };

        let prg_rom_start = INES_HEADER_SIZE;
        let prg_rom_end = prg_rom_start + prg_rom_size;
        let chr_rom_end = prg_rom_end + chr_rom_size;
        if data.len() < chr_rom_end {
            return Err(CartridgeError::MalformedRom(format!(
                "file is {} bytes but the header requires {}",
                data.len(),
                chr_rom_end
            )));
        }

        let prg_rom = data[prg_rom_start..prg_rom_end].to_vec();
        let chr_rom = data[prg_rom_end..chr_rom_end].to_vec();

        log::info!(
            "loaded NROM cartridge: {}KB PRG, {}KB {}, {:?} mirroring",
            prg_rom_size / 1024,
            if chr_rom_size == 0 { 8 } else { chr_rom_size / 1024 },
            if chr_rom_size == 0 { "CHR-RAM" } else { "CHR-ROM" },
            mirroring
        );

        Ok(Self {
            mapper: Box::new(NromMapper::new(prg_rom, chr_rom, mirroring)),
        })
    }

    /// Load and parse an iNES ROM file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = fs::read(path)?;
        Self::new(&data)
    }

    /// Build a cartridge directly from PRG/CHR data on an NROM board.
    pub fn from_parts(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: MirroringMode) -> Self {
        Self {
            mapper: Box::new(NromMapper::new(prg_rom, chr_rom, mirroring)),
        }
    }

    /// Read a byte seen from the CPU bus.
    pub fn cpu_read(&mut self, addr: u16, suppress_side_effects: bool) -> u8 {
        self.mapper.cpu_read(addr, suppress_side_effects)
    }

    /// Write a byte seen from the CPU bus.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        self.mapper.cpu_write(addr, value);
    }

    /// Read a byte seen from the PPU bus.
    pub fn ppu_read(&mut self, addr: u16, suppress_side_effects: bool) -> u8 {
        self.mapper.ppu_read(addr, suppress_side_effects)
    }

    /// Write a byte seen from the PPU bus.
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        self.mapper.ppu_write(addr, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rom(prg_banks: u8, chr_banks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut rom = vec![
            b'N', b'E', b'S', 0x1A, // magic
            prg_banks, chr_banks, flags6, flags7, // sizes and flags
            0, 0, 0, 0, 0, 0, 0, 0, // remainder of the header
        ];
        rom.extend(vec![0xAA; prg_banks as usize * PRG_BANK_SIZE]);
        rom.extend(vec![0xBB; chr_banks as usize * CHR_BANK_SIZE]);
        rom
    }

    #[test]
    fn test_load_valid_nrom() {
        let rom = test_rom(1, 1, 0x01, 0);
        let mut cart = Cartridge::new(&rom).unwrap();
        assert_eq!(cart.cpu_read(0x8000, false), 0xAA);
        assert_eq!(cart.ppu_read(0x0000, false), 0xBB);
    }

    #[test]
    fn test_bad_magic() {
        let mut rom = test_rom(1, 1, 0, 0);
        rom[0] = b'X';
        assert!(matches!(
            Cartridge::new(&rom),
            Err(CartridgeError::MalformedRom(_))
        ));
    }

    #[test]
    fn test_truncated_image() {
        let mut rom = test_rom(2, 1, 0, 0);
        rom.truncate(rom.len() - 1);
        assert!(matches!(
            Cartridge::new(&rom),
            Err(CartridgeError::MalformedRom(_))
        ));
    }

    #[test]
    fn test_unsupported_mapper_number() {
        // Mapper 1 (MMC1): flags6 upper nibble = 1
        let rom = test_rom(1, 1, 0x10, 0);
        assert!(matches!(
            Cartridge::new(&rom),
            Err(CartridgeError::UnsupportedMapper(1))
        ));
    }

    #[test]
    fn test_unsupported_features_rejected() {
        for flags6 in [0x02, 0x04, 0x08] {
            let rom = test_rom(1, 1, flags6, 0);
            assert!(matches!(
                Cartridge::new(&rom),
                Err(CartridgeError::UnsupportedFeature(_))
            ));
        }
    }

    #[test]
    fn test_console_type_rejected() {
        let rom = test_rom(1, 1, 0, 0x01);
        assert!(matches!(
            Cartridge::new(&rom),
            Err(CartridgeError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_mirroring_flag() {
        // Vertical mirroring bit set: $2800 must alias $2000
        let rom = test_rom(1, 0, 0x01, 0);
        let mut cart = Cartridge::new(&rom).unwrap();
        cart.ppu_write(0x2000, 0x42);
        assert_eq!(cart.ppu_read(0x2800, false), 0x42);
    }
}
