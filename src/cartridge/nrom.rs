use crate::cartridge::{Mapper, MirroringMode};

const PRG_RAM_SIZE: usize = 8192;
const CHR_RAM_SIZE: usize = 8192;
const VRAM_BANK_SIZE: usize = 1024;

/// NROM board (mapper 0)
///
/// Fixed mapping, no bank switching:
/// - 16KB or 32KB PRG-ROM at $8000-$FFFF (16KB images mirror at $C000)
/// - 8KB PRG-RAM at $6000-$7FFF
/// - 8KB CHR-ROM, or CHR-RAM when the image carries no CHR data
/// - Solder-pad-fixed horizontal or vertical nametable mirroring over the
///   two physical 1KiB VRAM banks
pub struct NromMapper {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    vram: [u8; 2 * VRAM_BANK_SIZE],
    mirroring: MirroringMode,
}

impl NromMapper {
    /// Create a new NROM board. An empty `chr_rom` allocates 8KB of CHR-RAM.
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: MirroringMode) -> Self {
        let chr_is_ram = chr_rom.is_empty();
        let chr = if chr_is_ram {
            vec![0; CHR_RAM_SIZE]
        } else {
            chr_rom
        };

        Self {
            prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr,
            chr_is_ram,
            vram: [0; 2 * VRAM_BANK_SIZE],
            mirroring,
        }
    }

    /// Map a logical nametable address ($2000-$2FFF) onto one of the two
    /// physical VRAM banks according to the board's mirroring wiring.
    fn vram_offset(&self, addr: u16) -> usize {
        let logical = ((addr - 0x2000) >> 10) & 0x03;
        let bank = match self.mirroring {
            // Vertical: $2000/$2800 share bank 0, $2400/$2C00 bank 1
            MirroringMode::Vertical => logical & 0x01,
            // Horizontal: $2000/$2400 share bank 0, $2800/$2C00 bank 1
            MirroringMode::Horizontal => (logical >> 1) & 0x01,
        };
        bank as usize * VRAM_BANK_SIZE + (addr as usize & 0x03FF)
    }
}

impl Mapper for NromMapper {
    fn cpu_read(&mut self, addr: u16, _suppress_side_effects: bool) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize],
            0x8000..=0xFFFF => {
                let offset = (addr - 0x8000) as usize % self.prg_rom.len();
                self.prg_rom[offset]
            }
            // Unmapped: all lines pulled high
            _ => 0xFF,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize] = value,
            0x8000..=0xFFFF => {
                // NROM has no mapper registers; PRG-ROM writes are dropped
                log::trace!("NROM: ignored write {value:02X} to ROM address {addr:04X}");
            }
            _ => {}
        }
    }

    fn ppu_read(&mut self, addr: u16, _suppress_side_effects: bool) -> u8 {
        match addr & 0x3FFF {
            0x0000..=0x1FFF => self.chr[addr as usize % self.chr.len()],
            0x2000..=0x3EFF => self.vram[self.vram_offset(addr & 0x2FFF)],
            _ => 0xFF,
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        match addr & 0x3FFF {
            0x0000..=0x1FFF => {
                if self.chr_is_ram {
                    let offset = addr as usize % self.chr.len();
                    self.chr[offset] = value;
                }
            }
            0x2000..=0x3EFF => {
                let offset = self.vram_offset(addr & 0x2FFF);
                self.vram[offset] = value;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper_with(mirroring: MirroringMode) -> NromMapper {
        NromMapper::new(vec![0; 0x4000], Vec::new(), mirroring)
    }

    #[test]
    fn test_prg_rom_16k_mirrors_at_c000() {
        let mut prg = vec![0; 0x4000];
        prg[0x0123] = 0xAB;
        let mut mapper = NromMapper::new(prg, Vec::new(), MirroringMode::Vertical);

        assert_eq!(mapper.cpu_read(0x8123, false), 0xAB);
        assert_eq!(mapper.cpu_read(0xC123, false), 0xAB);
    }

    #[test]
    fn test_prg_ram_read_write() {
        let mut mapper = mapper_with(MirroringMode::Vertical);
        mapper.cpu_write(0x6010, 0x5A);
        assert_eq!(mapper.cpu_read(0x6010, false), 0x5A);
    }

    #[test]
    fn test_prg_rom_write_is_ignored() {
        let mut mapper = mapper_with(MirroringMode::Vertical);
        let before = mapper.cpu_read(0x8000, false);
        mapper.cpu_write(0x8000, !before);
        assert_eq!(mapper.cpu_read(0x8000, false), before);
    }

    #[test]
    fn test_chr_ram_when_no_chr_rom() {
        let mut mapper = mapper_with(MirroringMode::Vertical);
        mapper.ppu_write(0x1000, 0x77);
        assert_eq!(mapper.ppu_read(0x1000, false), 0x77);
    }

    #[test]
    fn test_chr_rom_is_read_only() {
        let mut chr = vec![0; 0x2000];
        chr[0x0042] = 0x24;
        let mut mapper = NromMapper::new(vec![0; 0x4000], chr, MirroringMode::Vertical);

        mapper.ppu_write(0x0042, 0xFF);
        assert_eq!(mapper.ppu_read(0x0042, false), 0x24);
    }

    #[test]
    fn test_vertical_mirroring_banks() {
        let mut mapper = mapper_with(MirroringMode::Vertical);
        mapper.ppu_write(0x2000, 0x11);
        mapper.ppu_write(0x2400, 0x22);

        // $2800 aliases $2000, $2C00 aliases $2400
        assert_eq!(mapper.ppu_read(0x2800, false), 0x11);
        assert_eq!(mapper.ppu_read(0x2C00, false), 0x22);
    }

    #[test]
    fn test_horizontal_mirroring_banks() {
        let mut mapper = mapper_with(MirroringMode::Horizontal);
        mapper.ppu_write(0x2000, 0x11);
        mapper.ppu_write(0x2800, 0x22);

        // $2400 aliases $2000, $2C00 aliases $2800
        assert_eq!(mapper.ppu_read(0x2400, false), 0x11);
        assert_eq!(mapper.ppu_read(0x2C00, false), 0x22);
    }

    #[test]
    fn test_unmapped_cpu_read_is_all_ones() {
        let mut mapper = mapper_with(MirroringMode::Vertical);
        assert_eq!(mapper.cpu_read(0x4020, false), 0xFF);
        assert_eq!(mapper.cpu_read(0x5123, false), 0xFF);
    }
}
