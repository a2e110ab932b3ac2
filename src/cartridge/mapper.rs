/// Capability interface for NES cartridge mapping hardware.
///
/// The CPU and PPU buses pass every cartridge-visible access through these
/// four methods; the mapper translates addresses into its PRG/CHR storage
/// and, for PPU nametable addresses, into one of the two physical 1KiB VRAM
/// banks selected by the board's mirroring wiring.
///
/// `suppress_side_effects` marks debugger reads: a mapper with read-sensitive
/// registers must leave all internal state untouched when it is set.
pub trait Mapper {
    /// Read a byte from CPU address space. The bus routes $4020-$FFFF here;
    /// addresses the board leaves unmapped return 0xFF (open bus)
    fn cpu_read(&mut self, addr: u16, suppress_side_effects: bool) -> u8;

    /// Write a byte to CPU address space (PRG-RAM or mapper registers)
    fn cpu_write(&mut self, addr: u16, value: u8);

    /// Read a byte from PPU address space ($0000-$3EFF: pattern tables and
    /// nametables, after mirroring)
    fn ppu_read(&mut self, addr: u16, suppress_side_effects: bool) -> u8;

    /// Write a byte to PPU address space (CHR-RAM or nametable VRAM)
    fn ppu_write(&mut self, addr: u16, value: u8);
}
