/// Byte-addressable bus surface shared by the CPU and PPU cores.
///
/// Reads take a `suppress_side_effects` flag so debuggers and disassemblers
/// can inspect memory without disturbing read-sensitive hardware (PPUSTATUS
/// latch clear, PPUDATA buffer/increment, controller shift registers).
pub trait Bus {
    /// Read a byte from the bus.
    ///
    /// When `suppress_side_effects` is true the read must not mutate any
    /// latch, toggle, counter, or buffer.
    fn read(&mut self, addr: u16, suppress_side_effects: bool) -> u8;

    /// Write a byte to the bus.
    fn write(&mut self, addr: u16, value: u8);
}
