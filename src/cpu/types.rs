use bitflags::bitflags;
use thiserror::Error;

/// NMI vector address
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector address
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector address
pub const IRQ_VECTOR: u16 = 0xFFFE;

bitflags! {
    /// 6502 status register
    ///
    /// Bit layout: N V 1 B D I Z C. The decimal flag is stored but never
    /// affects arithmetic on the NES 2A03. BREAK only exists on the value
    /// pushed to the stack, never in the live register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const UNUSED = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

impl Status {
    /// Update the zero and negative flags from a result byte.
    pub fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }
}

/// Which interrupt line is being serviced by the current BRK sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    Reset,
    Nmi,
    Irq,
}

/// Fatal CPU conditions. The engine does not recover from these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CpuError {
    /// A fetched opcode has no defined behavior on this CPU
    #[error("unimplemented opcode {opcode:02X} at {pc:04X}")]
    UnimplementedOpcode { opcode: u8, pc: u16 },
}
