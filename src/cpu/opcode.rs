//! Static 6502 opcode decode table.
//!
//! Every one of the 256 opcode bytes maps to an instruction kind, an
//! addressing mode, and a bus-access classification. Slots with no defined
//! behavior (the KIL/JAM bytes and the unstable opcodes this core does not
//! model) carry the `Instruction::None` sentinel; fetching one is a fatal
//! `UnimplementedOpcode` condition.

/// Instruction kinds, documented and undocumented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Sentinel for opcode bytes with no implemented behavior
    None,
    // Documented instructions
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Undocumented instructions with stable, defined composites
    Alr,
    Anc,
    Arr,
    Dcp,
    Isc,
    Lax,
    Lxa,
    Rla,
    Rra,
    Sax,
    Sbx,
    Shx,
    Shy,
    Slo,
    Sre,
}

/// 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

/// Bus-access shape of an instruction's data cycle(s).
///
/// Read-class indexed addressing takes the page-cross penalty cycle only
/// when the index addition carries; write and read-modify-write class
/// always take it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadModifyWrite,
}

/// One decoded opcode table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub instruction: Instruction,
    pub mode: AddressingMode,
    pub access: Access,
    pub undocumented: bool,
}

const fn op(instruction: Instruction, mode: AddressingMode, access: Access) -> Opcode {
    Opcode {
        instruction,
        mode,
        access,
        undocumented: false,
    }
}

const fn undoc(instruction: Instruction, mode: AddressingMode, access: Access) -> Opcode {
    Opcode {
        instruction,
        mode,
        access,
        undocumented: true,
    }
}

const NONE: Opcode = Opcode {
    instruction: Instruction::None,
    mode: AddressingMode::Implied,
    access: Access::Read,
    undocumented: true,
};

use Access as A;
use AddressingMode as M;
use Instruction as I;

/// The full 256-entry decode table, indexed by opcode byte.
#[rustfmt::skip]
pub static OPCODES: [Opcode; 256] = [
    // 0x00-0x0F
    op(I::Brk, M::Implied, A::Read),
    op(I::Ora, M::IndexedIndirect, A::Read),
    NONE,
    undoc(I::Slo, M::IndexedIndirect, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPage, A::Read),
    op(I::Ora, M::ZeroPage, A::Read),
    op(I::Asl, M::ZeroPage, A::ReadModifyWrite),
    undoc(I::Slo, M::ZeroPage, A::ReadModifyWrite),
    op(I::Php, M::Implied, A::Read),
    op(I::Ora, M::Immediate, A::Read),
    op(I::Asl, M::Accumulator, A::Read),
    undoc(I::Anc, M::Immediate, A::Read),
    undoc(I::Nop, M::Absolute, A::Read),
    op(I::Ora, M::Absolute, A::Read),
    op(I::Asl, M::Absolute, A::ReadModifyWrite),
    undoc(I::Slo, M::Absolute, A::ReadModifyWrite),
    // 0x10-0x1F
    op(I::Bpl, M::Relative, A::Read),
    op(I::Ora, M::IndirectIndexed, A::Read),
    NONE,
    undoc(I::Slo, M::IndirectIndexed, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPageX, A::Read),
    op(I::Ora, M::ZeroPageX, A::Read),
    op(I::Asl, M::ZeroPageX, A::ReadModifyWrite),
    undoc(I::Slo, M::ZeroPageX, A::ReadModifyWrite),
    op(I::Clc, M::Implied, A::Read),
    op(I::Ora, M::AbsoluteY, A::Read),
    undoc(I::Nop, M::Implied, A::Read),
    undoc(I::Slo, M::AbsoluteY, A::ReadModifyWrite),
    undoc(I::Nop, M::AbsoluteX, A::Read),
    op(I::Ora, M::AbsoluteX, A::Read),
    op(I::Asl, M::AbsoluteX, A::ReadModifyWrite),
    undoc(I::Slo, M::AbsoluteX, A::ReadModifyWrite),
    // 0x20-0x2F
    op(I::Jsr, M::Absolute, A::Read),
    op(I::And, M::IndexedIndirect, A::Read),
    NONE,
    undoc(I::Rla, M::IndexedIndirect, A::ReadModifyWrite),
    op(I::Bit, M::ZeroPage, A::Read),
    op(I::And, M::ZeroPage, A::Read),
    op(I::Rol, M::ZeroPage, A::ReadModifyWrite),
    undoc(I::Rla, M::ZeroPage, A::ReadModifyWrite),
    op(I::Plp, M::Implied, A::Read),
    op(I::And, M::Immediate, A::Read),
    op(I::Rol, M::Accumulator, A::Read),
    undoc(I::Anc, M::Immediate, A::Read),
    op(I::Bit, M::Absolute, A::Read),
    op(I::And, M::Absolute, A::Read),
    op(I::Rol, M::Absolute, A::ReadModifyWrite),
    undoc(I::Rla, M::Absolute, A::ReadModifyWrite),
    // 0x30-0x3F
    op(I::Bmi, M::Relative, A::Read),
    op(I::And, M::IndirectIndexed, A::Read),
    NONE,
    undoc(I::Rla, M::IndirectIndexed, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPageX, A::Read),
    op(I::And, M::ZeroPageX, A::Read),
    op(I::Rol, M::ZeroPageX, A::ReadModifyWrite),
    undoc(I::Rla, M::ZeroPageX, A::ReadModifyWrite),
    op(I::Sec, M::Implied, A::Read),
    op(I::And, M::AbsoluteY, A::Read),
    undoc(I::Nop, M::Implied, A::Read),
    undoc(I::Rla, M::AbsoluteY, A::ReadModifyWrite),
    undoc(I::Nop, M::AbsoluteX, A::Read),
    op(I::And, M::AbsoluteX, A::Read),
    op(I::Rol, M::AbsoluteX, A::ReadModifyWrite),
    undoc(I::Rla, M::AbsoluteX, A::ReadModifyWrite),
    // 0x40-0x4F
    op(I::Rti, M::Implied, A::Read),
    op(I::Eor, M::IndexedIndirect, A::Read),
    NONE,
    undoc(I::Sre, M::IndexedIndirect, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPage, A::Read),
    op(I::Eor, M::ZeroPage, A::Read),
    op(I::Lsr, M::ZeroPage, A::ReadModifyWrite),
    undoc(I::Sre, M::ZeroPage, A::ReadModifyWrite),
    op(I::Pha, M::Implied, A::Read),
    op(I::Eor, M::Immediate, A::Read),
    op(I::Lsr, M::Accumulator, A::Read),
    undoc(I::Alr, M::Immediate, A::Read),
    op(I::Jmp, M::Absolute, A::Read),
    op(I::Eor, M::Absolute, A::Read),
    op(I::Lsr, M::Absolute, A::ReadModifyWrite),
    undoc(I::Sre, M::Absolute, A::ReadModifyWrite),
    // 0x50-0x5F
    op(I::Bvc, M::Relative, A::Read),
    op(I::Eor, M::IndirectIndexed, A::Read),
    NONE,
    undoc(I::Sre, M::IndirectIndexed, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPageX, A::Read),
    op(I::Eor, M::ZeroPageX, A::Read),
    op(I::Lsr, M::ZeroPageX, A::ReadModifyWrite),
    undoc(I::Sre, M::ZeroPageX, A::ReadModifyWrite),
    op(I::Cli, M::Implied, A::Read),
    op(I::Eor, M::AbsoluteY, A::Read),
    undoc(I::Nop, M::Implied, A::Read),
    undoc(I::Sre, M::AbsoluteY, A::ReadModifyWrite),
    undoc(I::Nop, M::AbsoluteX, A::Read),
    op(I::Eor, M::AbsoluteX, A::Read),
    op(I::Lsr, M::AbsoluteX, A::ReadModifyWrite),
    undoc(I::Sre, M::AbsoluteX, A::ReadModifyWrite),
    // 0x60-0x6F
    op(I::Rts, M::Implied, A::Read),
    op(I::Adc, M::IndexedIndirect, A::Read),
    NONE,
    undoc(I::Rra, M::IndexedIndirect, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPage, A::Read),
    op(I::Adc, M::ZeroPage, A::Read),
    op(I::Ror, M::ZeroPage, A::ReadModifyWrite),
    undoc(I::Rra, M::ZeroPage, A::ReadModifyWrite),
    op(I::Pla, M::Implied, A::Read),
    op(I::Adc, M::Immediate, A::Read),
    op(I::Ror, M::Accumulator, A::Read),
    undoc(I::Arr, M::Immediate, A::Read),
    op(I::Jmp, M::Indirect, A::Read),
    op(I::Adc, M::Absolute, A::Read),
    op(I::Ror, M::Absolute, A::ReadModifyWrite),
    undoc(I::Rra, M::Absolute, A::ReadModifyWrite),
    // 0x70-0x7F
    op(I::Bvs, M::Relative, A::Read),
    op(I::Adc, M::IndirectIndexed, A::Read),
    NONE,
    undoc(I::Rra, M::IndirectIndexed, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPageX, A::Read),
    op(I::Adc, M::ZeroPageX, A::Read),
    op(I::Ror, M::ZeroPageX, A::ReadModifyWrite),
    undoc(I::Rra, M::ZeroPageX, A::ReadModifyWrite),
    op(I::Sei, M::Implied, A::Read),
    op(I::Adc, M::AbsoluteY, A::Read),
    undoc(I::Nop, M::Implied, A::Read),
    undoc(I::Rra, M::AbsoluteY, A::ReadModifyWrite),
    undoc(I::Nop, M::AbsoluteX, A::Read),
    op(I::Adc, M::AbsoluteX, A::Read),
    op(I::Ror, M::AbsoluteX, A::ReadModifyWrite),
    undoc(I::Rra, M::AbsoluteX, A::ReadModifyWrite),
    // 0x80-0x8F
    undoc(I::Nop, M::Immediate, A::Read),
    op(I::Sta, M::IndexedIndirect, A::Write),
    undoc(I::Nop, M::Immediate, A::Read),
    undoc(I::Sax, M::IndexedIndirect, A::Write),
    op(I::Sty, M::ZeroPage, A::Write),
    op(I::Sta, M::ZeroPage, A::Write),
    op(I::Stx, M::ZeroPage, A::Write),
    undoc(I::Sax, M::ZeroPage, A::Write),
    op(I::Dey, M::Implied, A::Read),
    undoc(I::Nop, M::Immediate, A::Read),
    op(I::Txa, M::Implied, A::Read),
    NONE,
    op(I::Sty, M::Absolute, A::Write),
    op(I::Sta, M::Absolute, A::Write),
    op(I::Stx, M::Absolute, A::Write),
    undoc(I::Sax, M::Absolute, A::Write),
    // 0x90-0x9F
    op(I::Bcc, M::Relative, A::Read),
    op(I::Sta, M::IndirectIndexed, A::Write),
    NONE,
    NONE,
    op(I::Sty, M::ZeroPageX, A::Write),
    op(I::Sta, M::ZeroPageX, A::Write),
    op(I::Stx, M::ZeroPageY, A::Write),
    undoc(I::Sax, M::ZeroPageY, A::Write),
    op(I::Tya, M::Implied, A::Read),
    op(I::Sta, M::AbsoluteY, A::Write),
    op(I::Txs, M::Implied, A::Read),
    NONE,
    undoc(I::Shy, M::AbsoluteX, A::Write),
    op(I::Sta, M::AbsoluteX, A::Write),
    undoc(I::Shx, M::AbsoluteY, A::Write),
    NONE,
    // 0xA0-0xAF
    op(I::Ldy, M::Immediate, A::Read),
    op(I::Lda, M::IndexedIndirect, A::Read),
    op(I::Ldx, M::Immediate, A::Read),
    undoc(I::Lax, M::IndexedIndirect, A::Read),
    op(I::Ldy, M::ZeroPage, A::Read),
    op(I::Lda, M::ZeroPage, A::Read),
    op(I::Ldx, M::ZeroPage, A::Read),
    undoc(I::Lax, M::ZeroPage, A::Read),
    op(I::Tay, M::Implied, A::Read),
    op(I::Lda, M::Immediate, A::Read),
    op(I::Tax, M::Implied, A::Read),
    undoc(I::Lxa, M::Immediate, A::Read),
    op(I::Ldy, M::Absolute, A::Read),
    op(I::Lda, M::Absolute, A::Read),
    op(I::Ldx, M::Absolute, A::Read),
    undoc(I::Lax, M::Absolute, A::Read),
    // 0xB0-0xBF
    op(I::Bcs, M::Relative, A::Read),
    op(I::Lda, M::IndirectIndexed, A::Read),
    NONE,
    undoc(I::Lax, M::IndirectIndexed, A::Read),
    op(I::Ldy, M::ZeroPageX, A::Read),
    op(I::Lda, M::ZeroPageX, A::Read),
    op(I::Ldx, M::ZeroPageY, A::Read),
    undoc(I::Lax, M::ZeroPageY, A::Read),
    op(I::Clv, M::Implied, A::Read),
    op(I::Lda, M::AbsoluteY, A::Read),
    op(I::Tsx, M::Implied, A::Read),
    NONE,
    op(I::Ldy, M::AbsoluteX, A::Read),
    op(I::Lda, M::AbsoluteX, A::Read),
    op(I::Ldx, M::AbsoluteY, A::Read),
    undoc(I::Lax, M::AbsoluteY, A::Read),
    // 0xC0-0xCF
    op(I::Cpy, M::Immediate, A::Read),
    op(I::Cmp, M::IndexedIndirect, A::Read),
    undoc(I::Nop, M::Immediate, A::Read),
    undoc(I::Dcp, M::IndexedIndirect, A::ReadModifyWrite),
    op(I::Cpy, M::ZeroPage, A::Read),
    op(I::Cmp, M::ZeroPage, A::Read),
    op(I::Dec, M::ZeroPage, A::ReadModifyWrite),
    undoc(I::Dcp, M::ZeroPage, A::ReadModifyWrite),
    op(I::Iny, M::Implied, A::Read),
    op(I::Cmp, M::Immediate, A::Read),
    op(I::Dex, M::Implied, A::Read),
    undoc(I::Sbx, M::Immediate, A::Read),
    op(I::Cpy, M::Absolute, A::Read),
    op(I::Cmp, M::Absolute, A::Read),
    op(I::Dec, M::Absolute, A::ReadModifyWrite),
    undoc(I::Dcp, M::Absolute, A::ReadModifyWrite),
    // 0xD0-0xDF
    op(I::Bne, M::Relative, A::Read),
    op(I::Cmp, M::IndirectIndexed, A::Read),
    NONE,
    undoc(I::Dcp, M::IndirectIndexed, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPageX, A::Read),
    op(I::Cmp, M::ZeroPageX, A::Read),
    op(I::Dec, M::ZeroPageX, A::ReadModifyWrite),
    undoc(I::Dcp, M::ZeroPageX, A::ReadModifyWrite),
    op(I::Cld, M::Implied, A::Read),
    op(I::Cmp, M::AbsoluteY, A::Read),
    undoc(I::Nop, M::Implied, A::Read),
    undoc(I::Dcp, M::AbsoluteY, A::ReadModifyWrite),
    undoc(I::Nop, M::AbsoluteX, A::Read),
    op(I::Cmp, M::AbsoluteX, A::Read),
    op(I::Dec, M::AbsoluteX, A::ReadModifyWrite),
    undoc(I::Dcp, M::AbsoluteX, A::ReadModifyWrite),
    // 0xE0-0xEF
    op(I::Cpx, M::Immediate, A::Read),
    op(I::Sbc, M::IndexedIndirect, A::Read),
    undoc(I::Nop, M::Immediate, A::Read),
    undoc(I::Isc, M::IndexedIndirect, A::ReadModifyWrite),
    op(I::Cpx, M::ZeroPage, A::Read),
    op(I::Sbc, M::ZeroPage, A::Read),
    op(I::Inc, M::ZeroPage, A::ReadModifyWrite),
    undoc(I::Isc, M::ZeroPage, A::ReadModifyWrite),
    op(I::Inx, M::Implied, A::Read),
    op(I::Sbc, M::Immediate, A::Read),
    op(I::Nop, M::Implied, A::Read),
    undoc(I::Sbc, M::Immediate, A::Read),
    op(I::Cpx, M::Absolute, A::Read),
    op(I::Sbc, M::Absolute, A::Read),
    op(I::Inc, M::Absolute, A::ReadModifyWrite),
    undoc(I::Isc, M::Absolute, A::ReadModifyWrite),
    // 0xF0-0xFF
    op(I::Beq, M::Relative, A::Read),
    op(I::Sbc, M::IndirectIndexed, A::Read),
    NONE,
    undoc(I::Isc, M::IndirectIndexed, A::ReadModifyWrite),
    undoc(I::Nop, M::ZeroPageX, A::Read),
    op(I::Sbc, M::ZeroPageX, A::Read),
    op(I::Inc, M::ZeroPageX, A::ReadModifyWrite),
    undoc(I::Isc, M::ZeroPageX, A::ReadModifyWrite),
    op(I::Sed, M::Implied, A::Read),
    op(I::Sbc, M::AbsoluteY, A::Read),
    undoc(I::Nop, M::Implied, A::Read),
    undoc(I::Isc, M::AbsoluteY, A::ReadModifyWrite),
    undoc(I::Nop, M::AbsoluteX, A::Read),
    op(I::Sbc, M::AbsoluteX, A::Read),
    op(I::Inc, M::AbsoluteX, A::ReadModifyWrite),
    undoc(I::Isc, M::AbsoluteX, A::ReadModifyWrite),
];
