//! ALU and flag semantics shared by the addressing-mode cycle machines.
//!
//! The cycle machines in `cpu.rs` decide WHEN a value moves over the bus;
//! these functions decide WHAT the instruction does with it. Split three
//! ways by bus shape: read-class, implied/register-class, and the
//! modify/write helpers used by read-modify-write and store instructions.

use super::cpu::Cpu;
use super::opcode::Instruction;
use super::types::Status;

/// Magic constant ANDed into LXA. Varies per chip on real hardware; 0xFF
/// makes LXA behave as LAX #imm, which is what test ROMs expect.
const LXA_MAGIC: u8 = 0xFF;

/// Apply a read-class instruction to the fetched operand.
pub fn execute_read(cpu: &mut Cpu, instruction: Instruction, value: u8) {
    match instruction {
        Instruction::Lda => {
            cpu.a = value;
            cpu.status.set_zn(cpu.a);
        }
        Instruction::Ldx => {
            cpu.x = value;
            cpu.status.set_zn(cpu.x);
        }
        Instruction::Ldy => {
            cpu.y = value;
            cpu.status.set_zn(cpu.y);
        }
        Instruction::Lax => {
            cpu.a = value;
            cpu.x = value;
            cpu.status.set_zn(value);
        }
        Instruction::And => {
            cpu.a &= value;
            cpu.status.set_zn(cpu.a);
        }
        Instruction::Ora => {
            cpu.a |= value;
            cpu.status.set_zn(cpu.a);
        }
        Instruction::Eor => {
            cpu.a ^= value;
            cpu.status.set_zn(cpu.a);
        }
        Instruction::Adc => adc(cpu, value),
        Instruction::Sbc => adc(cpu, !value),
        Instruction::Cmp => compare(cpu, cpu.a, value),
        Instruction::Cpx => compare(cpu, cpu.x, value),
        Instruction::Cpy => compare(cpu, cpu.y, value),
        Instruction::Bit => {
            cpu.status.set(Status::ZERO, cpu.a & value == 0);
            cpu.status.set(Status::NEGATIVE, value & 0x80 != 0);
            cpu.status.set(Status::OVERFLOW, value & 0x40 != 0);
        }
        Instruction::Anc => {
            cpu.a &= value;
            cpu.status.set_zn(cpu.a);
            cpu.status
                .set(Status::CARRY, cpu.status.contains(Status::NEGATIVE));
        }
        Instruction::Alr => {
            let masked = cpu.a & value;
            cpu.status.set(Status::CARRY, masked & 0x01 != 0);
            cpu.a = masked >> 1;
            cpu.status.set_zn(cpu.a);
        }
        Instruction::Arr => {
            // AND, then ROR; carry and overflow come from bits 6 and 5 of
            // the rotated result rather than the shift-out
            let masked = cpu.a & value;
            let carry_in = if cpu.status.contains(Status::CARRY) {
                0x80
            } else {
                0x00
            };
            cpu.a = (masked >> 1) | carry_in;
            cpu.status.set_zn(cpu.a);
            cpu.status.set(Status::CARRY, cpu.a & 0x40 != 0);
            cpu.status
                .set(Status::OVERFLOW, ((cpu.a >> 6) ^ (cpu.a >> 5)) & 0x01 != 0);
        }
        Instruction::Sbx => {
            let masked = cpu.a & cpu.x;
            cpu.status.set(Status::CARRY, masked >= value);
            cpu.x = masked.wrapping_sub(value);
            cpu.status.set_zn(cpu.x);
        }
        Instruction::Lxa => {
            let result = LXA_MAGIC & value;
            cpu.a = result;
            cpu.x = result;
            cpu.status.set_zn(result);
        }
        Instruction::Nop => {}
        _ => unreachable!("not a read-class instruction: {instruction:?}"),
    }
}

/// Apply an implied-mode instruction (register transfers and flag ops).
pub fn execute_implied(cpu: &mut Cpu, instruction: Instruction) {
    match instruction {
        Instruction::Clc => cpu.status.remove(Status::CARRY),
        Instruction::Sec => cpu.status.insert(Status::CARRY),
        Instruction::Cli => cpu.status.remove(Status::INTERRUPT_DISABLE),
        Instruction::Sei => cpu.status.insert(Status::INTERRUPT_DISABLE),
        Instruction::Cld => cpu.status.remove(Status::DECIMAL),
        Instruction::Sed => cpu.status.insert(Status::DECIMAL),
        Instruction::Clv => cpu.status.remove(Status::OVERFLOW),
        Instruction::Tax => {
            cpu.x = cpu.a;
            cpu.status.set_zn(cpu.x);
        }
        Instruction::Tay => {
            cpu.y = cpu.a;
            cpu.status.set_zn(cpu.y);
        }
        Instruction::Txa => {
            cpu.a = cpu.x;
            cpu.status.set_zn(cpu.a);
        }
        Instruction::Tya => {
            cpu.a = cpu.y;
            cpu.status.set_zn(cpu.a);
        }
        Instruction::Tsx => {
            cpu.x = cpu.sp;
            cpu.status.set_zn(cpu.x);
        }
        Instruction::Txs => cpu.sp = cpu.x,
        Instruction::Inx => {
            cpu.x = cpu.x.wrapping_add(1);
            cpu.status.set_zn(cpu.x);
        }
        Instruction::Iny => {
            cpu.y = cpu.y.wrapping_add(1);
            cpu.status.set_zn(cpu.y);
        }
        Instruction::Dex => {
            cpu.x = cpu.x.wrapping_sub(1);
            cpu.status.set_zn(cpu.x);
        }
        Instruction::Dey => {
            cpu.y = cpu.y.wrapping_sub(1);
            cpu.status.set_zn(cpu.y);
        }
        Instruction::Nop => {}
        _ => unreachable!("not an implied-mode instruction: {instruction:?}"),
    }
}

/// Apply a modify-class instruction to `value` and return the new value.
/// Used both for memory operands (read-modify-write) and the accumulator
/// variants of the shift instructions.
pub fn modify(cpu: &mut Cpu, instruction: Instruction, value: u8) -> u8 {
    match instruction {
        Instruction::Asl => {
            cpu.status.set(Status::CARRY, value & 0x80 != 0);
            let result = value << 1;
            cpu.status.set_zn(result);
            result
        }
        Instruction::Lsr => {
            cpu.status.set(Status::CARRY, value & 0x01 != 0);
            let result = value >> 1;
            cpu.status.set_zn(result);
            result
        }
        Instruction::Rol => {
            let carry_in = cpu.status.contains(Status::CARRY) as u8;
            cpu.status.set(Status::CARRY, value & 0x80 != 0);
            let result = (value << 1) | carry_in;
            cpu.status.set_zn(result);
            result
        }
        Instruction::Ror => {
            let carry_in = (cpu.status.contains(Status::CARRY) as u8) << 7;
            cpu.status.set(Status::CARRY, value & 0x01 != 0);
            let result = (value >> 1) | carry_in;
            cpu.status.set_zn(result);
            result
        }
        Instruction::Inc => {
            let result = value.wrapping_add(1);
            cpu.status.set_zn(result);
            result
        }
        Instruction::Dec => {
            let result = value.wrapping_sub(1);
            cpu.status.set_zn(result);
            result
        }
        Instruction::Slo => {
            let result = modify(cpu, Instruction::Asl, value);
            cpu.a |= result;
            cpu.status.set_zn(cpu.a);
            result
        }
        Instruction::Sre => {
            let result = modify(cpu, Instruction::Lsr, value);
            cpu.a ^= result;
            cpu.status.set_zn(cpu.a);
            result
        }
        Instruction::Rla => {
            let result = modify(cpu, Instruction::Rol, value);
            cpu.a &= result;
            cpu.status.set_zn(cpu.a);
            result
        }
        Instruction::Rra => {
            let result = modify(cpu, Instruction::Ror, value);
            adc(cpu, result);
            result
        }
        Instruction::Dcp => {
            let result = value.wrapping_sub(1);
            compare(cpu, cpu.a, result);
            result
        }
        Instruction::Isc => {
            let result = value.wrapping_add(1);
            adc(cpu, !result);
            result
        }
        _ => unreachable!("not a modify-class instruction: {instruction:?}"),
    }
}

/// Compute the value a store-class instruction puts on the bus.
///
/// SHX and SHY return the register ANDed with the high address byte plus
/// one; when the index addition crossed a page the write lands at the
/// corrupted address formed from that value, which the caller applies.
pub fn write_value(cpu: &mut Cpu, instruction: Instruction) -> u8 {
    match instruction {
        Instruction::Sta => cpu.a,
        Instruction::Stx => cpu.x,
        Instruction::Sty => cpu.y,
        Instruction::Sax => cpu.a & cpu.x,
        Instruction::Shx | Instruction::Shy => {
            let register = if instruction == Instruction::Shx {
                cpu.x
            } else {
                cpu.y
            };
            let high = (cpu.address >> 8) as u8;
            if cpu.crossed {
                // Address was already carry-corrected, so `high` equals the
                // base high byte plus one. The AND result also replaces the
                // high byte of the target address.
                let value = register & high;
                cpu.address = ((value as u16) << 8) | (cpu.address & 0x00FF);
                value
            } else {
                register & high.wrapping_add(1)
            }
        }
        _ => unreachable!("not a store-class instruction: {instruction:?}"),
    }
}

/// Binary-mode add with carry; SBC routes through here with the operand
/// inverted. Decimal flag is ignored, as on the 2A03.
pub fn adc(cpu: &mut Cpu, value: u8) {
    let carry_in = cpu.status.contains(Status::CARRY) as u16;
    let sum = cpu.a as u16 + value as u16 + carry_in;
    let result = sum as u8;
    cpu.status.set(Status::CARRY, sum > 0xFF);
    cpu.status.set(
        Status::OVERFLOW,
        (cpu.a ^ result) & (value ^ result) & 0x80 != 0,
    );
    cpu.a = result;
    cpu.status.set_zn(cpu.a);
}

fn compare(cpu: &mut Cpu, register: u8, value: u8) {
    cpu.status.set(Status::CARRY, register >= value);
    cpu.status.set_zn(register.wrapping_sub(value));
}
