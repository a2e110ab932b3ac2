//! Micro-cycle-stepped 6502 core.
//!
//! Each call to `tick` performs exactly one CPU cycle with exactly one bus
//! access. The first cycle of every instruction is the opcode fetch; the
//! remaining cycles run a small state machine selected by the decoded
//! entry's addressing mode (or a dedicated machine for the stack and flow
//! instructions whose bus patterns fit no generic shape).
//!
//! Interrupts are sampled at the end of every instruction and serviced by
//! hijacking the next fetch into the BRK sequence, which reproduces the
//! one-instruction delay of the real part.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Bus;

use super::opcode::{Access, AddressingMode, Instruction, OPCODES, Opcode};
use super::operations;
use super::types::{CpuError, InterruptKind, Status};
use super::types::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};

pub struct Cpu {
    pub pc: u16,
    pub sp: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub status: Status,
    bus: Rc<RefCell<dyn Bus>>,

    // In-flight instruction state
    current: Option<&'static Opcode>,
    cycle: u8,
    operand: u8,
    pub(crate) address: u16,
    pub(crate) crossed: bool,

    // Interrupt lines. `pending_*` are the raw requests; `armed_*` are the
    // values sampled at the last instruction boundary, and only armed
    // interrupts can hijack a fetch.
    pending_reset: bool,
    pending_nmi: bool,
    pending_irq: bool,
    armed_reset: bool,
    armed_nmi: bool,
    armed_irq: bool,
    servicing: Option<InterruptKind>,

    total_cycles: u64,
}

impl Cpu {
    pub fn new(bus: Rc<RefCell<dyn Bus>>) -> Self {
        Cpu {
            pc: 0,
            sp: 0,
            a: 0,
            x: 0,
            y: 0,
            status: Status::UNUSED,
            bus,
            current: None,
            cycle: 0,
            operand: 0,
            address: 0,
            crossed: false,
            pending_reset: false,
            pending_nmi: false,
            pending_irq: false,
            armed_reset: false,
            armed_nmi: false,
            armed_irq: false,
            servicing: None,
            total_cycles: 0,
        }
    }

    /// Request the 7-cycle reset sequence. Takes effect on the next tick,
    /// aborting any in-flight instruction.
    pub fn reset(&mut self) {
        self.pending_reset = true;
        self.armed_reset = true;
        self.current = None;
    }

    /// Pull the NMI line. Edge-triggered; serviced after the current
    /// instruction completes.
    pub fn raise_nmi(&mut self) {
        self.pending_nmi = true;
    }

    /// Assert the IRQ line. Honored only while the interrupt-disable flag
    /// is clear.
    pub fn raise_irq(&mut self) {
        self.pending_irq = true;
    }

    pub fn clear_irq(&mut self) {
        self.pending_irq = false;
    }

    /// True at an instruction boundary, before the next opcode fetch.
    pub fn between_instructions(&self) -> bool {
        self.current.is_none()
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Run one CPU cycle.
    pub fn tick(&mut self) -> Result<(), CpuError> {
        self.total_cycles += 1;
        if let Some(opcode) = self.current {
            self.cycle += 1;
            self.step(opcode);
            Ok(())
        } else {
            self.fetch()
        }
    }

    fn fetch(&mut self) -> Result<(), CpuError> {
        let opcode_byte = self.read(self.pc);
        self.cycle = 0;
        self.crossed = false;
        if self.armed_reset || self.armed_nmi || self.armed_irq {
            let kind = if self.armed_reset {
                InterruptKind::Reset
            } else if self.armed_nmi {
                InterruptKind::Nmi
            } else {
                InterruptKind::Irq
            };
            log::trace!("servicing {kind:?} at pc {:04X}", self.pc);
            self.servicing = Some(kind);
            // Fetched byte is discarded and pc is not advanced
            self.current = Some(&OPCODES[0x00]);
            return Ok(());
        }
        let entry = &OPCODES[opcode_byte as usize];
        if entry.instruction == Instruction::None {
            return Err(CpuError::UnimplementedOpcode {
                opcode: opcode_byte,
                pc: self.pc,
            });
        }
        self.pc = self.pc.wrapping_add(1);
        self.servicing = None;
        self.current = Some(entry);
        Ok(())
    }

    fn step(&mut self, opcode: &'static Opcode) {
        match opcode.instruction {
            Instruction::Brk => self.step_interrupt(),
            Instruction::Php | Instruction::Pha => self.step_push(opcode.instruction),
            Instruction::Plp | Instruction::Pla => self.step_pull(opcode.instruction),
            Instruction::Jsr => self.step_jsr(),
            Instruction::Rts => self.step_rts(),
            Instruction::Rti => self.step_rti(),
            Instruction::Jmp => self.step_jmp(opcode.mode),
            _ => match opcode.mode {
                AddressingMode::Implied | AddressingMode::Accumulator => {
                    self.step_implied(opcode)
                }
                AddressingMode::Immediate => {
                    let value = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                    operations::execute_read(self, opcode.instruction, value);
                    self.finish();
                }
                AddressingMode::Relative => self.step_branch(opcode.instruction),
                _ => self.step_memory(opcode),
            },
        }
    }

    /// End the current instruction and sample the interrupt lines.
    fn finish(&mut self) {
        self.current = None;
        self.armed_reset = self.pending_reset;
        self.armed_nmi = self.pending_nmi;
        self.armed_irq =
            self.pending_irq && !self.status.contains(Status::INTERRUPT_DISABLE);
    }

    fn read(&mut self, addr: u16) -> u8 {
        self.bus.borrow_mut().read(addr, false)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.bus.borrow_mut().write(addr, value);
    }

    fn push(&mut self, value: u8) {
        self.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(0x0100 | self.sp as u16)
    }

    fn step_implied(&mut self, opcode: &'static Opcode) {
        // Dummy read of the byte after the opcode
        self.read(self.pc);
        if opcode.mode == AddressingMode::Accumulator {
            self.a = operations::modify(self, opcode.instruction, self.a);
        } else {
            operations::execute_implied(self, opcode.instruction);
        }
        self.finish();
    }

    fn step_branch(&mut self, instruction: Instruction) {
        match self.cycle {
            1 => {
                self.operand = self.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                if !self.branch_taken(instruction) {
                    self.finish();
                }
            }
            2 => {
                self.read(self.pc);
                let target = self.pc.wrapping_add(self.operand as i8 as u16);
                self.address = target;
                // Low byte updates first; the high byte fix costs a cycle
                self.pc = (self.pc & 0xFF00) | (target & 0x00FF);
                if self.pc == target {
                    self.finish();
                }
            }
            _ => {
                self.read(self.pc);
                self.pc = self.address;
                self.finish();
            }
        }
    }

    fn branch_taken(&self, instruction: Instruction) -> bool {
        match instruction {
            Instruction::Bcc => !self.status.contains(Status::CARRY),
            Instruction::Bcs => self.status.contains(Status::CARRY),
            Instruction::Bne => !self.status.contains(Status::ZERO),
            Instruction::Beq => self.status.contains(Status::ZERO),
            Instruction::Bpl => !self.status.contains(Status::NEGATIVE),
            Instruction::Bmi => self.status.contains(Status::NEGATIVE),
            Instruction::Bvc => !self.status.contains(Status::OVERFLOW),
            Instruction::Bvs => self.status.contains(Status::OVERFLOW),
            _ => unreachable!("not a branch: {instruction:?}"),
        }
    }

    fn step_push(&mut self, instruction: Instruction) {
        match self.cycle {
            1 => {
                self.read(self.pc);
            }
            _ => {
                let value = if instruction == Instruction::Php {
                    // PHP pushes with B and the unused bit set
                    (self.status | Status::BREAK | Status::UNUSED).bits()
                } else {
                    self.a
                };
                self.push(value);
                self.finish();
            }
        }
    }

    fn step_pull(&mut self, instruction: Instruction) {
        match self.cycle {
            1 => {
                self.read(self.pc);
            }
            2 => {
                self.read(0x0100 | self.sp as u16);
            }
            _ => {
                let value = self.pop();
                if instruction == Instruction::Pla {
                    self.a = value;
                    self.status.set_zn(self.a);
                } else {
                    self.set_status_from_stack(value);
                }
                self.finish();
            }
        }
    }

    /// B does not exist as a register bit; the unused bit always reads set.
    fn set_status_from_stack(&mut self, value: u8) {
        self.status = (Status::from_bits_truncate(value) - Status::BREAK) | Status::UNUSED;
    }

    fn step_jsr(&mut self) {
        match self.cycle {
            1 => {
                self.operand = self.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            2 => {
                self.read(0x0100 | self.sp as u16);
            }
            3 => self.push((self.pc >> 8) as u8),
            4 => self.push(self.pc as u8),
            _ => {
                let high = self.read(self.pc);
                self.pc = ((high as u16) << 8) | self.operand as u16;
                self.finish();
            }
        }
    }

    fn step_rts(&mut self) {
        match self.cycle {
            1 => {
                self.read(self.pc);
            }
            2 => {
                self.read(0x0100 | self.sp as u16);
            }
            3 => self.operand = self.pop(),
            4 => {
                let high = self.pop();
                self.pc = ((high as u16) << 8) | self.operand as u16;
            }
            _ => {
                self.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                self.finish();
            }
        }
    }

    fn step_rti(&mut self) {
        match self.cycle {
            1 => {
                self.read(self.pc);
            }
            2 => {
                self.read(0x0100 | self.sp as u16);
            }
            3 => {
                let value = self.pop();
                self.set_status_from_stack(value);
            }
            4 => self.operand = self.pop(),
            _ => {
                let high = self.pop();
                self.pc = ((high as u16) << 8) | self.operand as u16;
                self.finish();
            }
        }
    }

    fn step_jmp(&mut self, mode: AddressingMode) {
        match mode {
            AddressingMode::Absolute => match self.cycle {
                1 => {
                    self.operand = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                _ => {
                    let high = self.read(self.pc);
                    self.pc = ((high as u16) << 8) | self.operand as u16;
                    self.finish();
                }
            },
            AddressingMode::Indirect => match self.cycle {
                1 => {
                    self.operand = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    let high = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                    self.address = ((high as u16) << 8) | self.operand as u16;
                }
                3 => self.operand = self.read(self.address),
                _ => {
                    // The pointer high byte never crosses a page
                    let high_addr =
                        (self.address & 0xFF00) | (self.address.wrapping_add(1) & 0x00FF);
                    let high = self.read(high_addr);
                    self.pc = ((high as u16) << 8) | self.operand as u16;
                    self.finish();
                }
            },
            _ => unreachable!("JMP has no {mode:?} form"),
        }
    }

    /// BRK and all three hardware interrupt sequences share this machine.
    /// `servicing` distinguishes them: a software BRK runs with it clear.
    fn step_interrupt(&mut self) {
        match self.cycle {
            1 => {
                self.read(self.pc);
                if self.servicing.is_none() {
                    self.pc = self.pc.wrapping_add(1);
                }
            }
            2 => self.interrupt_push((self.pc >> 8) as u8),
            3 => self.interrupt_push(self.pc as u8),
            4 => {
                // An NMI arriving before the vector read steals the
                // sequence from BRK or IRQ
                if self.pending_nmi
                    && !matches!(
                        self.servicing,
                        Some(InterruptKind::Reset) | Some(InterruptKind::Nmi)
                    )
                {
                    self.servicing = Some(InterruptKind::Nmi);
                }
                let mut flags = (self.status - Status::BREAK) | Status::UNUSED;
                if self.servicing.is_none() {
                    flags |= Status::BREAK;
                }
                self.interrupt_push(flags.bits());
                self.address = match self.servicing {
                    Some(InterruptKind::Reset) => RESET_VECTOR,
                    Some(InterruptKind::Nmi) => NMI_VECTOR,
                    Some(InterruptKind::Irq) | None => IRQ_VECTOR,
                };
                match self.servicing {
                    Some(InterruptKind::Reset) => {
                        self.pending_reset = false;
                        self.armed_reset = false;
                    }
                    Some(InterruptKind::Nmi) => {
                        self.pending_nmi = false;
                        self.armed_nmi = false;
                    }
                    Some(InterruptKind::Irq) => {
                        self.pending_irq = false;
                        self.armed_irq = false;
                    }
                    None => {}
                }
            }
            5 => {
                self.operand = self.read(self.address);
                self.status.insert(Status::INTERRUPT_DISABLE);
            }
            _ => {
                let high = self.read(self.address.wrapping_add(1));
                self.pc = ((high as u16) << 8) | self.operand as u16;
                self.servicing = None;
                self.finish();
            }
        }
    }

    /// Stack push that turns into a read during reset, which is why reset
    /// leaves memory untouched but still drops the stack pointer by three.
    fn interrupt_push(&mut self, value: u8) {
        if self.servicing == Some(InterruptKind::Reset) {
            self.read(0x0100 | self.sp as u16);
        } else {
            self.write(0x0100 | self.sp as u16, value);
        }
        self.sp = self.sp.wrapping_sub(1);
    }

    fn step_memory(&mut self, opcode: &'static Opcode) {
        match opcode.mode {
            AddressingMode::ZeroPage => match self.cycle {
                1 => {
                    self.address = self.read(self.pc) as u16;
                    self.pc = self.pc.wrapping_add(1);
                }
                cycle => self.data_cycle(opcode, cycle - 2),
            },
            AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => match self.cycle {
                1 => {
                    self.address = self.read(self.pc) as u16;
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    // Dummy read at the unindexed address; the sum wraps
                    // within the zero page
                    self.read(self.address);
                    let index = if opcode.mode == AddressingMode::ZeroPageX {
                        self.x
                    } else {
                        self.y
                    };
                    self.address = (self.address as u8).wrapping_add(index) as u16;
                }
                cycle => self.data_cycle(opcode, cycle - 3),
            },
            AddressingMode::Absolute => match self.cycle {
                1 => {
                    self.operand = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    let high = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                    self.address = ((high as u16) << 8) | self.operand as u16;
                }
                cycle => self.data_cycle(opcode, cycle - 3),
            },
            AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => match self.cycle {
                1 => {
                    self.operand = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    let high = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                    let index = if opcode.mode == AddressingMode::AbsoluteX {
                        self.x
                    } else {
                        self.y
                    };
                    let (low, crossed) = self.operand.overflowing_add(index);
                    self.crossed = crossed;
                    self.address = ((high as u16) << 8) | low as u16;
                }
                3 => self.indexed_penalty_cycle(opcode),
                cycle => self.data_cycle(opcode, cycle - 4),
            },
            AddressingMode::IndexedIndirect => match self.cycle {
                1 => {
                    self.operand = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => {
                    self.read(self.operand as u16);
                    self.operand = self.operand.wrapping_add(self.x);
                }
                3 => self.address = self.read(self.operand as u16) as u16,
                4 => {
                    // Pointer high byte wraps within the zero page
                    let high = self.read(self.operand.wrapping_add(1) as u16);
                    self.address |= (high as u16) << 8;
                }
                cycle => self.data_cycle(opcode, cycle - 5),
            },
            AddressingMode::IndirectIndexed => match self.cycle {
                1 => {
                    self.operand = self.read(self.pc);
                    self.pc = self.pc.wrapping_add(1);
                }
                2 => self.address = self.read(self.operand as u16) as u16,
                3 => {
                    let high = self.read(self.operand.wrapping_add(1) as u16);
                    let (low, crossed) = (self.address as u8).overflowing_add(self.y);
                    self.crossed = crossed;
                    self.address = ((high as u16) << 8) | low as u16;
                }
                4 => self.indexed_penalty_cycle(opcode),
                cycle => self.data_cycle(opcode, cycle - 5),
            },
            mode => unreachable!("no memory machine for {mode:?}"),
        }
    }

    /// The cycle after an index addition. Read-class instructions skip it
    /// when the addition did not carry; everyone else performs a dummy read
    /// at the uncorrected address.
    fn indexed_penalty_cycle(&mut self, opcode: &'static Opcode) {
        if opcode.access == Access::Read && !self.crossed {
            self.data_cycle(opcode, 0);
        } else {
            self.read(self.address);
            if self.crossed {
                self.address = self.address.wrapping_add(0x100);
            }
        }
    }

    /// Data phase shared by every memory addressing mode.
    fn data_cycle(&mut self, opcode: &'static Opcode, phase: u8) {
        match opcode.access {
            Access::Read => {
                let value = self.read(self.address);
                operations::execute_read(self, opcode.instruction, value);
                self.finish();
            }
            Access::Write => {
                let value = operations::write_value(self, opcode.instruction);
                self.write(self.address, value);
                self.finish();
            }
            Access::ReadModifyWrite => match phase {
                0 => self.operand = self.read(self.address),
                1 => {
                    // Old value goes back out while the ALU works
                    self.write(self.address, self.operand);
                    self.operand = operations::modify(self, opcode.instruction, self.operand);
                }
                _ => {
                    self.write(self.address, self.operand);
                    self.finish();
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RamBus {
        memory: Vec<u8>,
        writes: Vec<(u16, u8)>,
    }

    impl Bus for RamBus {
        fn read(&mut self, addr: u16, _suppress_side_effects: bool) -> u8 {
            self.memory[addr as usize]
        }

        fn write(&mut self, addr: u16, value: u8) {
            self.writes.push((addr, value));
            self.memory[addr as usize] = value;
        }
    }

    fn setup(program: &[u8]) -> (Cpu, Rc<RefCell<RamBus>>) {
        let mut memory = vec![0u8; 0x10000];
        memory[0x8000..0x8000 + program.len()].copy_from_slice(program);
        memory[0xFFFC] = 0x00;
        memory[0xFFFD] = 0x80;
        let bus = Rc::new(RefCell::new(RamBus {
            memory,
            writes: Vec::new(),
        }));
        let mut cpu = Cpu::new(bus.clone());
        cpu.reset();
        for _ in 0..7 {
            cpu.tick().unwrap();
        }
        (cpu, bus)
    }

    fn step_instruction(cpu: &mut Cpu) -> u32 {
        let mut ticks = 0;
        loop {
            cpu.tick().unwrap();
            ticks += 1;
            if cpu.between_instructions() {
                return ticks;
            }
        }
    }

    #[test]
    fn test_reset_sequence() {
        let (cpu, bus) = setup(&[0xEA]);
        assert_eq!(cpu.pc, 0x8000);
        assert_eq!(cpu.sp, 0xFD);
        assert!(cpu.status.contains(Status::INTERRUPT_DISABLE));
        // Reset suppresses the stack writes
        assert!(bus.borrow().writes.is_empty());
    }

    #[test]
    fn test_lda_immediate_flags() {
        let (mut cpu, _) = setup(&[0xA9, 0x00, 0xA9, 0x80]);
        assert_eq!(step_instruction(&mut cpu), 2);
        assert!(cpu.status.contains(Status::ZERO));
        step_instruction(&mut cpu);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.status.contains(Status::NEGATIVE));
        assert!(!cpu.status.contains(Status::ZERO));
    }

    #[test]
    fn test_read_cycle_counts() {
        // LDA in every read addressing shape, no page crossings
        let (mut cpu, bus) = setup(&[
            0xA5, 0x10, // zp
            0xB5, 0x10, // zp,X
            0xAD, 0x00, 0x02, // abs
            0xBD, 0x00, 0x02, // abs,X
            0xA1, 0x20, // (zp,X)
            0xB1, 0x22, // (zp),Y
        ]);
        bus.borrow_mut().memory[0x20] = 0x00;
        bus.borrow_mut().memory[0x21] = 0x02;
        bus.borrow_mut().memory[0x22] = 0x00;
        bus.borrow_mut().memory[0x23] = 0x02;
        assert_eq!(step_instruction(&mut cpu), 3);
        assert_eq!(step_instruction(&mut cpu), 4);
        assert_eq!(step_instruction(&mut cpu), 4);
        assert_eq!(step_instruction(&mut cpu), 4);
        assert_eq!(step_instruction(&mut cpu), 6);
        assert_eq!(step_instruction(&mut cpu), 5);
    }

    #[test]
    fn test_page_cross_penalty() {
        let (mut cpu, _) = setup(&[
            0xA2, 0x01, // LDX #1
            0xBD, 0xFF, 0x02, // LDA $02FF,X crosses into $0300
        ]);
        step_instruction(&mut cpu);
        assert_eq!(step_instruction(&mut cpu), 5);
    }

    #[test]
    fn test_store_never_skips_penalty() {
        let (mut cpu, bus) = setup(&[
            0xA9, 0x55, // LDA #$55
            0xA2, 0x01, // LDX #1
            0x9D, 0x00, 0x02, // STA $0200,X no cross, still 5 cycles
        ]);
        step_instruction(&mut cpu);
        step_instruction(&mut cpu);
        assert_eq!(step_instruction(&mut cpu), 5);
        assert_eq!(bus.borrow().memory[0x0201], 0x55);
    }

    #[test]
    fn test_rmw_writes_old_value_first() {
        let (mut cpu, bus) = setup(&[0x06, 0x10]); // ASL $10
        bus.borrow_mut().memory[0x10] = 0x41;
        assert_eq!(step_instruction(&mut cpu), 5);
        let writes = bus.borrow().writes.clone();
        assert_eq!(writes, vec![(0x0010, 0x41), (0x0010, 0x82)]);
        assert!(cpu.status.contains(Status::NEGATIVE));
        assert!(!cpu.status.contains(Status::CARRY));
    }

    #[test]
    fn test_rmw_indexed_cycle_count() {
        let (mut cpu, bus) = setup(&[0xFE, 0x00, 0x02]); // INC $0200,X
        bus.borrow_mut().memory[0x0200] = 0xFF;
        assert_eq!(step_instruction(&mut cpu), 7);
        assert_eq!(bus.borrow().memory[0x0200], 0x00);
        assert!(cpu.status.contains(Status::ZERO));
    }

    #[test]
    fn test_adc_overflow_and_carry() {
        let (mut cpu, _) = setup(&[
            0xA9, 0x50, // LDA #$50
            0x69, 0x50, // ADC #$50
        ]);
        step_instruction(&mut cpu);
        step_instruction(&mut cpu);
        assert_eq!(cpu.a, 0xA0);
        assert!(cpu.status.contains(Status::OVERFLOW));
        assert!(cpu.status.contains(Status::NEGATIVE));
        assert!(!cpu.status.contains(Status::CARRY));
    }

    #[test]
    fn test_sbc_borrow() {
        let (mut cpu, _) = setup(&[
            0x38, // SEC
            0xA9, 0x50, // LDA #$50
            0xE9, 0xB0, // SBC #$B0
        ]);
        for _ in 0..3 {
            step_instruction(&mut cpu);
        }
        assert_eq!(cpu.a, 0xA0);
        assert!(cpu.status.contains(Status::OVERFLOW));
        assert!(!cpu.status.contains(Status::CARRY));
    }

    #[test]
    fn test_branch_cycle_counts() {
        let (mut cpu, _) = setup(&[
            0xB0, 0x02, // BCS not taken
            0x18, // CLC
            0x90, 0x00, // BCC taken, same page
        ]);
        assert_eq!(step_instruction(&mut cpu), 2);
        step_instruction(&mut cpu);
        assert_eq!(step_instruction(&mut cpu), 3);
        assert_eq!(cpu.pc, 0x8005);
    }

    #[test]
    fn test_branch_page_cross() {
        // BNE backward from $8000 lands in $7FFx
        let (mut cpu, _) = setup(&[
            0xA9, 0x01, // LDA #1, clears Z
            0xD0, 0xFA, // BNE -6
        ]);
        step_instruction(&mut cpu);
        assert_eq!(step_instruction(&mut cpu), 4);
        assert_eq!(cpu.pc, 0x7FFE);
    }

    #[test]
    fn test_jsr_rts_round_trip() {
        let (mut cpu, bus) = setup(&[0x20, 0x00, 0x90]); // JSR $9000
        bus.borrow_mut().memory[0x9000] = 0x60; // RTS
        assert_eq!(step_instruction(&mut cpu), 6);
        assert_eq!(cpu.pc, 0x9000);
        // Return address on the stack points at the JSR's last byte
        assert_eq!(bus.borrow().memory[0x01FD], 0x80);
        assert_eq!(bus.borrow().memory[0x01FC], 0x02);
        assert_eq!(step_instruction(&mut cpu), 6);
        assert_eq!(cpu.pc, 0x8003);
    }

    #[test]
    fn test_stack_push_pull() {
        let (mut cpu, _) = setup(&[
            0xA9, 0xC3, // LDA #$C3
            0x48, // PHA
            0xA9, 0x00, // LDA #0
            0x68, // PLA
        ]);
        step_instruction(&mut cpu);
        assert_eq!(step_instruction(&mut cpu), 3);
        step_instruction(&mut cpu);
        assert_eq!(step_instruction(&mut cpu), 4);
        assert_eq!(cpu.a, 0xC3);
        assert!(cpu.status.contains(Status::NEGATIVE));
    }

    #[test]
    fn test_php_sets_break_on_stack_only() {
        let (mut cpu, bus) = setup(&[0x08]); // PHP
        step_instruction(&mut cpu);
        let pushed = bus.borrow().memory[0x01FD];
        assert_eq!(pushed & 0x30, 0x30);
        assert!(!cpu.status.contains(Status::BREAK));
    }

    #[test]
    fn test_jmp_indirect_page_wrap() {
        let (mut cpu, bus) = setup(&[0x6C, 0xFF, 0x02]); // JMP ($02FF)
        bus.borrow_mut().memory[0x02FF] = 0x34;
        bus.borrow_mut().memory[0x0300] = 0x99; // must be ignored
        bus.borrow_mut().memory[0x0200] = 0x12;
        assert_eq!(step_instruction(&mut cpu), 5);
        assert_eq!(cpu.pc, 0x1234);
    }

    #[test]
    fn test_brk_pushes_break_flag() {
        let (mut cpu, bus) = setup(&[0x00, 0xFF]); // BRK with padding byte
        bus.borrow_mut().memory[0xFFFE] = 0x00;
        bus.borrow_mut().memory[0xFFFF] = 0x90;
        assert_eq!(step_instruction(&mut cpu), 7);
        assert_eq!(cpu.pc, 0x9000);
        assert!(cpu.status.contains(Status::INTERRUPT_DISABLE));
        // Return address skips the padding byte
        assert_eq!(bus.borrow().memory[0x01FD], 0x80);
        assert_eq!(bus.borrow().memory[0x01FC], 0x02);
        assert_eq!(bus.borrow().memory[0x01FB] & 0x10, 0x10);
    }

    #[test]
    fn test_nmi_waits_for_instruction_boundary() {
        let (mut cpu, bus) = setup(&[0xA9, 0x42, 0xEA]);
        bus.borrow_mut().memory[0xFFFA] = 0x00;
        bus.borrow_mut().memory[0xFFFB] = 0x90;
        cpu.tick().unwrap(); // fetch LDA
        cpu.raise_nmi();
        cpu.tick().unwrap(); // LDA completes normally
        assert_eq!(cpu.a, 0x42);
        assert!(cpu.between_instructions());
        assert_eq!(step_instruction(&mut cpu), 7);
        assert_eq!(cpu.pc, 0x9000);
        // B clear in the pushed status, pc not advanced past the NOP
        assert_eq!(bus.borrow().memory[0x01FB] & 0x10, 0x00);
        assert_eq!(bus.borrow().memory[0x01FD], 0x80);
        assert_eq!(bus.borrow().memory[0x01FC], 0x02);
    }

    #[test]
    fn test_irq_masked_by_interrupt_disable() {
        let (mut cpu, bus) = setup(&[
            0xEA, // NOP with I still set from reset
            0x58, // CLI
        ]);
        bus.borrow_mut().memory[0xFFFE] = 0x00;
        bus.borrow_mut().memory[0xFFFF] = 0x95;
        cpu.raise_irq();
        step_instruction(&mut cpu);
        assert_eq!(cpu.pc, 0x8001); // IRQ held off while I is set
        step_instruction(&mut cpu); // CLI unmasks it
        assert_eq!(step_instruction(&mut cpu), 7);
        assert_eq!(cpu.pc, 0x9500);
    }

    #[test]
    fn test_rti_restores_status_and_pc() {
        let (mut cpu, bus) = setup(&[0x00, 0xFF, 0xEA]); // BRK, pad, NOP
        bus.borrow_mut().memory[0xFFFE] = 0x00;
        bus.borrow_mut().memory[0xFFFF] = 0x90;
        bus.borrow_mut().memory[0x9000] = 0x40; // RTI
        step_instruction(&mut cpu);
        assert_eq!(step_instruction(&mut cpu), 6);
        assert_eq!(cpu.pc, 0x8002);
        // I restored to its pre-BRK value
        assert!(cpu.status.contains(Status::INTERRUPT_DISABLE));
    }

    #[test]
    fn test_unimplemented_opcode_errors() {
        let (mut cpu, _) = setup(&[0x02]);
        let err = cpu.tick().unwrap_err();
        assert_eq!(
            err,
            CpuError::UnimplementedOpcode {
                opcode: 0x02,
                pc: 0x8000
            }
        );
    }

    #[test]
    fn test_lax_loads_both_registers() {
        let (mut cpu, bus) = setup(&[0xA7, 0x10]); // LAX $10
        bus.borrow_mut().memory[0x10] = 0x5A;
        step_instruction(&mut cpu);
        assert_eq!(cpu.a, 0x5A);
        assert_eq!(cpu.x, 0x5A);
    }

    #[test]
    fn test_lxa_magic_constant() {
        let (mut cpu, _) = setup(&[0xAB, 0x5A]); // LXA #$5A
        step_instruction(&mut cpu);
        assert_eq!(cpu.a, 0x5A);
        assert_eq!(cpu.x, 0x5A);
    }

    #[test]
    fn test_sax_stores_a_and_x() {
        let (mut cpu, bus) = setup(&[
            0xA9, 0xF0, // LDA #$F0
            0xA2, 0x3C, // LDX #$3C
            0x87, 0x10, // SAX $10
        ]);
        for _ in 0..3 {
            step_instruction(&mut cpu);
        }
        assert_eq!(bus.borrow().memory[0x10], 0x30);
    }

    #[test]
    fn test_shx_high_byte_and() {
        let (mut cpu, bus) = setup(&[
            0xA2, 0x3F, // LDX #$3F
            0xA0, 0x01, // LDY #1
            0x9E, 0x00, 0x02, // SHX $0200,Y
        ]);
        step_instruction(&mut cpu);
        step_instruction(&mut cpu);
        step_instruction(&mut cpu);
        // X AND (high byte + 1) = $3F & $03
        assert_eq!(bus.borrow().memory[0x0201], 0x03);
    }

    #[test]
    fn test_dcp_compares_decremented_value() {
        let (mut cpu, bus) = setup(&[
            0xA9, 0x40, // LDA #$40
            0xC7, 0x10, // DCP $10
        ]);
        bus.borrow_mut().memory[0x10] = 0x41;
        step_instruction(&mut cpu);
        step_instruction(&mut cpu);
        assert_eq!(bus.borrow().memory[0x10], 0x40);
        assert!(cpu.status.contains(Status::ZERO));
        assert!(cpu.status.contains(Status::CARRY));
    }

    #[test]
    fn test_isc_subtracts_incremented_value() {
        let (mut cpu, bus) = setup(&[
            0x38, // SEC
            0xA9, 0x10, // LDA #$10
            0xE7, 0x20, // ISC $20
        ]);
        bus.borrow_mut().memory[0x20] = 0x0F;
        for _ in 0..3 {
            step_instruction(&mut cpu);
        }
        assert_eq!(bus.borrow().memory[0x20], 0x10);
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.status.contains(Status::ZERO));
    }

    #[test]
    fn test_zero_page_indexed_wraps() {
        let (mut cpu, bus) = setup(&[
            0xA2, 0x05, // LDX #5
            0xB5, 0xFE, // LDA $FE,X reads $03, not $103
        ]);
        bus.borrow_mut().memory[0x03] = 0x77;
        bus.borrow_mut().memory[0x103] = 0x11;
        step_instruction(&mut cpu);
        step_instruction(&mut cpu);
        assert_eq!(cpu.a, 0x77);
    }
}
