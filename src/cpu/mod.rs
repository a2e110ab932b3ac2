//! 6502 CPU core: decode table, ALU semantics and the cycle-stepped engine.

#[allow(clippy::module_inception)]
mod cpu;
mod opcode;
mod operations;
mod types;

pub use cpu::Cpu;
pub use types::{CpuError, Status};
