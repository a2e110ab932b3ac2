use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::{Cpu, CpuError};
use crate::cpu_bus::CpuBus;
use crate::joypad::Button;
use crate::ppu::Ppu;

/// CPU cycles the processor is halted while an OAM DMA transfer runs
const OAM_DMA_STALL_CYCLES: u32 = 513;

/// PPU dots per CPU cycle on the master clock
const PPU_DOTS_PER_CPU_CYCLE: u64 = 4;

/// The console: CPU, PPU and bus wired together and driven off a single
/// master clock. Every master tick advances the PPU one dot; every fourth
/// tick advances the CPU one cycle.
pub struct Nes {
    pub cpu: Cpu,
    pub ppu: Rc<RefCell<Ppu>>,
    pub bus: Rc<RefCell<CpuBus>>,
    cartridge: Option<Rc<RefCell<Cartridge>>>,
    master_cycle: u64,
    /// Remaining CPU cycles of an in-flight OAM DMA stall
    dma_stall: u32,
    frame_ready: bool,
}

impl Nes {
    pub fn new() -> Self {
        let ppu = Rc::new(RefCell::new(Ppu::new()));
        let bus = Rc::new(RefCell::new(CpuBus::new(ppu.clone())));
        let cpu = Cpu::new(bus.clone() as Rc<RefCell<dyn Bus>>);
        Self {
            cpu,
            ppu,
            bus,
            cartridge: None,
            master_cycle: 0,
            dma_stall: 0,
            frame_ready: false,
        }
    }

    /// Connect a cartridge to both buses.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        let cartridge = Rc::new(RefCell::new(cartridge));
        self.bus.borrow_mut().attach_cartridge(cartridge.clone());
        self.ppu.borrow_mut().attach_cartridge(cartridge.clone());
        self.cartridge = Some(cartridge);
    }

    /// Start the CPU reset sequence and return the PPU to power-on state.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.ppu.borrow_mut().reset();
        self.master_cycle = 0;
        self.dma_stall = 0;
        self.frame_ready = false;
    }

    /// Advance the master clock by one PPU dot.
    pub fn tick(&mut self) -> Result<(), CpuError> {
        self.ppu.borrow_mut().tick();
        self.master_cycle += 1;

        if self.master_cycle % PPU_DOTS_PER_CPU_CYCLE == 0 {
            self.cpu_cycle()?;
        }

        let (nmi, frame) = {
            let mut ppu = self.ppu.borrow_mut();
            (ppu.poll_nmi(), ppu.poll_frame_complete())
        };
        if nmi {
            self.cpu.raise_nmi();
        }
        if frame {
            self.frame_ready = true;
        }
        Ok(())
    }

    /// Run until the PPU signals the end of the current frame.
    pub fn run_frame(&mut self) -> Result<(), CpuError> {
        loop {
            self.tick()?;
            if std::mem::take(&mut self.frame_ready) {
                return Ok(());
            }
        }
    }

    pub fn set_joypad1_button(&mut self, button: Button, pressed: bool) {
        self.bus.borrow_mut().joypad1_mut().set_button(button, pressed);
    }

    pub fn set_joypad2_button(&mut self, button: Button, pressed: bool) {
        self.bus.borrow_mut().joypad2_mut().set_button(button, pressed);
    }

    fn cpu_cycle(&mut self) -> Result<(), CpuError> {
        if self.dma_stall > 0 {
            self.dma_stall -= 1;
            return Ok(());
        }

        // DMA waits for the instruction that wrote $4014 to finish, then
        // copies the whole page at once and stalls the CPU
        if self.cpu.between_instructions() {
            let pending = self.bus.borrow_mut().take_pending_oam_dma();
            if let Some(page) = pending {
                self.run_oam_dma(page);
                self.dma_stall = OAM_DMA_STALL_CYCLES - 1;
                return Ok(());
            }
        }

        self.cpu.tick()
    }

    fn run_oam_dma(&mut self, page: u8) {
        log::trace!("OAM DMA from page {page:02X}");
        let base = (page as u16) << 8;
        let mut bus = self.bus.borrow_mut();
        let mut ppu = self.ppu.borrow_mut();
        for offset in 0..256 {
            let value = bus.read(base + offset, false);
            ppu.oam_dma_write(value);
        }
    }
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::MirroringMode;

    /// Build a cartridge whose reset vector points at `program` placed at
    /// $8000, with an NMI handler that stores $55 to $0010 and spins.
    fn test_cartridge(program: &[u8]) -> Cartridge {
        let mut prg = vec![0xEA; 16384];
        prg[..program.len()].copy_from_slice(program);
        // NMI handler at $C000 (mirrored offset 0): unreachable via reset
        // vector; handler body lives at offset 0x2000 = $A000
        let handler = [0xA9, 0x55, 0x85, 0x10, 0x4C, 0x04, 0xA0]; // LDA/STA/JMP spin
        prg[0x2000..0x2000 + handler.len()].copy_from_slice(&handler);
        prg[0x3FFA] = 0x00; // NMI vector $A000
        prg[0x3FFB] = 0xA0;
        prg[0x3FFC] = 0x00; // reset vector $8000
        prg[0x3FFD] = 0x80;
        Cartridge::from_parts(prg, Vec::new(), MirroringMode::Vertical)
    }

    fn spin_program() -> Vec<u8> {
        vec![0x4C, 0x00, 0x80] // JMP $8000
    }

    fn test_nes(program: &[u8]) -> Nes {
        let mut nes = Nes::new();
        nes.insert_cartridge(test_cartridge(program));
        nes.reset();
        nes
    }

    #[test]
    fn test_clock_ratio() {
        let mut nes = test_nes(&spin_program());
        for _ in 0..4000 {
            nes.tick().unwrap();
        }
        assert_eq!(nes.ppu.borrow().total_cycles(), 4000);
        assert_eq!(nes.cpu.total_cycles(), 1000);
    }

    #[test]
    fn test_run_frame_stops_at_vblank() {
        let mut nes = test_nes(&spin_program());
        nes.run_frame().unwrap();
        // One frame is 341 * 262 dots; vblank starts partway through
        let dots = nes.ppu.borrow().total_cycles();
        assert_eq!(dots, 241 * 341 + 2);
        nes.run_frame().unwrap();
        assert_eq!(nes.ppu.borrow().total_cycles(), dots + 262 * 341);
    }

    #[test]
    fn test_nmi_reaches_cpu() {
        // Enable NMI generation, then spin
        let program = [
            0xA9, 0x80, // LDA #$80
            0x8D, 0x00, 0x20, // STA $2000
            0x4C, 0x05, 0x80, // JMP self
        ];
        let mut nes = test_nes(&program);
        nes.run_frame().unwrap();
        // Give the CPU time to take the interrupt and run the handler
        for _ in 0..200 {
            nes.tick().unwrap();
        }
        assert_eq!(nes.bus.borrow_mut().read(0x0010, true), 0x55);
    }

    #[test]
    fn test_no_nmi_when_disabled() {
        let mut nes = test_nes(&spin_program());
        nes.run_frame().unwrap();
        for _ in 0..200 {
            nes.tick().unwrap();
        }
        assert_eq!(nes.bus.borrow_mut().read(0x0010, true), 0x00);
    }

    #[test]
    fn test_oam_dma_copies_page_and_stalls() {
        let mut nes = test_nes(&spin_program());
        // Let the reset sequence finish
        for _ in 0..(7 * 4) {
            nes.tick().unwrap();
        }
        for offset in 0..256u16 {
            nes.bus.borrow_mut().write(0x0200 + offset, offset as u8);
        }
        nes.bus.borrow_mut().write(0x4014, 0x02);

        // Run to the next instruction boundary plus the full stall
        let stall_end = (OAM_DMA_STALL_CYCLES as u64 + 3) * 4;
        let cycles_before_dma = nes.cpu.total_cycles();
        for _ in 0..stall_end {
            nes.tick().unwrap();
        }

        let mut ppu = nes.ppu.borrow_mut();
        ppu.write_register(3, 0x00); // OAMADDR = 0
        assert_eq!(ppu.read_register(4, true), 0x00);
        ppu.write_register(3, 0x05);
        assert_eq!(ppu.read_register(4, true), 0x05);
        drop(ppu);

        // CPU made no more than the few cycles needed to reach the boundary
        assert!(nes.cpu.total_cycles() - cycles_before_dma <= 3);
    }

    #[test]
    fn test_joypad_wiring() {
        let mut nes = test_nes(&spin_program());
        nes.set_joypad1_button(Button::Start, true);
        let mut bus = nes.bus.borrow_mut();
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);
        // Start is the fourth report
        let mut bits = Vec::new();
        for _ in 0..4 {
            bits.push(bus.read(0x4016, false) & 1);
        }
        assert_eq!(bits, vec![0, 0, 0, 1]);
    }
}
