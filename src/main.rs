use clap::Parser;

use famicore::cartridge::Cartridge;
use famicore::eventloop::EventLoop;
use famicore::nes::Nes;

/// Cycle-stepped NES emulator for NROM cartridges.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to an iNES ROM file
    rom: std::path::PathBuf,

    /// Window scaling factor
    #[arg(long, default_value_t = 3.0)]
    scale: f32,

    /// Emulation speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Run without opening a window
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let cartridge = Cartridge::load(&args.rom)?;
    let mut nes = Nes::new();
    nes.insert_cartridge(cartridge);
    nes.reset();

    let mut event_loop = EventLoop::new(args.headless, args.scale, args.speed)?;
    event_loop.run(&mut nes).map_err(|e| e.into())
}
