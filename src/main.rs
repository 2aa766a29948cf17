use std::path::PathBuf;

use clap::Parser;
use famicore::Bus;

/// Run an iNES ROM (or the built-in demo) on the famicore emulator core.
#[derive(Parser, Debug)]
#[command(name = "famicore")]
#[command(about = "NES emulator core runner", long_about = None)]
struct Args {
    /// Path to an iNES ROM; the built-in multiply demo runs when omitted
    rom: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 0)]
    frames: u64,

    /// Number of CPU instructions to single-step after the frames
    #[arg(short, long, default_value_t = 0)]
    steps: u64,

    /// Print a disassembly of the program around PC
    #[arg(short, long)]
    disassemble: bool,

    /// Save the last frame as a PNG
    #[cfg(feature = "screenshot")]
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Multiplies 10 by 3 into $0002, then spins.
const DEMO_PROGRAM: &[u8] = &[
    0xA2, 0x0A, // LDX #10
    0x8E, 0x00, 0x00, // STX $0000
    0xA2, 0x03, // LDX #3
    0x8E, 0x01, 0x00, // STX $0001
    0xAC, 0x00, 0x00, // LDY $0000
    0xA9, 0x00, // LDA #0
    0x18, // CLC
    0x6D, 0x01, 0x00, // loop: ADC $0001
    0x88, // DEY
    0xD0, 0xFA, // BNE loop
    0x8D, 0x02, 0x00, // STA $0002
    0xEA, // NOP
    0x4C, 0x1A, 0x80, // JMP *
];

/// One-bank NROM image with `DEMO_PROGRAM` at $8000 and every vector pointing at it.
fn build_demo_ines() -> Vec<u8> {
    let mut rom = Vec::with_capacity(16 + 16 * 1024 + 8 * 1024);
    rom.extend_from_slice(b"NES\x1A");
    rom.extend_from_slice(&[1, 1, 0, 0, 0]);
    rom.extend_from_slice(&[0u8; 7]);

    let mut prg = vec![0xEAu8; 16 * 1024];
    prg[..DEMO_PROGRAM.len()].copy_from_slice(DEMO_PROGRAM);
    for vector in [0x3FFA, 0x3FFC, 0x3FFE] {
        prg[vector] = 0x00;
        prg[vector + 1] = 0x80;
    }
    rom.extend_from_slice(&prg);
    rom.extend_from_slice(&[0u8; 8 * 1024]);
    rom
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let demo = args.rom.is_none();
    let image = match &args.rom {
        Some(path) => std::fs::read(path)?,
        None => build_demo_ines(),
    };

    let mut bus = Bus::new();
    bus.load_rom(&image)?;
    bus.reset();

    if let Some(cart) = bus.cartridge() {
        println!(
            "Cartridge: mapper {} | PRG {} KiB | CHR {} KiB | {:?} mirroring",
            cart.mapper_id(),
            cart.prg_rom_len() / 1024,
            cart.chr_len() / 1024,
            cart.mirroring()
        );
    }

    let (frames, steps) = match (args.frames, args.steps) {
        (0, 0) if demo => (0, 32),
        (0, 0) => (1, 0),
        other => other,
    };

    for _ in 0..frames {
        bus.step_frame();
    }
    for _ in 0..steps {
        bus.step_instruction();
        log::debug!("{}", bus.cpu.state());
    }

    println!("{}", bus.cpu.state());
    println!("CPU cycles: {}", bus.cpu.total_cycles());
    println!(
        "PPU: scanline {} cycle {}",
        bus.ppu.scanline(),
        bus.ppu.cycle()
    );
    if demo {
        println!(
            "$0000..$0002: {:02X} {:02X} {:02X}",
            bus.cpu_read(0x0000, true),
            bus.cpu_read(0x0001, true),
            bus.cpu_read(0x0002, true)
        );
    }

    if args.disassemble {
        let (start, stop) = if demo {
            (0x8000, 0x8000 + DEMO_PROGRAM.len() as u16 - 1)
        } else {
            let pc = bus.cpu.pc;
            (pc.saturating_sub(0x10), pc.saturating_add(0x20))
        };
        println!();
        for line in bus.disassemble(start, stop).values() {
            println!("{line}");
        }
    }

    #[cfg(feature = "screenshot")]
    {
        if let Some(path) = &args.screenshot {
            famicore::screenshot::save_frame_png(&bus.ppu, path)?;
        }
    }

    Ok(())
}
