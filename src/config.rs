use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// the COSMAC VIP ran CHIP-8 at roughly this many instructions a second
pub const DEFAULT_CLOCK_HZ: u32 = 700;

#[derive(Parser, Debug, Clone)]
#[command(name = "chip8vm")]
#[command(about = "CHIP-8 interpreter for the terminal", long_about = None)]
pub struct Config {
    /// program image to load at 0x200
    #[arg(value_name = "ROM")]
    pub rom: PathBuf,

    /// instructions executed per second
    #[arg(long, value_name = "HZ", default_value_t = DEFAULT_CLOCK_HZ,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub clock_hz: u32,

    /// don't use the PC speaker
    #[arg(long)]
    pub mute: bool,

    /// start paused; press `n` to single-step and `p` to run
    #[arg(long)]
    pub paused: bool,

    /// seed for the RND instruction, for reproducible runs
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// stop after this many instructions (0 runs until quit)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub cycles: u64,

    /// log every executed instruction
    #[arg(long)]
    pub trace: bool,
}

impl Config {
    /// time budget for one instruction
    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(1) / self.clock_hz
    }
}
