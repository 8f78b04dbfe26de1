use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use chip8vm::config::Config;
use chip8vm::display::MonoTermDisplay;
use chip8vm::emulator::Emulator;
use chip8vm::input::{spawn_input_thread, Controls, InputPump, KeyLatch, TermInput};
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

fn init_logging(config: &Config) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if config.trace {
        builder.filter_module("chip8vm", log::LevelFilter::Trace);
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    init_logging(&config);

    // initialise
    let keys = Arc::new(KeyLatch::new());
    let controls = Arc::new(Controls::new(config.paused));
    let mut interpreter = match config.seed {
        Some(seed) => Chip8Interpreter::with_seed(keys.clone(), seed)?,
        None => Chip8Interpreter::new(keys.clone())?,
    };

    // load a program
    let mut f = File::open(&config.rom)?;
    interpreter.load_program(&mut f)?;

    let mut display = MonoTermDisplay::new()?;
    let mut sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let input = spawn_input_thread(InputPump::new(TermInput::new()?, keys, controls.clone()));

    let result = Emulator::new(
        interpreter,
        &mut display,
        sound.as_mut(),
        controls.clone(),
        &config,
    )
    .run();

    // the input thread owns the terminal's raw mode; let it put things back
    controls.quit.store(true, Ordering::Relaxed);
    // input errors were already logged by the thread
    if input.join().is_err() {
        log::error!("input thread panicked");
    }

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..4 {
        println!();
    }
    result?;
    Ok(())
}
