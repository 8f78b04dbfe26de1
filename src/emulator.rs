use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Controls;
use crate::interpreter::{Chip8Interpreter, Status};
use crate::sound::Sound;
use std::fmt::Write;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Drives the interpreter at a fixed clock and hands its output to the
/// display and sound collaborators. Stopping is cooperative: the loop checks
/// the quit flag between instructions.
pub struct Emulator<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    sound: &'a mut dyn Sound,
    controls: Arc<Controls>,
    cycle_period: Duration,
    max_cycles: u64,
    sound_failed: bool,
}

impl<'a> Emulator<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        sound: &'a mut dyn Sound,
        controls: Arc<Controls>,
        config: &Config,
    ) -> Self {
        Emulator {
            interpreter,
            display,
            sound,
            controls,
            cycle_period: config.cycle_period(),
            max_cycles: config.cycles,
            sound_failed: false,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// run until quit, the cycle limit, or a fatal error; returns how many
    /// instructions were executed
    pub fn run(&mut self) -> Result<u64, Chip8Error> {
        log::info!(
            "running at {:?} per instruction{}",
            self.cycle_period,
            if self.max_cycles > 0 {
                format!(", stopping after {}", self.max_cycles)
            } else {
                String::new()
            }
        );
        self.present()?;

        let mut executed = 0;
        let mut next = Instant::now();
        let result = loop {
            if self.controls.should_quit() {
                break Ok(executed);
            }
            if self.max_cycles > 0 && executed >= self.max_cycles {
                break Ok(executed);
            }
            if self.controls.may_step() {
                if let Err(e) = self.cycle() {
                    break Err(e);
                }
                executed += 1;
            }

            next += self.cycle_period;
            let now = Instant::now();
            if next > now {
                spin_sleep::sleep(next - now);
            } else {
                // running behind; don't try to catch up
                next = now;
            }
        };

        self.sync_sound(false);
        if let Ok(n) = &result {
            log::info!("stopped after {} instructions", n);
        }
        result
    }

    /// one instruction, then whatever the collaborators need to hear about
    pub fn cycle(&mut self) -> Result<Status, Chip8Error> {
        let status = self.interpreter.step()?;
        self.sync_sound(status.sound);
        // while single-stepping, show the registers after every instruction
        if status.redraw || self.controls.paused.load(Ordering::Relaxed) {
            self.present()?;
        }
        Ok(status)
    }

    fn present(&mut self) -> Result<(), Chip8Error> {
        let status = self.status_line();
        self.display
            .draw(self.interpreter.framebuffer().cells(), &status)?;
        Ok(())
    }

    fn sync_sound(&mut self, active: bool) {
        if self.sound_failed {
            return;
        }
        if let Err(e) = self.sound.sync(active) {
            log::warn!("sound disabled: {}", e);
            self.sound_failed = true;
        }
    }

    /// two lines: PC, I, stack depth and the next instruction, then V0-VF
    pub fn status_line(&self) -> String {
        let i = &self.interpreter;
        let pc = i.program_counter();
        let next = i
            .disassemble_at(pc)
            .unwrap_or_else(|_| String::from("???"));
        let mut line = format!(
            "PC:{:03X} I:{:03X} SP:{:X} {}\nV0-F:",
            pc,
            i.index(),
            i.stack_depth(),
            next
        );
        for r in 0..16u8 {
            let _ = write!(line, " {:02X}", i.register(r));
        }
        line
    }
}
