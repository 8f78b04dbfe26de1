//! A CHIP-8 virtual machine with a terminal front end.
//!
//! ## Design
//!
//! * the interpreter core (`interpreter`, with `opcode`, `memory`, `stack`,
//!   `timer`, `framebuffer`) knows nothing about terminals, speakers or
//!   files; the driver calls `step` and reads back a `Status`
//! * the keypad is the only state shared across threads: an input thread
//!   writes a `KeyLatch` of atomic flags which the interpreter polls
//! * display, input and sound sit behind traits so the terminal versions can
//!   be swapped for dummies in tests
//! * `FX0A` waits for a key by replaying itself, so no instruction ever
//!   blocks the driving loop
//! * timers decay against the wall clock at 60Hz from inside `step`, so the
//!   instruction rate can be anything
//!
//! Model
//!
//! ```text
//! main
//!  |-- config (clap), logging (env_logger)
//!  |-- interpreter(key latch) <- program loaded from the ROM file
//!  |-- input thread: terminal -> key latch, pause/step/quit controls
//!  `-- emulator main loop
//!       |-- status = interpreter.step()
//!       |-- sound.sync(status.sound)
//!       |-- if status.redraw { display.draw(framebuffer) }
//!       `-- spin_sleep until the next clock tick
//! ```
pub mod config;
pub mod display;
pub mod emulator;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod sound;
pub mod stack;
pub mod timer;

pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, Status};
