use std::io;
use thiserror::Error;

/// Everything that stops emulation of the current program. There is no
/// recovery from any of these; the driver reports and exits.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unknown opcode {opcode:#06X} at {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("stack overflow: CALL at {address:#05X} with 16 return addresses already stacked")]
    StackOverflow { address: u16 },

    #[error("stack underflow: RET at {address:#05X} with an empty call stack")]
    StackUnderflow { address: u16 },

    #[error("program runaway: no complete instruction at {pc:#05X}")]
    ProgramRunaway { pc: u16 },

    #[error("program is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("font set is too large ({size} bytes), only {written} bytes fit")]
    FontTooLarge { size: usize, written: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}
