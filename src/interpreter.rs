//! # interpreter
//!
//! Machine state for one CHIP-8 program:
//!  V0-VF   16 byte registers; VF doubles as carry/borrow/collision flag
//!  I       16 bit index register, mostly used as a memory pointer
//!  PC      program counter, starts at 0x200
//!  stack   up to 16 return addresses
//!  DT, ST  delay and sound timers, counting down at 60Hz
//!
//! plus 4K of memory, the 64x32 framebuffer and a shared view of the keypad.
//!
//! The driver calls `step` at the clock rate. Each step fetches, advances PC
//! by two, decodes and executes one instruction, then lets the timers decay
//! if a 60th of a second has passed. The returned `Status` tells the driver
//! whether to redraw and whether the buzzer should be sounding.
use crate::error::Chip8Error;
use crate::framebuffer::Framebuffer;
use crate::input::KeyLatch;
use crate::memory::{
    Chip8MemoryMap, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_PROGRAM_ADDR,
};
use crate::opcode::{decode, Instruction, Opcode};
use crate::stack::CallStack;
use crate::timer::Timers;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::sync::Arc;
use std::time::Instant;

/// index of the flag register
pub const VF: usize = 0xf;

/// What happened during a step, for the collaborators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Status {
    /// the framebuffer changed and should be presented
    pub redraw: bool,
    /// sound timer is non-zero
    pub sound: bool,
    /// delay timer is non-zero
    pub delay: bool,
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    v: [u8; 16],
    i: u16,
    pc: u16,
    stack: CallStack,
    timers: Timers,
    framebuffer: Framebuffer,
    keys: Arc<KeyLatch>,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new(keys: Arc<KeyLatch>) -> Result<Chip8Interpreter, Chip8Error> {
        Self::with_rng(keys, StdRng::from_entropy())
    }

    /// same as `new` but with a reproducible random source
    pub fn with_seed(keys: Arc<KeyLatch>, seed: u64) -> Result<Chip8Interpreter, Chip8Error> {
        Self::with_rng(keys, StdRng::seed_from_u64(seed))
    }

    fn with_rng(keys: Arc<KeyLatch>, rng: StdRng) -> Result<Chip8Interpreter, Chip8Error> {
        Ok(Chip8Interpreter {
            memory: Chip8MemoryMap::new()?,
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: CallStack::new(),
            timers: Timers::new(Instant::now()),
            framebuffer: Framebuffer::new(),
            keys,
            rng,
        })
    }

    /// back to power-on state: zeroed, font loaded, PC at 0x200
    pub fn reset(&mut self) -> Result<(), Chip8Error> {
        self.memory = Chip8MemoryMap::new()?;
        self.v = [0; 16];
        self.i = 0;
        self.pc = CHIP8_PROGRAM_ADDR;
        self.stack = CallStack::new();
        self.timers = Timers::new(Instant::now());
        self.framebuffer.clear();
        log::info!("interpreter reset");
        Ok(())
    }

    /// load a chip8 program at 0x200 and point PC at it
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let len = self.memory.load_program(reader)?;
        self.pc = CHIP8_PROGRAM_ADDR;
        log::info!("loaded {} byte program at {:#05x}", len, CHIP8_PROGRAM_ADDR);
        Ok(len)
    }

    /// one fetch/decode/execute cycle, timed against the wall clock
    pub fn step(&mut self) -> Result<Status, Chip8Error> {
        self.step_at(Instant::now())
    }

    /// one fetch/decode/execute cycle, with timer decay measured against `now`
    pub fn step_at(&mut self, now: Instant) -> Result<Status, Chip8Error> {
        let addr = self.pc;
        let op = self.instruction_at(addr)?;
        self.pc = self.pc.wrapping_add(2);

        let ins = decode(op).map_err(|e| e.at(addr))?;
        log::trace!("{:03X}: {:04X} {}", addr, op.0, ins);
        let redraw = self.execute(ins, addr)?;

        self.timers.update(now);
        Ok(Status {
            redraw,
            sound: self.timers.sound > 0,
            delay: self.timers.delay > 0,
        })
    }

    /// the instruction word at `addr`, which must lie wholly in memory
    pub fn instruction_at(&self, addr: u16) -> Result<Opcode, Chip8Error> {
        self.memory
            .get_word(addr)
            .map(Opcode)
            .ok_or(Chip8Error::ProgramRunaway { pc: addr })
    }

    /// disassembly of the instruction at `addr`
    pub fn disassemble_at(&self, addr: u16) -> Result<String, Chip8Error> {
        let op = self.instruction_at(addr)?;
        let ins = decode(op).map_err(|e| e.at(addr))?;
        Ok(ins.to_string())
    }

    /// apply one instruction; returns whether the screen needs redrawing
    fn execute(&mut self, ins: Instruction, addr: u16) -> Result<bool, Chip8Error> {
        use Instruction::*;
        match ins {
            ClearScreen => {
                self.framebuffer.clear();
                return Ok(true);
            }
            Return => {
                self.pc = self
                    .stack
                    .pop()
                    .ok_or(Chip8Error::StackUnderflow { address: addr })?;
                log::debug!("{:03X}: return to {:03X}", addr, self.pc);
            }
            Jump(nnn) => self.pc = nnn,
            Call(nnn) => {
                self.stack
                    .push(self.pc)
                    .ok_or(Chip8Error::StackOverflow { address: addr })?;
                log::debug!("{:03X}: call {:03X} (depth {})", addr, nnn, self.stack.depth());
                self.pc = nnn;
            }
            SkipIfEqImm(x, nn) => self.skip_if(self.v[x] == nn),
            SkipIfNeImm(x, nn) => self.skip_if(self.v[x] != nn),
            SkipIfEqReg(x, y) => self.skip_if(self.v[x] == self.v[y]),
            SkipIfNeReg(x, y) => self.skip_if(self.v[x] != self.v[y]),
            LoadImm(x, nn) => self.v[x] = nn,
            AddImm(x, nn) => self.v[x] = self.v[x].wrapping_add(nn),
            Copy(x, y) => self.v[x] = self.v[y],
            // the logic ops clear VF, as the COSMAC interpreter did
            Or(x, y) => self.alu(x, self.v[x] | self.v[y], 0),
            And(x, y) => self.alu(x, self.v[x] & self.v[y], 0),
            Xor(x, y) => self.alu(x, self.v[x] ^ self.v[y], 0),
            Add(x, y) => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.alu(x, sum, carry as u8);
            }
            Sub(x, y) => {
                let (a, b) = (self.v[x], self.v[y]);
                self.alu(x, a.wrapping_sub(b), (a >= b) as u8);
            }
            SubN(x, y) => {
                let (a, b) = (self.v[x], self.v[y]);
                self.alu(x, b.wrapping_sub(a), (b >= a) as u8);
            }
            ShiftRight(x) => {
                let a = self.v[x];
                self.alu(x, a >> 1, a & 0x01);
            }
            ShiftLeft(x) => {
                let a = self.v[x];
                self.alu(x, a << 1, a >> 7);
            }
            SetIndex(nnn) => self.i = nnn,
            JumpOffset(nnn) => self.pc = nnn + self.v[0] as u16,
            Random(x, nn) => self.v[x] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                self.draw_sprite(x, y, n);
                return Ok(true);
            }
            SkipIfKeyDown(x) => self.skip_if(self.keys.is_down(self.v[x])),
            SkipIfKeyUp(x) => self.skip_if(!self.keys.is_down(self.v[x])),
            ReadDelay(x) => self.v[x] = self.timers.delay,
            WaitKey(x) => match self.keys.first_down() {
                Some(key) => {
                    log::debug!("{:03X}: key {:X} pressed", addr, key);
                    self.v[x] = key;
                }
                // replay this instruction next step
                None => self.pc = self.pc.wrapping_sub(2),
            },
            SetDelay(x) => self.timers.delay = self.v[x],
            SetSound(x) => self.timers.sound = self.v[x],
            AddIndex(x) => self.i = self.i.wrapping_add(self.v[x] as u16),
            FontGlyph(x) => {
                let digit = (self.v[x] & 0x0f) as u16;
                self.i = CHIP8_FONT_ADDR + digit * CHIP8_FONT_GLYPH_BYTES;
            }
            Bcd(x) => {
                self.memory.write(&double_dabble(self.v[x]), self.i);
            }
            // V0 through Vx inclusive
            StoreRegisters(x) => {
                self.memory.write(&self.v[..=x], self.i);
            }
            LoadRegisters(x) => {
                self.memory.read(self.i, &mut self.v[..=x]);
            }
        }
        Ok(false)
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    /// VF is written last so it holds the flag even when x is VF
    fn alu(&mut self, x: usize, result: u8, flag: u8) {
        self.v[x] = result;
        self.v[VF] = flag;
    }

    fn draw_sprite(&mut self, x: usize, y: usize, n: u8) {
        let (vx, vy) = (self.v[x], self.v[y]);
        self.v[VF] = 0;

        let mut rows = [0u8; 15];
        let len = self.memory.read(self.i, &mut rows[..n as usize]);
        let collision = self.framebuffer.blit(vx, vy, &rows[..len]);
        self.v[VF] = collision as u8;
    }

    pub fn program_counter(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    /// register index is masked to 4 bits
    pub fn register(&self, x: u8) -> u8 {
        self.v[(x & 0xf) as usize]
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory(&self) -> &impl MemoryMap {
        &self.memory
    }
}

/// Binary to three BCD digits (hundreds, tens, ones) by shift-and-add-3:
/// before each shift any digit of 5 or more gets 3 added so the shift
/// carries it into the next digit.
pub fn double_dabble(value: u8) -> [u8; 3] {
    let mut bcd: u16 = 0;
    for bit in (0..8).rev() {
        for lane in [0, 4, 8] {
            if (bcd >> lane) & 0xf >= 5 {
                bcd += 3 << lane;
            }
        }
        bcd = (bcd << 1) | ((value >> bit) & 1) as u16;
    }
    [
        ((bcd >> 8) & 0xf) as u8,
        ((bcd >> 4) & 0xf) as u8,
        (bcd & 0xf) as u8,
    ]
}
