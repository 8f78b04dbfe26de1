//! # opcode
//!
//! Instruction words are two big-endian bytes. Most are named by their
//! nibbles, e.g. `8xy4`:
//!
//!  kind  bits 15-12   selects the primary group
//!  x     bits 11-8    first register
//!  y     bits 7-4     second register
//!  n     bits 3-0     4-bit immediate / sub-opcode
//!  nn    bits 7-0     8-bit immediate / sub-opcode
//!  nnn   bits 11-0    12-bit address
//!
//! The instruction set is closed: anything not in the table below fails to
//! decode. That includes `5xyN` and `9xyN` with N other than 0, which some
//! interpreters accept by looking at the top nibble alone.
use crate::error::Chip8Error;
use std::fmt;

/// a raw instruction word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn kind(self) -> u8 {
        ((self.0 & 0xf000) >> 12) as u8
    }
    pub fn x(self) -> usize {
        ((self.0 & 0x0f00) >> 8) as usize
    }
    pub fn y(self) -> usize {
        ((self.0 & 0x00f0) >> 4) as usize
    }
    pub fn n(self) -> u8 {
        (self.0 & 0x000f) as u8
    }
    pub fn nn(self) -> u8 {
        (self.0 & 0x00ff) as u8
    }
    pub fn nnn(self) -> u16 {
        self.0 & 0x0fff
    }
}

/// Decoded instructions. Register operands are indices 0x0-0xf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xnn
    SkipIfEqImm(usize, u8),
    /// 4xnn
    SkipIfNeImm(usize, u8),
    /// 5xy0
    SkipIfEqReg(usize, usize),
    /// 6xnn
    LoadImm(usize, u8),
    /// 7xnn
    AddImm(usize, u8),
    /// 8xy0
    Copy(usize, usize),
    /// 8xy1
    Or(usize, usize),
    /// 8xy2
    And(usize, usize),
    /// 8xy3
    Xor(usize, usize),
    /// 8xy4
    Add(usize, usize),
    /// 8xy5
    Sub(usize, usize),
    /// 8xy6
    ShiftRight(usize),
    /// 8xy7
    SubN(usize, usize),
    /// 8xyE
    ShiftLeft(usize),
    /// 9xy0
    SkipIfNeReg(usize, usize),
    /// Annn
    SetIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxnn
    Random(usize, u8),
    /// Dxyn
    Draw(usize, usize, u8),
    /// Ex9E
    SkipIfKeyDown(usize),
    /// ExA1
    SkipIfKeyUp(usize),
    /// Fx07
    ReadDelay(usize),
    /// Fx0A
    WaitKey(usize),
    /// Fx15
    SetDelay(usize),
    /// Fx18
    SetSound(usize),
    /// Fx1E
    AddIndex(usize),
    /// Fx29
    FontGlyph(usize),
    /// Fx33
    Bcd(usize),
    /// Fx55
    StoreRegisters(usize),
    /// Fx65
    LoadRegisters(usize),
}

/// what decode says when a word isn't in the table; the caller knows the address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownOpcode(pub u16);

impl UnknownOpcode {
    pub fn at(self, address: u16) -> Chip8Error {
        Chip8Error::UnknownOpcode {
            opcode: self.0,
            address,
        }
    }
}

/// split a word into an `Instruction`
pub fn decode(op: Opcode) -> Result<Instruction, UnknownOpcode> {
    use Instruction::*;
    let (x, y) = (op.x(), op.y());
    let ins = match op.kind() {
        0x0 => match op.0 {
            0x00e0 => ClearScreen,
            0x00ee => Return,
            _ => return Err(UnknownOpcode(op.0)),
        },
        0x1 => Jump(op.nnn()),
        0x2 => Call(op.nnn()),
        0x3 => SkipIfEqImm(x, op.nn()),
        0x4 => SkipIfNeImm(x, op.nn()),
        0x5 if op.n() == 0 => SkipIfEqReg(x, y),
        0x6 => LoadImm(x, op.nn()),
        0x7 => AddImm(x, op.nn()),
        0x8 => match op.n() {
            0x0 => Copy(x, y),
            0x1 => Or(x, y),
            0x2 => And(x, y),
            0x3 => Xor(x, y),
            0x4 => Add(x, y),
            0x5 => Sub(x, y),
            0x6 => ShiftRight(x),
            0x7 => SubN(x, y),
            0xe => ShiftLeft(x),
            _ => return Err(UnknownOpcode(op.0)),
        },
        0x9 if op.n() == 0 => SkipIfNeReg(x, y),
        0xa => SetIndex(op.nnn()),
        0xb => JumpOffset(op.nnn()),
        0xc => Random(x, op.nn()),
        0xd => Draw(x, y, op.n()),
        0xe => match op.nn() {
            0x9e => SkipIfKeyDown(x),
            0xa1 => SkipIfKeyUp(x),
            _ => return Err(UnknownOpcode(op.0)),
        },
        0xf => match op.nn() {
            0x07 => ReadDelay(x),
            0x0a => WaitKey(x),
            0x15 => SetDelay(x),
            0x18 => SetSound(x),
            0x1e => AddIndex(x),
            0x29 => FontGlyph(x),
            0x33 => Bcd(x),
            0x55 => StoreRegisters(x),
            0x65 => LoadRegisters(x),
            _ => return Err(UnknownOpcode(op.0)),
        },
        _ => return Err(UnknownOpcode(op.0)),
    };
    Ok(ins)
}

/// human-readable form of a raw word, for debugging tools
pub fn disassemble(word: u16) -> Result<String, UnknownOpcode> {
    decode(Opcode(word)).map(|ins| ins.to_string())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP {:03X}", nnn),
            Call(nnn) => write!(f, "CALL {:03X}", nnn),
            SkipIfEqImm(x, nn) => write!(f, "SE V{:X}, {:02X}", x, nn),
            SkipIfNeImm(x, nn) => write!(f, "SNE V{:X}, {:02X}", x, nn),
            SkipIfEqReg(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm(x, nn) => write!(f, "LD V{:X}, {:02X}", x, nn),
            AddImm(x, nn) => write!(f, "ADD V{:X}, {:02X}", x, nn),
            Copy(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x) => write!(f, "SHR V{:X}", x),
            SubN(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x) => write!(f, "SHL V{:X}", x),
            SkipIfNeReg(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            SetIndex(nnn) => write!(f, "LD I, {:03X}", nnn),
            JumpOffset(nnn) => write!(f, "JP V0, {:03X}", nnn),
            Random(x, nn) => write!(f, "RND V{:X}, {:02X}", x, nn),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, n),
            SkipIfKeyDown(x) => write!(f, "SKP V{:X}", x),
            SkipIfKeyUp(x) => write!(f, "SKNP V{:X}", x),
            ReadDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            FontGlyph(x) => write!(f, "LD F, V{:X}", x),
            Bcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegisters(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegisters(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    #[test]
    fn test_fields() {
        let op = Opcode(0xd12f);
        assert_eq!(op.kind(), 0xd);
        assert_eq!(op.x(), 0x1);
        assert_eq!(op.y(), 0x2);
        assert_eq!(op.n(), 0xf);
        assert_eq!(op.nn(), 0x2f);
        assert_eq!(op.nnn(), 0x12f);
    }

    #[test]
    fn test_decode_groups() {
        assert_eq!(decode(Opcode(0x00e0)), Ok(ClearScreen));
        assert_eq!(decode(Opcode(0x00ee)), Ok(Return));
        assert_eq!(decode(Opcode(0x1234)), Ok(Jump(0x234)));
        assert_eq!(decode(Opcode(0x2468)), Ok(Call(0x468)));
        assert_eq!(decode(Opcode(0x3a12)), Ok(SkipIfEqImm(0xa, 0x12)));
        assert_eq!(decode(Opcode(0x4a12)), Ok(SkipIfNeImm(0xa, 0x12)));
        assert_eq!(decode(Opcode(0x5ab0)), Ok(SkipIfEqReg(0xa, 0xb)));
        assert_eq!(decode(Opcode(0x6cff)), Ok(LoadImm(0xc, 0xff)));
        assert_eq!(decode(Opcode(0x7c01)), Ok(AddImm(0xc, 0x01)));
        assert_eq!(decode(Opcode(0x9ab0)), Ok(SkipIfNeReg(0xa, 0xb)));
        assert_eq!(decode(Opcode(0xa300)), Ok(SetIndex(0x300)));
        assert_eq!(decode(Opcode(0xb300)), Ok(JumpOffset(0x300)));
        assert_eq!(decode(Opcode(0xc50f)), Ok(Random(0x5, 0x0f)));
        assert_eq!(decode(Opcode(0xd015)), Ok(Draw(0x0, 0x1, 0x5)));
        assert_eq!(decode(Opcode(0xe39e)), Ok(SkipIfKeyDown(0x3)));
        assert_eq!(decode(Opcode(0xe3a1)), Ok(SkipIfKeyUp(0x3)));
    }

    #[test]
    fn test_decode_alu() {
        let expected = [
            (0x0, Copy(1, 2)),
            (0x1, Or(1, 2)),
            (0x2, And(1, 2)),
            (0x3, Xor(1, 2)),
            (0x4, Add(1, 2)),
            (0x5, Sub(1, 2)),
            (0x6, ShiftRight(1)),
            (0x7, SubN(1, 2)),
            (0xe, ShiftLeft(1)),
        ];
        for (n, ins) in expected {
            assert_eq!(decode(Opcode(0x8120 | n)), Ok(ins));
        }
    }

    #[test]
    fn test_decode_misc() {
        let expected = [
            (0x07, ReadDelay(4)),
            (0x0a, WaitKey(4)),
            (0x15, SetDelay(4)),
            (0x18, SetSound(4)),
            (0x1e, AddIndex(4)),
            (0x29, FontGlyph(4)),
            (0x33, Bcd(4)),
            (0x55, StoreRegisters(4)),
            (0x65, LoadRegisters(4)),
        ];
        for (nn, ins) in expected {
            assert_eq!(decode(Opcode(0xf400 | nn)), Ok(ins));
        }
    }

    #[test]
    fn test_unknown_opcodes() {
        for word in [
            0x0000, 0x0123, 0x00e1, 0x5121, 0x8008, 0x800f, 0x9ab1, 0xe19f, 0xe100, 0xf000,
            0xf066, 0xffff,
        ] {
            assert_eq!(decode(Opcode(word)), Err(UnknownOpcode(word)), "{:04x}", word);
        }
    }

    #[test]
    fn test_unknown_carries_address() {
        let err = UnknownOpcode(0xffff).at(0x2fe);
        assert!(matches!(
            err,
            Chip8Error::UnknownOpcode { opcode: 0xffff, address: 0x2fe }
        ));
    }

    #[test]
    fn test_disassemble() {
        let expected = [
            (0x00e0, "CLS"),
            (0x00ee, "RET"),
            (0x1a2b, "JP A2B"),
            (0x2030, "CALL 030"),
            (0x3f0a, "SE VF, 0A"),
            (0x4105, "SNE V1, 05"),
            (0x5120, "SE V1, V2"),
            (0x6aff, "LD VA, FF"),
            (0x7b01, "ADD VB, 01"),
            (0x8120, "LD V1, V2"),
            (0x8121, "OR V1, V2"),
            (0x8122, "AND V1, V2"),
            (0x8123, "XOR V1, V2"),
            (0x8124, "ADD V1, V2"),
            (0x8125, "SUB V1, V2"),
            (0x8126, "SHR V1"),
            (0x8127, "SUBN V1, V2"),
            (0x812e, "SHL V1"),
            (0x9120, "SNE V1, V2"),
            (0xa050, "LD I, 050"),
            (0xb300, "JP V0, 300"),
            (0xc1f0, "RND V1, F0"),
            (0xd01f, "DRW V0, V1, F"),
            (0xe29e, "SKP V2"),
            (0xe2a1, "SKNP V2"),
            (0xf307, "LD V3, DT"),
            (0xf30a, "LD V3, K"),
            (0xf315, "LD DT, V3"),
            (0xf318, "LD ST, V3"),
            (0xf31e, "ADD I, V3"),
            (0xf329, "LD F, V3"),
            (0xf333, "LD B, V3"),
            (0xf355, "LD [I], V3"),
            (0xf365, "LD V3, [I]"),
        ];
        for (word, text) in expected {
            assert_eq!(disassemble(word).as_deref(), Ok(text));
        }
        assert_eq!(disassemble(0x0000), Err(UnknownOpcode(0x0000)));
    }
}
