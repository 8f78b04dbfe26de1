use crate::error::Chip8Error;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the addressable memory of the machine. Transfers never fault:
/// anything that would run into `MEMORY_LIMIT` is cut short and the caller
/// gets told how many bytes actually moved.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM", returning how many were written
    fn write(&mut self, data: &[u8], addr: u16) -> usize {
        let bytes = self.get_rw_slice(addr, data.len());
        let len = bytes.len();
        bytes.copy_from_slice(&data[..len]);
        len
    }

    /// fill `buf` from "RAM", returning how many bytes were read
    fn read(&self, addr: u16, buf: &mut [u8]) -> usize {
        let bytes = self.get_ro_slice(addr, buf.len());
        let len = bytes.len();
        buf[..len].copy_from_slice(bytes);
        len
    }

    /// get a big-endian two-byte word, or None if it would cross the limit
    fn get_word(&self, addr: u16) -> Option<u16> {
        match self.get_ro_slice(addr, 2) {
            [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    /// get a r/w slice of the underlying memory, truncated at the limit
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory, truncated at the limit
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// first address no transfer may touch
pub const MEMORY_LIMIT: u16 = 0x0fff;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x0050;

/// bytes per hex digit glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// largest program that fits between the program area and the limit
pub const CHIP8_MAX_PROGRAM_BYTES: usize = (MEMORY_LIMIT - CHIP8_PROGRAM_ADDR) as usize;

/// Defines the CHIP-8 standard 4K memory map
///   0x0000-0x004f  unused
///   0x0050-0x009f  font, 16 glyphs of 5 bytes
///   0x00a0-0x01ff  unused
///   0x0200-0x0ffe  program
///
/// stack, registers and display are kept outside addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let (a, b) = Self::clamp(addr, len);
        &mut self.bytes[a..b]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let (a, b) = Self::clamp(addr, len);
        &self.bytes[a..b]
    }
}

impl Chip8MemoryMap {
    /// initialises memory with the font baked in and everything else zeroed
    pub fn new() -> Result<Self, Chip8Error> {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.load_font(&CHIP8_FONT)?;
        Ok(mm)
    }

    /// write a glyph table at the font address; a short write is fatal
    pub fn load_font(&mut self, font: &[u8]) -> Result<(), Chip8Error> {
        let written = self.write(font, CHIP8_FONT_ADDR);
        if written < font.len() {
            return Err(Chip8Error::FontTooLarge {
                size: font.len(),
                written,
            });
        }
        Ok(())
    }

    /// load a CHIP-8 program at 0x200; a short write is fatal
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let written = self.write(&buf, CHIP8_PROGRAM_ADDR);
        if written < buf.len() {
            return Err(Chip8Error::ProgramTooLarge {
                size: buf.len(),
                max_size: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        Ok(written)
    }

    fn clamp(addr: u16, len: usize) -> (usize, usize) {
        let limit = MEMORY_LIMIT as usize;
        let a = (addr as usize).min(limit);
        (a, a.saturating_add(len).min(limit))
    }
}

#[rustfmt::skip]
pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() -> Result<(), Chip8Error> {
        let m = Chip8MemoryMap::new()?;
        // NB. memory is zeroed from 0x200 because before that we bake in the font
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
        Ok(())
    }

    #[test]
    fn test_font_loaded() -> Result<(), Chip8Error> {
        let m = Chip8MemoryMap::new()?;
        assert_eq!(m.get_ro_slice(CHIP8_FONT_ADDR, 80), &CHIP8_FONT[..]);
        // glyph for "A" starts 10 glyphs in
        assert_eq!(m.get_ro_slice(0x50 + 10 * 5, 1), &[0xF0]);
        Ok(())
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new()?;
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write(src, 8), 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_write_truncates_at_limit() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new()?;
        assert_eq!(dst.write(&[0xaa; 8], 0xffc), 3);
        assert_eq!(dst.bytes[0xffc..], [0xaa, 0xaa, 0xaa, 0x00]);
        assert_eq!(dst.write(&[0xbb; 2], 0xfff), 0);
        assert_eq!(dst.write(&[0xbb; 2], 0xffff), 0);
        Ok(())
    }

    #[test]
    fn test_read_truncates_at_limit() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new()?;
        m.write(&[1, 2, 3], 0xffc);
        let mut buf = [0xeeu8; 5];
        assert_eq!(m.read(0xffc, &mut buf), 3);
        assert_eq!(buf, [1, 2, 3, 0xee, 0xee]);
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new()?;
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0);
        assert_eq!(m.get_word(0x4), Some(0x0405));
        assert_eq!(m.get_word(0xffd), Some(0x0000));
        assert_eq!(m.get_word(0xffe), None);
        Ok(())
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new()?;
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_largest_program_round_trips() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new()?;
        let prog: Vec<u8> = (0..CHIP8_MAX_PROGRAM_BYTES).map(|i| i as u8).collect();
        dst.load_program(&mut prog.as_slice())?;
        let mut back = vec![0u8; prog.len()];
        assert_eq!(dst.read(CHIP8_PROGRAM_ADDR, &mut back), prog.len());
        assert_eq!(back, prog);
        Ok(())
    }

    #[test]
    fn test_program_too_large() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new()?;
        let prog = vec![0; CHIP8_MAX_PROGRAM_BYTES + 1];
        let res = dst.load_program(&mut prog.as_slice());
        assert!(matches!(
            res,
            Err(Chip8Error::ProgramTooLarge { size: 3584, max_size: 3583 })
        ));
        Ok(())
    }

    #[test]
    fn test_font_too_large() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new()?;
        let res = m.load_font(&[0; 0x1000]);
        assert!(matches!(res, Err(Chip8Error::FontTooLarge { .. })));
        Ok(())
    }
}
