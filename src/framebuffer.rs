pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// One byte per pixel, row-major, each 0 or 1.
pub struct Framebuffer {
    cells: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer {
            cells: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.cells[y * SCREEN_WIDTH + x]
    }

    /// XOR an 8-pixel-wide sprite onto the screen, MSB leftmost. The origin
    /// wraps onto the screen; anything past the right or bottom edge from
    /// there is clipped. Returns true if any lit pixel was switched off.
    pub fn blit(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let start_x = x as usize & (SCREEN_WIDTH - 1);
        let start_y = y as usize & (SCREEN_HEIGHT - 1);
        let mut collision = false;

        for (py, row) in (start_y..SCREEN_HEIGHT).zip(rows) {
            for (px, bit) in (start_x..SCREEN_WIDTH).zip(0..8) {
                if row & (0x80 >> bit) == 0 {
                    continue;
                }
                let cell = &mut self.cells[py * SCREEN_WIDTH + px];
                collision |= *cell == 1;
                *cell ^= 1;
            }
        }
        collision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &Framebuffer) -> usize {
        fb.cells().iter().filter(|&&c| c == 1).count()
    }

    #[test]
    fn test_blit_sets_pixels() {
        let mut fb = Framebuffer::new();
        assert!(!fb.blit(2, 3, &[0b1010_0000, 0b0100_0000]));
        assert_eq!(fb.pixel(2, 3), 1);
        assert_eq!(fb.pixel(3, 3), 0);
        assert_eq!(fb.pixel(4, 3), 1);
        assert_eq!(fb.pixel(3, 4), 1);
        assert_eq!(lit(&fb), 3);
    }

    #[test]
    fn test_blit_twice_restores_and_collides() {
        let mut fb = Framebuffer::new();
        let glyph = [0xF0, 0x90, 0xF0, 0x90, 0x90];
        assert!(!fb.blit(10, 10, &glyph));
        let after_first = fb.cells().to_vec();
        assert!(fb.blit(10, 10, &glyph));
        assert_eq!(lit(&fb), 0);
        assert!(!fb.blit(10, 10, &glyph));
        assert_eq!(fb.cells(), &after_first[..]);
    }

    #[test]
    fn test_partial_overlap_collides() {
        let mut fb = Framebuffer::new();
        fb.blit(0, 0, &[0x80]);
        assert!(fb.blit(0, 0, &[0xC0]));
        assert_eq!(fb.pixel(0, 0), 0);
        assert_eq!(fb.pixel(1, 0), 1);
    }

    #[test]
    fn test_origin_wraps() {
        let mut fb = Framebuffer::new();
        // 64 + 1, 32 + 2
        fb.blit(65, 34, &[0x80]);
        assert_eq!(fb.pixel(1, 2), 1);
        assert_eq!(lit(&fb), 1);
    }

    #[test]
    fn test_clips_right_and_bottom() {
        let mut fb = Framebuffer::new();
        fb.blit(60, 30, &[0xFF, 0xFF, 0xFF, 0xFF]);
        // 4 columns by 2 rows survive
        assert_eq!(lit(&fb), 8);
        assert_eq!(fb.pixel(63, 31), 1);
        assert_eq!(fb.pixel(0, 30), 0);
        assert_eq!(fb.pixel(60, 0), 0);
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.blit(0, 0, &[0xFF; 15]);
        fb.clear();
        assert_eq!(lit(&fb), 0);
        assert!(!fb.blit(0, 0, &[0xFF; 15]));
    }
}
