use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

/// Display is used by the emulator to present the framebuffer. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw one cell per pixel (row-major, 0 or 1) plus two lines of status text
    fn draw(&mut self, cells: &[u8], status: &str) -> Result<(), io::Error>;
}

// store useful metadata about the screen
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coords of every cell with the given value; y runs downward
    /// from the top so it's negated
    fn plane_from_cells<'a>(
        &self,
        cells: &'a [u8],
        plane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        cells
            .iter()
            .enumerate()
            .filter(move |&(_, &c)| c == plane)
            .map(move |(i, _)| ((i % w) as f64, -1.0 * (i / w) as f64))
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(SCREEN_WIDTH, SCREEN_HEIGHT),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, cells: &[u8], status: &str) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            cells.len(),
            self.resolution.pixel_count(),
            "MonoTermDisplay must have correct-sized data to draw"
        );

        let resolution = &self.resolution;
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let screen = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);
            let status_line = Rect::new(0, screen.height, screen.width, 4);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &resolution.plane_from_cells(cells, 0).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.plane_from_cells(cells, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, screen);

            let text = Paragraph::new(status.to_string())
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(text, status_line);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers the last frame
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Vec<u8>,
    pub last_status: String,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, cells: &[u8], status: &str) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = cells.to_vec();
        self.last_status = status.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_planes() {
        let r = Resolution(64, 32);
        let mut cells = [0u8; 2048];
        cells[0] = 1;
        cells[64 + 3] = 1;
        let lit: Vec<_> = r.plane_from_cells(&cells, 1).collect();
        assert_eq!(lit, vec![(0.0, 0.0), (3.0, -1.0)]);
        assert_eq!(r.plane_from_cells(&cells, 0).count(), 2046);
    }

    #[test]
    fn test_dummy_records_frame() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        d.draw(&[1, 0, 1], "PC 200")?;
        assert_eq!(d.frames, 1);
        assert_eq!(d.last, vec![1, 0, 1]);
        assert_eq!(d.last_status, "PC 200");
        Ok(())
    }

    #[test]
    #[ignore]
    #[should_panic]
    // NB. figure out how to stop rendering during tests
    fn test_draw_rejects_wrong_data() {
        let mut d = MonoTermDisplay::new().unwrap();
        let _ = d.draw(&[0; 2049], "");
    }
}
