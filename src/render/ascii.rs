//! Text-grid renderer
//!
//! Each ball is drawn as a filled disc of the hex digit of its palette index
//! (`?` for colors outside the palette). Cells are sampled at their centers.

use std::io::Write;

use super::Renderer;
use crate::sim::{Ball, Viewport};

pub struct AsciiRenderer<W: Write> {
    out: W,
    viewport: Viewport,
    cols: usize,
    rows: usize,
    frame: String,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W, viewport: Viewport, cols: usize, rows: usize) -> Self {
        Self {
            out,
            viewport,
            cols: cols.max(1),
            rows: rows.max(1),
            frame: String::new(),
        }
    }

    /// Last drawn frame, rows separated by newlines
    pub fn last_frame(&self) -> &str {
        &self.frame
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&self, balls: &[Ball]) -> String {
        let cell_w = self.viewport.width / self.cols as f32;
        let cell_h = self.viewport.height / self.rows as f32;
        let mut grid = vec![vec!['.'; self.cols]; self.rows];

        // Later balls overwrite earlier ones, same as SVG paint order
        for ball in balls {
            let glyph = ball
                .color
                .palette_index()
                .and_then(|i| char::from_digit(i as u32, 16))
                .unwrap_or('?');

            let col_lo = ((ball.pos.x - ball.radius) / cell_w).floor().max(0.0) as usize;
            let col_hi = ((ball.pos.x + ball.radius) / cell_w).ceil() as usize;
            let row_lo = ((ball.pos.y - ball.radius) / cell_h).floor().max(0.0) as usize;
            let row_hi = ((ball.pos.y + ball.radius) / cell_h).ceil() as usize;

            for (row, line) in grid
                .iter_mut()
                .enumerate()
                .take(row_hi.min(self.rows))
                .skip(row_lo)
            {
                let cy = (row as f32 + 0.5) * cell_h;
                for (col, cell) in line
                    .iter_mut()
                    .enumerate()
                    .take(col_hi.min(self.cols))
                    .skip(col_lo)
                {
                    let cx = (col as f32 + 0.5) * cell_w;
                    let (ddx, ddy) = (cx - ball.pos.x, cy - ball.pos.y);
                    if ddx * ddx + ddy * ddy <= ball.radius * ball.radius {
                        *cell = glyph;
                    }
                }
            }
        }

        let mut frame = String::with_capacity((self.cols + 1) * self.rows);
        for line in grid {
            frame.extend(line);
            frame.push('\n');
        }
        frame
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render_frame(&mut self, balls: &[Ball]) {
        self.frame = self.draw(balls);
        // Clear screen and home the cursor before each frame
        let result = write!(self.out, "\x1b[2J\x1b[H{}", self.frame).and_then(|_| self.out.flush());
        if let Err(e) = result {
            log::warn!("ASCII render failed: {e}");
        }
    }
}
