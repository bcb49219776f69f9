//! JSON-lines renderer: one `FrameSnapshot` per line

use std::io::Write;

use super::{FrameSnapshot, Renderer};
use crate::sim::Ball;

pub struct JsonLinesRenderer<W: Write> {
    out: W,
    frames: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Frames written so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn render_frame(&mut self, balls: &[Ball]) {
        let snapshot = FrameSnapshot {
            frame: self.frames,
            balls: balls.to_vec(),
        };
        let result = serde_json::to_writer(&mut self.out, &snapshot)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out));
        match result {
            Ok(()) => self.frames += 1,
            Err(e) => log::warn!("JSON render failed: {e}"),
        }
    }
}
