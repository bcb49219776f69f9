//! Render adapters
//!
//! The simulation never draws anything itself. After each tick the session
//! hands the registry to a `Renderer`, which must only touch its own surface.

pub mod ascii;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::sim::Ball;

pub use ascii::AsciiRenderer;
pub use json::JsonLinesRenderer;

/// Draws the current ball state to some visual surface
pub trait Renderer {
    /// Draw one frame; calling twice with the same balls draws the same frame
    fn render_frame(&mut self, balls: &[Ball]);
}

impl<T: Renderer + ?Sized> Renderer for Box<T> {
    fn render_frame(&mut self, balls: &[Ball]) {
        (**self).render_frame(balls)
    }
}

/// Discards every frame (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_frame(&mut self, _balls: &[Ball]) {}
}

/// One rendered frame, serializable for hosts that draw elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Frames rendered before this one
    pub frame: u64,
    pub balls: Vec<Ball>,
}
