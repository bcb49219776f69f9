//! Error types for the simulation

use thiserror::Error;

/// The main error type for simulation setup and sampling
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Memory sampler unavailable: {0}")]
    SamplerUnavailable(String),

    #[error("Range [{min}, {max}] contains no non-zero integer")]
    DegenerateRange { min: f32, max: f32 },

    #[error("Viewport {width}x{height} too small for ball radius {radius}")]
    ViewportTooSmall { radius: f32, width: f32, height: f32 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
