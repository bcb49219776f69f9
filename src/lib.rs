//! Bouncing Balls - colored balls bouncing inside a rectangular viewport
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, wall containment, collisions, clicks)
//! - `session`: Running/Paused state machine driving the periodic tasks
//! - `scheduler`: Virtual-clock periodic task scheduler
//! - `render`: Render adapters (ASCII grid, JSON lines)
//! - `memory`: Memory-pressure sampling that drives ball radius
//! - `config`: Variant presets and JSON configuration

pub mod config;
pub mod error;
pub mod memory;
pub mod palette;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod sim;

pub use config::{CollisionRadius, InitialRadius, SimConfig, Variant};
pub use error::{Result, SimError};
pub use memory::{MemorySample, MemorySampler};
pub use palette::{Color, PALETTE};
pub use render::Renderer;
pub use session::{InputEvent, Key, RunState, Session};

/// Reference configuration constants
pub mod consts {
    /// Fast tick period: motion, collisions, render
    pub const REFRESH_INTERVAL_MS: u64 = 30;
    /// Slow tick period: radius refresh from memory pressure
    pub const MEMORY_UPDATE_INTERVAL_MS: u64 = 10_000;

    /// Maximum ball speed per axis (pixels per tick)
    pub const MAX_SPEED: i32 = 5;
    /// Number of balls in the registry
    pub const BALL_COUNT: usize = 20;
    /// Largest radius the sizing policy can produce
    pub const MAX_RADIUS: u32 = 40;
    /// Radius used when memory sampling is unavailable
    pub const FALLBACK_RADIUS: f32 = 10.0;
    /// Smallest radius ever applied to a ball
    pub const MIN_RADIUS: f32 = 1.0;

    /// Default viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// A click within this multiple of a ball's radius hits the ball
    pub const HIT_RADIUS_FACTOR: f32 = 1.3;

    /// Cap on wall escape-correction steps per axis
    pub const MAX_CORRECTION_STEPS: u32 = 4096;
    /// Cap on velocity-driven separation steps per colliding pair
    pub const MAX_SEPARATION_STEPS: u32 = 256;
    /// Settle passes allowed on top of one per touching-capable pair
    pub const MIN_SETTLE_PASSES: usize = 64;
    /// Extra gap left between balls after positional separation
    pub const SEPARATION_EPSILON: f32 = 0.01;

    /// Maximum firings of one periodic task per scheduler advance
    pub const MAX_CATCH_UP: u32 = 8;
}
