//! Deterministic simulation module
//!
//! All ball logic lives here. This module must stay pure and deterministic:
//! - One fixed step per tick, no wall-clock time
//! - Seeded RNG passed in by the caller
//! - Stable iteration order (by registry index)
//! - No rendering, scheduling or platform dependencies

pub mod collision;
pub mod interaction;
pub mod rng;
pub mod sizing;
pub mod state;
pub mod tick;

pub use collision::{
    Settle, packing_capacity, pair_collides, resolve_collisions, settle, swap_velocities,
};
pub use interaction::{ball_at, handle_click};
pub use rng::random_non_zero_int;
pub use sizing::{SizingPolicy, compute_radius};
pub use state::{Ball, BallId, BallRegistry, Viewport};
pub use tick::{TickReport, tick};
