//! Ball entities and the registry that owns them

use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rng::random_non_zero_int;
use super::sizing::SizingPolicy;
use crate::config::{InitialRadius, SimConfig};
use crate::error::Result;
use crate::memory::MemorySampler;
use crate::palette::{Color, PALETTE};

/// Stable ball identifier, displayed as `n0`, `n1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallId(pub u32);

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Rectangular area the balls live in, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// True if a circle at `pos` lies fully inside (touching the wall counts)
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        pos.x >= radius
            && pos.x <= self.width - radius
            && pos.y >= radius
            && pos.y <= self.height - radius
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Ball {
    pub fn new(id: BallId, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            color: PALETTE[0],
        }
    }

    /// Distance between the two centers
    #[inline]
    pub fn distance_to(&self, other: &Ball) -> f32 {
        self.pos.distance(other.pos)
    }
}

/// The fixed set of balls in a session.
///
/// Populated once; balls are never added or removed afterwards, only moved,
/// resized and recolored. Iteration order is index order and doubles as the
/// tie-break order for clicks and collisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallRegistry {
    balls: Vec<Ball>,
}

impl BallRegistry {
    /// Wrap an existing set of balls (hosts restoring a snapshot, tests)
    pub fn from_balls(balls: Vec<Ball>) -> Self {
        Self { balls }
    }

    /// Create `config.ball_count` balls at random positions with random velocities.
    ///
    /// Placement does not check for overlap; the first ticks sort that out.
    pub fn spawn<R: Rng + ?Sized>(
        config: &SimConfig,
        sizing: &mut SizingPolicy,
        sampler: &mut dyn MemorySampler,
        rng: &mut R,
    ) -> Result<Self> {
        let viewport = config.viewport;
        let max_speed = config.max_speed as f32;
        let mut balls = Vec::with_capacity(config.ball_count);

        for i in 0..config.ball_count {
            let radius = match config.initial_radius {
                InitialRadius::Sampled => sizing.radius_from(sampler),
                InitialRadius::Fixed(r) => r,
            };
            let x = random_non_zero_int(rng, radius, viewport.width - radius)?;
            let y = random_non_zero_int(rng, radius, viewport.height - radius)?;
            let dx = random_non_zero_int(rng, -max_speed, max_speed)?;
            let dy = random_non_zero_int(rng, -max_speed, max_speed)?;

            balls.push(Ball::new(
                BallId(i as u32),
                Vec2::new(x as f32, y as f32),
                Vec2::new(dx as f32, dy as f32),
                radius,
            ));
        }

        log::debug!("Spawned {} balls in {}x{}", balls.len(), viewport.width, viewport.height);
        Ok(Self { balls })
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter()
    }

    pub fn as_slice(&self) -> &[Ball] {
        &self.balls
    }

    /// Mutable access to the balls; the slice length cannot change
    pub fn as_mut_slice(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    pub fn get(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Overwrite every ball's radius, pulling each back inside the viewport
    pub fn set_radius_all(&mut self, radius: f32, viewport: Viewport) {
        for ball in &mut self.balls {
            ball.radius = radius;
            super::tick::clamp_to_viewport(ball, viewport);
        }
    }
}
