//! Simulation configuration and variant presets
//!
//! Everything here is fixed when a session starts; nothing is reconfigurable
//! while the animation runs.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::sim::{Viewport, packing_capacity};

/// Which animation variant to reproduce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Radius sampled per ball at startup, then refreshed for all balls every 10 s
    #[default]
    Tracking,
    /// Radius sampled per ball at startup and never refreshed
    Snapshot,
    /// Fixed starting radius, refreshed uniformly from memory pressure
    Fixed,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Tracking => "tracking",
            Variant::Snapshot => "snapshot",
            Variant::Fixed => "fixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tracking" | "track" => Some(Variant::Tracking),
            "snapshot" | "snap" => Some(Variant::Snapshot),
            "fixed" => Some(Variant::Fixed),
            _ => None,
        }
    }
}

/// How balls get their radius at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InitialRadius {
    /// Independent memory reading per ball
    Sampled,
    /// Same radius for every ball
    Fixed(f32),
}

/// Distance at which two balls count as touching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionRadius {
    /// `r_i + r_j`
    #[default]
    SumOfRadii,
    /// `2 * r_i` using the lower-index ball only
    FirstBall,
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub viewport: Viewport,
    pub ball_count: usize,
    pub max_radius: u32,
    pub initial_radius: InitialRadius,
    /// Fast tick period (motion + collisions + render)
    pub refresh_interval_ms: u64,
    /// Slow tick period (radius refresh); `None` disables refreshing
    pub memory_update_interval_ms: Option<u64>,
    /// Velocity components are drawn from `[-max_speed, max_speed] \ {0}`
    pub max_speed: i32,
    /// Radius used when the memory sampler is unavailable
    pub fallback_radius: f32,
    pub collision_radius: CollisionRadius,
    /// RNG seed; `None` picks one at startup
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_variant(Variant::default())
    }
}

impl SimConfig {
    /// Build the preset for a variant
    pub fn from_variant(variant: Variant) -> Self {
        let base = Self {
            viewport: Viewport::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            ball_count: BALL_COUNT,
            max_radius: MAX_RADIUS,
            initial_radius: InitialRadius::Sampled,
            refresh_interval_ms: REFRESH_INTERVAL_MS,
            memory_update_interval_ms: Some(MEMORY_UPDATE_INTERVAL_MS),
            max_speed: MAX_SPEED,
            fallback_radius: FALLBACK_RADIUS,
            collision_radius: CollisionRadius::SumOfRadii,
            seed: None,
        };

        match variant {
            Variant::Tracking => base,
            Variant::Snapshot => Self {
                max_radius: 50,
                memory_update_interval_ms: None,
                ..base
            },
            Variant::Fixed => Self {
                max_radius: 60,
                initial_radius: InitialRadius::Fixed(20.0),
                ..base
            },
        }
    }

    /// Load a JSON config file; missing fields take the default preset's values
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn memory_update_interval(&self) -> Option<Duration> {
        self.memory_update_interval_ms.map(Duration::from_millis)
    }

    /// Reject configurations the correction loops cannot handle
    pub fn validate(&self) -> Result<()> {
        let Viewport { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "viewport must be positive, got {width}x{height}"
            )));
        }
        if self.max_radius == 0 {
            return Err(SimError::InvalidConfig("max_radius must be positive".into()));
        }

        // A ball wider than the viewport can never leave both walls at once
        let max_radius = self.max_radius as f32;
        if 2.0 * max_radius >= width.min(height) {
            return Err(SimError::ViewportTooSmall {
                radius: max_radius,
                width,
                height,
            });
        }
        // Every tick must be able to hold all balls apart at the largest radius
        if packing_capacity(self.viewport, max_radius) < self.ball_count {
            return Err(SimError::ViewportTooSmall {
                radius: max_radius,
                width,
                height,
            });
        }

        if let InitialRadius::Fixed(r) = self.initial_radius {
            check_radius("initial radius", r, max_radius)?;
        }
        check_radius("fallback radius", self.fallback_radius, max_radius)?;

        if self.max_speed < 1 {
            return Err(SimError::InvalidConfig(format!(
                "max_speed must be at least 1, got {}",
                self.max_speed
            )));
        }
        if self.refresh_interval_ms == 0 || self.memory_update_interval_ms == Some(0) {
            return Err(SimError::InvalidConfig(
                "tick periods must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn check_radius(what: &str, radius: f32, max_radius: f32) -> Result<()> {
    if radius > 0.0 && radius <= max_radius {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!(
            "{what} must be in (0, {max_radius}], got {radius}"
        )))
    }
}
