//! Fixed timestep simulation tick
//!
//! One tick: wall containment per ball, escape correction, integration,
//! then pairwise collision resolution and a settle pass.

use super::collision::{Settle, resolve_collisions, settle};
use super::state::{Ball, BallRegistry, Viewport};
use crate::config::CollisionRadius;
use crate::consts::MAX_CORRECTION_STEPS;

/// What happened during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Velocity components turned back by a wall
    pub wall_bounces: u32,
    /// Escape-correction steps taken to get balls off a wall
    pub corrections: u32,
    /// Touching pairs found in the collision pass
    pub collisions: u32,
    /// False if the settle pass gave up with balls still touching
    pub settled: bool,
    /// The settle pass fell back to laying balls out on the packing grid
    pub repacked: bool,
}

/// Advance every ball by one tick
pub fn tick(registry: &mut BallRegistry, viewport: Viewport, rule: CollisionRadius) -> TickReport {
    let mut report = TickReport::default();
    let balls = registry.as_mut_slice();

    for ball in balls.iter_mut() {
        let (bounced_x, steps_x) =
            contain_axis(&mut ball.pos.x, &mut ball.vel.x, ball.radius, viewport.width);
        let (bounced_y, steps_y) =
            contain_axis(&mut ball.pos.y, &mut ball.vel.y, ball.radius, viewport.height);
        report.wall_bounces += bounced_x as u32 + bounced_y as u32;
        report.corrections += steps_x + steps_y;

        ball.pos += ball.vel;
        clamp_to_viewport(ball, viewport);
    }

    report.collisions = resolve_collisions(balls, rule);
    match settle(balls, viewport, rule) {
        Settle::Separated => report.settled = true,
        Settle::Repacked => {
            log::debug!("Settle pass repacked {} balls", balls.len());
            report.settled = true;
            report.repacked = true;
        }
        Settle::Stuck => {
            log::warn!("{} balls do not fit apart in the viewport", balls.len());
        }
    }

    log::trace!(
        "tick: {} bounces, {} corrections, {} collisions",
        report.wall_bounces,
        report.corrections,
        report.collisions
    );
    report
}

/// Wall test and escape correction for one axis, before integration.
///
/// A ball touching or past a wall gets its velocity pointed back inside, then
/// is stepped along that velocity until it no longer touches either wall.
fn contain_axis(pos: &mut f32, vel: &mut f32, radius: f32, extent: f32) -> (bool, u32) {
    let touches_low = |p: f32| p - radius <= 0.0;
    let touches_high = |p: f32| p + radius >= extent;

    let bounced = if touches_high(*pos) {
        *vel = -vel.abs();
        true
    } else if touches_low(*pos) {
        *vel = vel.abs();
        true
    } else {
        false
    };

    let mut steps = 0;
    while (touches_low(*pos) || touches_high(*pos)) && steps < MAX_CORRECTION_STEPS {
        *pos += *vel;
        steps += 1;
    }
    (bounced, steps)
}

/// Pull a ball back inside the viewport, pointing its velocity inward on any
/// axis that had to be clamped
pub fn clamp_to_viewport(ball: &mut Ball, viewport: Viewport) {
    clamp_axis(&mut ball.pos.x, &mut ball.vel.x, ball.radius, viewport.width);
    clamp_axis(&mut ball.pos.y, &mut ball.vel.y, ball.radius, viewport.height);
}

fn clamp_axis(pos: &mut f32, vel: &mut f32, radius: f32, extent: f32) {
    let lo = radius;
    let hi = (extent - radius).max(lo);
    if *pos < lo {
        *pos = lo;
        *vel = vel.abs();
    } else if *pos > hi {
        *pos = hi;
        *vel = -vel.abs();
    }
}
