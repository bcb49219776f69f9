//! Ball-ball collision detection and response
//!
//! Response is deliberately approximate: colliding balls trade velocity
//! vectors wholesale, then drift apart along their new velocities. No mass,
//! no restitution, no normal/tangent split.

use glam::Vec2;

use super::state::{Ball, Viewport};
use super::tick::clamp_to_viewport;
use crate::config::CollisionRadius;
use crate::consts::{MAX_SEPARATION_STEPS, MIN_SETTLE_PASSES, SEPARATION_EPSILON};

/// Center distance at or below which `a` and `b` are touching
#[inline]
pub fn contact_distance(a: &Ball, b: &Ball, rule: CollisionRadius) -> f32 {
    match rule {
        CollisionRadius::SumOfRadii => a.radius + b.radius,
        CollisionRadius::FirstBall => 2.0 * a.radius,
    }
}

/// Collision predicate (touching counts)
#[inline]
pub fn pair_collides(a: &Ball, b: &Ball, rule: CollisionRadius) -> bool {
    a.distance_to(b) <= contact_distance(a, b, rule)
}

/// Exchange the two velocity vectors
#[inline]
pub fn swap_velocities(a: &mut Ball, b: &mut Ball) {
    std::mem::swap(&mut a.vel, &mut b.vel);
}

/// Step both balls along their own velocities until they stop touching.
///
/// Returns false if they are still touching after `MAX_SEPARATION_STEPS`
/// (equal velocities never separate).
pub fn separate_by_velocity(a: &mut Ball, b: &mut Ball, rule: CollisionRadius) -> bool {
    if a.vel == b.vel {
        return !pair_collides(a, b, rule);
    }
    for _ in 0..MAX_SEPARATION_STEPS {
        if !pair_collides(a, b, rule) {
            return true;
        }
        a.pos += a.vel;
        b.pos += b.vel;
    }
    !pair_collides(a, b, rule)
}

/// Move both balls apart along the center line so they just stop touching
pub fn push_apart(a: &mut Ball, b: &mut Ball, rule: CollisionRadius) {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };
    let penetration = contact_distance(a, b, rule) - dist + SEPARATION_EPSILON;
    if penetration <= 0.0 {
        return;
    }
    let half = normal * (penetration / 2.0);
    a.pos -= half;
    b.pos += half;
}

/// Mutable references to two distinct balls, `i < j`
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert!(i < j);
    let (left, right) = balls.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

/// Resolve every touching pair in index order; returns the number of collisions.
///
/// Resolution is order-dependent: a ball moved by an earlier pair may start or
/// stop touching a later one within the same call.
pub fn resolve_collisions(balls: &mut [Ball], rule: CollisionRadius) -> u32 {
    let mut collisions = 0;
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            let (a, b) = pair_mut(balls, i, j);
            if !pair_collides(a, b, rule) {
                continue;
            }
            collisions += 1;
            swap_velocities(a, b);
            if !separate_by_velocity(a, b, rule) {
                push_apart(a, b, rule);
            }
        }
    }
    collisions
}

/// Outcome of a settle pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Positional separation converged
    Separated,
    /// Separation did not converge; balls were laid out on the packing grid
    Repacked,
    /// More balls than the viewport can hold apart
    Stuck,
}

impl Settle {
    pub fn is_settled(self) -> bool {
        self != Settle::Stuck
    }
}

/// Separation passes allowed before falling back to a repack
fn settle_pass_limit(ball_count: usize) -> usize {
    MIN_SETTLE_PASSES + ball_count * ball_count.saturating_sub(1) / 2
}

fn any_touching(balls: &[Ball], rule: CollisionRadius) -> bool {
    balls
        .iter()
        .enumerate()
        .any(|(i, a)| balls[i + 1..].iter().any(|b| pair_collides(a, b, rule)))
}

/// Restore both containment and separation after collision resolution.
///
/// Alternates clamping into the viewport with positional separation until no
/// pair touches. The pass budget grows with the pair count; if it still runs
/// out, the balls are laid out on the packing grid. `Stuck` is only possible
/// when `packing_capacity` is below the ball count.
pub fn settle(balls: &mut [Ball], viewport: Viewport, rule: CollisionRadius) -> Settle {
    for ball in balls.iter_mut() {
        clamp_to_viewport(ball, viewport);
    }

    for _ in 0..settle_pass_limit(balls.len()) {
        let mut touching = false;
        for i in 0..balls.len() {
            for j in (i + 1)..balls.len() {
                let (a, b) = pair_mut(balls, i, j);
                if pair_collides(a, b, rule) {
                    push_apart(a, b, rule);
                    clamp_to_viewport(a, viewport);
                    clamp_to_viewport(b, viewport);
                    touching = true;
                }
            }
        }
        if !touching {
            return Settle::Separated;
        }
    }

    if !any_touching(balls, rule) {
        return Settle::Separated;
    }
    if repack(balls, viewport) {
        Settle::Repacked
    } else {
        Settle::Stuck
    }
}

/// Center spacing of the packing grid for balls up to `radius`
fn grid_spacing(radius: f32) -> f32 {
    2.0 * radius + SEPARATION_EPSILON
}

/// Grid columns and rows of ball centers that fit in the viewport
fn grid_shape(viewport: Viewport, radius: f32) -> (usize, usize) {
    let spacing = grid_spacing(radius);
    let fit = |extent: f32| {
        let span = extent - 2.0 * radius;
        if span < 0.0 {
            0
        } else {
            (span / spacing).floor() as usize + 1
        }
    };
    (fit(viewport.width), fit(viewport.height))
}

/// How many balls of up to `radius` the viewport holds without any touching
pub fn packing_capacity(viewport: Viewport, radius: f32) -> usize {
    let (cols, rows) = grid_shape(viewport, radius);
    cols * rows
}

/// Lay every ball out on the packing grid, keeping their rough row-major order.
///
/// Velocities are left alone. Returns false (and moves nothing) if the grid
/// has fewer slots than balls.
fn repack(balls: &mut [Ball], viewport: Viewport) -> bool {
    if balls.is_empty() {
        return true;
    }
    let radius = balls.iter().map(|b| b.radius).fold(0.0, f32::max);
    let (cols, rows) = grid_shape(viewport, radius);
    if cols * rows < balls.len() {
        return false;
    }
    let spacing = grid_spacing(radius);
    let used_rows = balls.len().div_ceil(cols);
    let margin = |extent: f32, slots: usize| {
        radius + (extent - 2.0 * radius - (slots - 1) as f32 * spacing) / 2.0
    };
    let origin = Vec2::new(
        margin(viewport.width, cols),
        margin(viewport.height, used_rows),
    );

    let mut order: Vec<usize> = (0..balls.len()).collect();
    order.sort_by(|&i, &j| balls[i].pos.y.total_cmp(&balls[j].pos.y));
    for (row, chunk) in order.chunks_mut(cols).enumerate() {
        chunk.sort_by(|&i, &j| balls[i].pos.x.total_cmp(&balls[j].pos.x));
        for (col, &index) in chunk.iter().enumerate() {
            let ball = &mut balls[index];
            ball.pos = origin + Vec2::new(col as f32, row as f32) * spacing;
            clamp_to_viewport(ball, viewport);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BallId;
    use proptest::prelude::*;

    fn ball(id: u32, x: f32, y: f32, dx: f32, dy: f32, radius: f32) -> Ball {
        Ball::new(BallId(id), Vec2::new(x, y), Vec2::new(dx, dy), radius)
    }

    #[test]
    fn test_contact_distance_rules() {
        let a = ball(0, 0.0, 0.0, 1.0, 1.0, 10.0);
        let b = ball(1, 0.0, 0.0, 1.0, 1.0, 20.0);
        assert_eq!(contact_distance(&a, &b, CollisionRadius::SumOfRadii), 30.0);
        assert_eq!(contact_distance(&a, &b, CollisionRadius::FirstBall), 20.0);
        assert_eq!(contact_distance(&b, &a, CollisionRadius::FirstBall), 40.0);
    }

    #[test]
    fn test_touching_counts_as_collision() {
        let a = ball(0, 100.0, 100.0, 1.0, 1.0, 10.0);
        let b = ball(1, 120.0, 100.0, 1.0, 1.0, 10.0);
        assert!(pair_collides(&a, &b, CollisionRadius::SumOfRadii));
        let c = ball(2, 120.5, 100.0, 1.0, 1.0, 10.0);
        assert!(!pair_collides(&a, &c, CollisionRadius::SumOfRadii));
    }

    #[test]
    fn test_head_on_collision_swaps_and_separates() {
        let mut balls = vec![
            ball(0, 100.0, 100.0, 3.0, 1.0, 10.0),
            ball(1, 115.0, 100.0, -2.0, -4.0, 10.0),
        ];
        let hits = resolve_collisions(&mut balls, CollisionRadius::SumOfRadii);
        assert_eq!(hits, 1);
        assert_eq!(balls[0].vel, Vec2::new(-2.0, -4.0));
        assert_eq!(balls[1].vel, Vec2::new(3.0, 1.0));
        assert!(balls[0].distance_to(&balls[1]) > 20.0);
    }

    #[test]
    fn test_equal_velocities_fall_back_to_push_apart() {
        let mut balls = vec![
            ball(0, 100.0, 100.0, 2.0, 2.0, 10.0),
            ball(1, 105.0, 100.0, 2.0, 2.0, 10.0),
        ];
        resolve_collisions(&mut balls, CollisionRadius::SumOfRadii);
        assert!(balls[0].distance_to(&balls[1]) > 20.0);
    }

    #[test]
    fn test_coincident_centers_push_apart() {
        let mut a = ball(0, 50.0, 50.0, 1.0, 1.0, 5.0);
        let mut b = ball(1, 50.0, 50.0, 1.0, 1.0, 5.0);
        push_apart(&mut a, &mut b, CollisionRadius::SumOfRadii);
        assert!(a.distance_to(&b) > 10.0);
        assert_eq!(a.pos.y, b.pos.y);
    }

    #[test]
    fn test_no_collision_leaves_balls_alone() {
        let mut balls = vec![
            ball(0, 100.0, 100.0, 3.0, 1.0, 10.0),
            ball(1, 300.0, 300.0, -2.0, -4.0, 10.0),
        ];
        let before = balls.clone();
        assert_eq!(resolve_collisions(&mut balls, CollisionRadius::SumOfRadii), 0);
        assert_eq!(balls, before);
    }

    #[test]
    fn test_settle_separates_pile_inside_viewport() {
        let viewport = Viewport::new(200.0, 200.0);
        let mut balls: Vec<Ball> = (0..4)
            .map(|i| ball(i, 100.0 + i as f32, 100.0, 1.0, -1.0, 10.0))
            .collect();
        assert_eq!(
            settle(&mut balls, viewport, CollisionRadius::SumOfRadii),
            Settle::Separated
        );
        for i in 0..balls.len() {
            assert!(viewport.contains(balls[i].pos, balls[i].radius));
            for j in (i + 1)..balls.len() {
                assert!(balls[i].distance_to(&balls[j]) > 20.0);
            }
        }
    }

    fn assert_separated(balls: &[Ball], viewport: Viewport, rule: CollisionRadius) {
        for (i, a) in balls.iter().enumerate() {
            assert!(viewport.contains(a.pos, a.radius), "{} escaped", a.id);
            for b in &balls[i + 1..] {
                assert!(!pair_collides(a, b, rule), "{} and {} touch", a.id, b.id);
            }
        }
    }

    #[test]
    fn test_packing_capacity() {
        // 680 x 480 of center room at 120.01 spacing: 6 columns, 4 rows
        assert_eq!(packing_capacity(Viewport::new(800.0, 600.0), 60.0), 24);
        assert_eq!(packing_capacity(Viewport::new(100.0, 100.0), 40.0), 1);
        assert_eq!(packing_capacity(Viewport::new(50.0, 100.0), 40.0), 0);
    }

    #[test]
    fn test_settle_full_grid_of_large_balls() {
        // As many 60 px balls as fit, all dropped on the same spot
        let viewport = Viewport::new(800.0, 600.0);
        let mut balls: Vec<Ball> = (0..24)
            .map(|i| ball(i, 400.0 + (i % 3) as f32, 300.0, 1.0, 1.0, 60.0))
            .collect();
        for rule in [CollisionRadius::SumOfRadii, CollisionRadius::FirstBall] {
            let outcome = settle(&mut balls, viewport, rule);
            assert!(outcome.is_settled(), "{outcome:?}");
            assert_separated(&balls, viewport, rule);
        }
    }

    #[test]
    fn test_repack_lays_out_grid() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut balls: Vec<Ball> = (0..16)
            .map(|i| ball(i, 50.0, 50.0, 2.0, -1.0, 10.0))
            .collect();
        assert!(repack(&mut balls, viewport));
        assert_separated(&balls, viewport, CollisionRadius::SumOfRadii);
        assert!(balls.iter().all(|b| b.vel == Vec2::new(2.0, -1.0)));
        // One more ball than slots
        balls.push(ball(16, 50.0, 50.0, 1.0, 1.0, 10.0));
        let before = balls.clone();
        assert!(!repack(&mut balls, viewport));
        assert_eq!(balls, before);
    }

    #[test]
    fn test_settle_reports_stuck_when_overcrowded() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut balls: Vec<Ball> = (0..3)
            .map(|i| ball(i, 50.0 + i as f32, 50.0, 1.0, 1.0, 40.0))
            .collect();
        assert_eq!(
            settle(&mut balls, viewport, CollisionRadius::SumOfRadii),
            Settle::Stuck
        );
        assert!(balls.iter().all(|b| viewport.contains(b.pos, b.radius)));
    }

    proptest! {
        #[test]
        fn swap_preserves_velocity_multiset(
            dx1 in -5i32..=5, dy1 in -5i32..=5, dx2 in -5i32..=5, dy2 in -5i32..=5,
        ) {
            let mut a = ball(0, 0.0, 0.0, dx1 as f32, dy1 as f32, 10.0);
            let mut b = ball(1, 5.0, 0.0, dx2 as f32, dy2 as f32, 10.0);
            swap_velocities(&mut a, &mut b);

            let mut before = vec![dx1, dy1, dx2, dy2];
            let mut after = vec![a.vel.x as i32, a.vel.y as i32, b.vel.x as i32, b.vel.y as i32];
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
            prop_assert_eq!(a.vel, Vec2::new(dx2 as f32, dy2 as f32));
            prop_assert_eq!(b.vel, Vec2::new(dx1 as f32, dy1 as f32));
        }
    }
}
