//! Click-to-recolor

use glam::Vec2;
use rand::Rng;

use super::state::{Ball, BallId, BallRegistry};
use crate::consts::HIT_RADIUS_FACTOR;
use crate::palette::shift_color;

/// Index of the first ball (in index order) whose hit circle contains `point`.
///
/// Not the nearest ball: where two hit circles overlap, the lower index wins.
pub fn ball_at(balls: &[Ball], point: Vec2) -> Option<usize> {
    balls
        .iter()
        .position(|b| b.pos.distance(point) <= HIT_RADIUS_FACTOR * b.radius)
}

/// Recolor the ball under `point`, if any. At most one ball changes per click.
pub fn handle_click<R: Rng + ?Sized>(
    registry: &mut BallRegistry,
    point: Vec2,
    rng: &mut R,
) -> Option<BallId> {
    let balls = registry.as_mut_slice();
    let index = ball_at(balls, point)?;
    let ball = &mut balls[index];
    ball.color = shift_color(ball.color, rng);
    log::debug!("Clicked {} at ({}, {}) -> {}", ball.id, point.x, point.y, ball.color);
    Some(ball.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn registry() -> BallRegistry {
        BallRegistry::from_balls(vec![
            Ball::new(BallId(0), Vec2::new(100.0, 100.0), Vec2::ONE, 20.0),
            Ball::new(BallId(1), Vec2::new(200.0, 200.0), Vec2::ONE, 20.0),
        ])
    }

    #[test]
    fn test_click_inside_recolors_only_that_ball() {
        let mut registry = registry();
        let mut rng = Pcg32::seed_from_u64(5);
        let hit = handle_click(&mut registry, Vec2::new(105.0, 100.0), &mut rng);
        assert_eq!(hit, Some(BallId(0)));
        assert_ne!(registry.as_slice()[0].color, PALETTE[0]);
        assert_eq!(registry.as_slice()[1].color, PALETTE[0]);
    }

    #[test]
    fn test_click_on_empty_space_recolors_nothing() {
        let mut registry = registry();
        let before = registry.as_slice().to_vec();
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(handle_click(&mut registry, Vec2::new(500.0, 500.0), &mut rng), None);
        assert_eq!(registry.as_slice(), &before[..]);
    }

    #[test]
    fn test_hit_radius_extends_past_ball_edge() {
        let balls = registry();
        // 25 px from center: outside the 20 px ball, inside the 26 px hit circle
        assert_eq!(ball_at(balls.as_slice(), Vec2::new(125.0, 100.0)), Some(0));
        assert_eq!(ball_at(balls.as_slice(), Vec2::new(127.0, 100.0)), None);
    }

    #[test]
    fn test_overlapping_hit_circles_pick_lower_index() {
        let balls = vec![
            Ball::new(BallId(0), Vec2::new(100.0, 100.0), Vec2::ONE, 20.0),
            Ball::new(BallId(1), Vec2::new(130.0, 100.0), Vec2::ONE, 20.0),
        ];
        // Closer to ball 1, but inside ball 0's hit circle too
        assert_eq!(ball_at(&balls, Vec2::new(124.0, 100.0)), Some(0));
    }
}
