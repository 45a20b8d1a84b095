//! Serve/reset: recenter the ball and relaunch it

use rand::Rng;

use super::field::{Field, Side};
use super::state::Ball;
use crate::tuning::ServeTarget;

/// Smallest departure angle off the goal axis (15 degrees)
pub const MIN_SERVE_ANGLE: f32 = std::f32::consts::PI / 12.0;
/// Largest departure angle off the goal axis (45 degrees)
pub const MAX_SERVE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

/// Side the next serve heads toward
pub fn serve_target(policy: ServeTarget, conceding: Side) -> Side {
    match policy {
        ServeTarget::Player => Side::Player,
        ServeTarget::Conceder => conceding,
    }
}

/// Put the ball at the field center heading for `toward`'s goal at `speed`
///
/// The perpendicular component is randomized; the trail and paddle gating
/// are cleared so nothing carries over the teleport.
pub fn serve<R: Rng + ?Sized>(ball: &mut Ball, field: &Field, speed: f32, toward: Side, rng: &mut R) {
    let angle = rng.random_range(MIN_SERVE_ANGLE..=MAX_SERVE_ANGLE);
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

    ball.pos = field.center();
    ball.vel = field.compose(
        field.goal_direction(toward) * angle.cos() * speed,
        sign * angle.sin() * speed,
    );
    ball.last_hit = None;
    ball.clear_trail();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_serve_recenters_with_base_speed() {
        let field = Field::for_viewport(1200.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ball = Ball::new(Vec2::new(5.0, 5.0), Vec2::new(-3.0, 1.0), 12.0);
        ball.last_hit = Some(Side::Player);
        ball.record_trail(12);

        serve(&mut ball, &field, 14.0, Side::Opponent, &mut rng);

        assert_eq!(ball.pos, field.center());
        assert!((ball.speed() - 14.0).abs() < 1e-4);
        assert!(ball.vel.x > 0.0);
        assert!(ball.last_hit.is_none());
        assert!(ball.trail.is_empty());
    }

    #[test]
    fn test_serve_angle_stays_in_range() {
        let field = Field::for_viewport(400.0, 700.0);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ball = Ball::new(Vec2::ZERO, Vec2::ZERO, 8.0);

        for _ in 0..200 {
            serve(&mut ball, &field, 10.0, Side::Player, &mut rng);
            // Vertical play: goal axis is Y, player goal at the bottom
            assert!(ball.vel.y > 0.0);
            let angle = (ball.vel.x.abs() / ball.vel.y).atan();
            assert!(angle >= MIN_SERVE_ANGLE - 1e-4 && angle <= MAX_SERVE_ANGLE + 1e-4);
        }
    }

    #[test]
    fn test_serve_target_policy() {
        assert_eq!(serve_target(ServeTarget::Player, Side::Opponent), Side::Player);
        assert_eq!(serve_target(ServeTarget::Player, Side::Player), Side::Player);
        assert_eq!(serve_target(ServeTarget::Conceder, Side::Opponent), Side::Opponent);
    }
}
