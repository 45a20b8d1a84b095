//! Score and level progression

use glam::Vec2;

use super::state::{Ball, Paddle};
use crate::consts::POINTS_PER_LEVEL;

/// Level reached at a given score
#[inline]
pub fn level_for_score(score: u32) -> u32 {
    1 + score / POINTS_PER_LEVEL
}

/// Result of crediting one point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointAward {
    pub score: u32,
    /// New level, if this point crossed a level boundary
    pub level_up: Option<u32>,
}

/// Credit `paddle` with a point; every fifth point also speeds the ball up
pub fn award_point(paddle: &mut Paddle, ball: &mut Ball, increment: f32) -> PointAward {
    paddle.score = paddle.score.saturating_add(1);
    let level = level_for_score(paddle.score);

    let level_up = if level > paddle.level {
        paddle.level = level;
        ball.vel = escalate(ball.vel, increment);
        log::debug!("Level up: {} (score {}, speed {:.2})", level, paddle.score, ball.speed());
        Some(level)
    } else {
        None
    };

    PointAward {
        score: paddle.score,
        level_up,
    }
}

/// Grow each velocity component's magnitude by `increment`, keeping its sign
///
/// A zero component grows negative.
pub fn escalate(vel: Vec2, increment: f32) -> Vec2 {
    let grow = |c: f32| if c > 0.0 { c + increment } else { c - increment };
    Vec2::new(grow(vel.x), grow(vel.y))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::sim::field::{Field, Side};
    use proptest::prelude::*;

    proptest! {
        /// level = 1 + floor(score / 5) after any number of points
        #[test]
        fn prop_level_tracks_score(points in 0u32..200) {
            let field = Field::for_viewport(1200.0, 600.0);
            let mut paddle = Paddle::new(Side::Player, &field);
            let mut ball = Ball::new(field.center(), Vec2::new(7.0, -7.0), 12.0);
            for _ in 0..points {
                award_point(&mut paddle, &mut ball, 2.0);
                prop_assert_eq!(paddle.level, 1 + paddle.score / 5);
            }
            prop_assert_eq!(paddle.score, points);
        }

        /// Escalation never slows the ball
        #[test]
        fn prop_escalate_never_slows(vx in -50.0f32..50.0, vy in -50.0f32..50.0, inc in 0.0f32..5.0) {
            let vel = Vec2::new(vx, vy);
            prop_assert!(escalate(vel, inc).length() >= vel.length() - 1e-4);
        }
    }
}
