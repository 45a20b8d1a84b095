//! Collision detection and response
//!
//! Walls reflect the primary-axis velocity component. Paddles replace the
//! velocity outright with one whose angle depends on where the ball struck,
//! which is what lets the player aim.

use glam::Vec2;

use super::field::Field;
use super::state::{Ball, Paddle};
use crate::consts::*;

/// Outcome of a ball/paddle check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaddleContact {
    /// No overlap
    Clear,
    /// Still overlapping the paddle that was already bounced off
    Sustained,
    /// First frame of contact; the ball was redirected
    Hit {
        /// Normalized impact offset in [-1, 1]
        offset: f32,
        /// Departure angle off the goal axis (radians)
        angle: f32,
    },
}

impl PaddleContact {
    pub fn is_hit(&self) -> bool {
        matches!(self, PaddleContact::Hit { .. })
    }
}

/// Reflect a 1D position/velocity pair off the walls at `0` and `extent`
///
/// Returns true if a wall was touched. The position is clamped to exact
/// tangency and the velocity pointed back into the field.
#[inline]
pub fn reflect_off_walls(pos: &mut f32, vel: &mut f32, radius: f32, extent: f32) -> bool {
    if *pos + radius >= extent {
        *pos = extent - radius;
        *vel = -vel.abs();
        true
    } else if *pos - radius <= 0.0 {
        *pos = radius;
        *vel = vel.abs();
        true
    } else {
        false
    }
}

/// Bounce the ball off the primary-axis walls
pub fn resolve_walls(ball: &mut Ball, field: &Field) -> bool {
    let axis = field.primary_axis();
    let mut pos = axis.of(ball.pos);
    let mut vel = axis.of(ball.vel);

    let hit = reflect_off_walls(&mut pos, &mut vel, ball.radius, field.primary_extent());
    if hit {
        axis.set(&mut ball.pos, pos);
        axis.set(&mut ball.vel, vel);
    }
    hit
}

/// Circle vs rectangle via the nearest point on the rectangle
pub fn overlaps(ball: &Ball, paddle: &Paddle) -> bool {
    let nearest = ball.pos.clamp(paddle.pos, paddle.pos + paddle.size());
    ball.pos.distance_squared(nearest) <= ball.radius * ball.radius
}

/// Where along the paddle the ball struck: -1 at one end, 0 at the center, +1 at the other
pub fn impact_offset(ball: &Ball, paddle: &Paddle, field: &Field) -> f32 {
    let axis = field.primary_axis();
    let half = paddle.length(field) / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((axis.of(ball.pos) - axis.of(paddle.center())) / half).clamp(-1.0, 1.0)
}

/// Departure angle for a normalized impact offset, bounded to +/-60 degrees
#[inline]
pub fn bounce_angle(offset: f32) -> f32 {
    offset.clamp(-1.0, 1.0) * MAX_BOUNCE_ANGLE
}

/// Velocity leaving `paddle` at `angle`, keeping `speed`
pub fn bounce_velocity(field: &Field, paddle: &Paddle, angle: f32, speed: f32) -> Vec2 {
    let away = -field.goal_direction(paddle.side);
    field.compose(away * angle.cos() * speed, angle.sin() * speed)
}

/// Check the ball against one paddle and bounce it on first contact
///
/// `ball.last_hit` makes a multi-frame overlap count once; it is released as
/// soon as the ball stops overlapping that paddle.
pub fn resolve_paddle(ball: &mut Ball, paddle: &Paddle, field: &Field) -> PaddleContact {
    if !overlaps(ball, paddle) {
        if ball.last_hit == Some(paddle.side) {
            ball.last_hit = None;
        }
        return PaddleContact::Clear;
    }

    if ball.last_hit == Some(paddle.side) {
        return PaddleContact::Sustained;
    }
    ball.last_hit = Some(paddle.side);

    let offset = impact_offset(ball, paddle, field);
    let angle = bounce_angle(offset);
    let speed = match ball.speed() {
        s if s > 0.0 => s,
        _ => FALLBACK_BOUNCE_SPEED,
    };
    ball.vel = bounce_velocity(field, paddle, angle, speed);

    // Flush against the face, plus a little clearance
    let face = paddle.face(field);
    let clearance = ball.radius + PADDLE_SEPARATION;
    let goal = if field.goal_direction(paddle.side) < 0.0 {
        face + clearance
    } else {
        face - clearance
    };
    field.goal_axis().set(&mut ball.pos, goal);

    PaddleContact::Hit { offset, angle }
}
