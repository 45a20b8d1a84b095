//! AI opponent: predict where the ball will cross the paddle's line and go there
//!
//! The AI sees the ball perfectly but moves at a bounded speed. Prediction
//! steps the ball forward one whole velocity at a time, bouncing off the walls
//! with the same rule the real ball uses and ignoring both paddles.

use super::collision::reflect_off_walls;
use super::field::Field;
use super::state::{Ball, Paddle};
use crate::consts::AI_INTERCEPT_GAP;
use crate::tuning::Tuning;

/// Where and when the ball reaches the intercept line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Primary-axis coordinate of the ball center at the crossing
    pub primary: f32,
    /// Frames until the crossing (or the budget, if it was exhausted)
    pub steps: u32,
}

/// One frame of AI movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiMove {
    pub prediction: Prediction,
    /// Paddle corner coordinate the AI is heading for
    pub target: f32,
    /// Speed used this frame
    pub speed: f32,
}

/// Goal-axis coordinate where the ball center meets `paddle`
pub fn intercept_line(paddle: &Paddle, ball: &Ball, field: &Field) -> f32 {
    let gap = AI_INTERCEPT_GAP + ball.radius;
    if field.goal_direction(paddle.side) < 0.0 {
        paddle.face(field) + gap
    } else {
        paddle.face(field) - gap
    }
}

/// Forward-simulate the ball until it crosses `intercept` on the goal axis
pub fn predict_intercept(ball: &Ball, field: &Field, intercept: f32, max_steps: u32) -> Prediction {
    let primary = field.primary_axis();
    let goal = field.goal_axis();

    let mut p = primary.of(ball.pos);
    let mut vp = primary.of(ball.vel);
    let mut g = goal.of(ball.pos);
    let vg = goal.of(ball.vel);

    if vg == 0.0 {
        return Prediction { primary: p, steps: 1 };
    }

    let extent = field.primary_extent();
    // Direction is fixed by where the line is, not where the ball is heading
    let ahead = intercept >= g;

    for step in 1..=max_steps {
        p += vp;
        g += vg;
        reflect_off_walls(&mut p, &mut vp, ball.radius, extent);
        if (ahead && g >= intercept) || (!ahead && g <= intercept) {
            return Prediction { primary: p, steps: step };
        }
    }

    Prediction {
        primary: p,
        steps: max_steps,
    }
}

/// Move the opponent paddle one frame toward its predicted intercept
pub fn drive(paddle: &mut Paddle, ball: &Ball, field: &Field, tuning: &Tuning) -> AiMove {
    let line = intercept_line(paddle, ball, field);
    let prediction = predict_intercept(ball, field, line, tuning.ai_prediction_steps);

    let target = prediction.primary - paddle.length(field) / 2.0;
    let current = paddle.primary_position(field);
    let distance = target - current;

    let frames = prediction.steps.max(1) as f32;
    let speed = (distance.abs() / frames * tuning.ai_margin_factor)
        .min(tuning.ai_max_speed)
        .max(tuning.ai_min_speed);

    let next = if distance.abs() <= speed {
        target
    } else {
        current + distance.signum() * speed
    };
    paddle.set_primary_position(field, next);

    AiMove {
        prediction,
        target,
        speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::Side;
    use glam::Vec2;

    fn desktop() -> Field {
        Field::for_viewport(1200.0, 600.0)
    }

    #[test]
    fn test_straight_shot_predicts_current_line() {
        let field = desktop();
        let paddle = Paddle::new(Side::Opponent, &field);
        let ball = Ball::new(Vec2::new(600.0, 200.0), Vec2::new(10.0, 0.0), 12.0);

        let line = intercept_line(&paddle, &ball, &field);
        assert!((line - (paddle.face(&field) - 13.0)).abs() < 1e-4);

        let prediction = predict_intercept(&ball, &field, line, 2000);
        assert_eq!(prediction.primary, 200.0);
        assert_eq!(prediction.steps, ((line - 600.0) / 10.0).ceil() as u32);
    }

    #[test]
    fn test_prediction_bounces_off_walls() {
        let field = desktop();
        // Heading down-right steeply: must bounce off the bottom wall on the way
        let ball = Ball::new(Vec2::new(600.0, 500.0), Vec2::new(10.0, 10.0), 12.0);
        let prediction = predict_intercept(&ball, &field, 1100.0, 2000);

        assert_eq!(prediction.steps, 50);
        assert!(prediction.primary >= 12.0 && prediction.primary <= 588.0);
        assert!(prediction.primary < 500.0);
    }

    #[test]
    fn test_zero_goal_velocity_targets_ball() {
        let field = desktop();
        let ball = Ball::new(Vec2::new(600.0, 420.0), Vec2::new(0.0, 5.0), 12.0);
        let prediction = predict_intercept(&ball, &field, 1100.0, 2000);
        assert_eq!(prediction, Prediction { primary: 420.0, steps: 1 });
    }

    #[test]
    fn test_budget_caps_prediction() {
        let field = desktop();
        // Moving away from the intercept line never crosses it
        let ball = Ball::new(Vec2::new(600.0, 300.0), Vec2::new(-1.0, 3.0), 12.0);
        let prediction = predict_intercept(&ball, &field, 1100.0, 2000);
        assert_eq!(prediction.steps, 2000);
    }

    #[test]
    fn test_drive_respects_speed_bounds() {
        let field = desktop();
        let tuning = Tuning::default();
        let mut paddle = Paddle::new(Side::Opponent, &field);
        paddle.center_on(&field, 60.0);
        let start = paddle.primary_position(&field);

        // Ball about to arrive at the far wall side: AI can only move max speed
        let ball = Ball::new(Vec2::new(1150.0, 560.0), Vec2::new(5.0, 0.0), 12.0);
        let step = drive(&mut paddle, &ball, &field, &tuning);
        assert_eq!(step.speed, tuning.ai_max_speed);
        assert!((paddle.primary_position(&field) - (start + 30.0)).abs() < 1e-4);
    }

    #[test]
    fn test_drive_snaps_when_close() {
        let field = desktop();
        let tuning = Tuning::default();
        let mut paddle = Paddle::new(Side::Opponent, &field);
        let center = paddle.center().y;

        let ball = Ball::new(Vec2::new(600.0, center + 2.0), Vec2::new(7.0, 0.0), 12.0);
        let step = drive(&mut paddle, &ball, &field, &tuning);
        assert_eq!(step.speed, tuning.ai_min_speed);
        assert!((paddle.center().y - (center + 2.0)).abs() < 1e-4);
    }

    #[test]
    fn test_drive_stays_inside_field() {
        let field = Field::for_viewport(400.0, 700.0);
        let tuning = Tuning::default();
        let mut paddle = Paddle::new(Side::Opponent, &field);

        let ball = Ball::new(Vec2::new(395.0, 100.0), Vec2::new(0.0, -4.0), 8.0);
        for _ in 0..100 {
            drive(&mut paddle, &ball, &field, &tuning);
            assert!(paddle.is_inside(&field));
        }
        assert!((paddle.pos.x + paddle.width - 400.0).abs() < 1e-3);
    }
}
