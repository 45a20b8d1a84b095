//! Display-list generation for the board and the entities on it

use glam::Vec2;

use super::{Blend, Color, DrawCommand, colors};
use crate::consts::CENTER_CIRCLE_RADIUS;
use crate::sim::field::{Field, Orientation};
use crate::sim::state::{GameState, Paddle, TrailPoint};

const MARKING_WIDTH: f32 = 2.0;
const CENTER_LINE_DASH: [f32; 2] = [5.0, 5.0];
const CENTER_CIRCLE_DASH: [f32; 2] = [3.0, 6.0];

/// Background and markings: clear, dashed center line, dashed center circle
pub fn board_commands(field: &Field) -> Vec<DrawCommand> {
    let center = field.center();
    // The line splits the two halves, so it runs along the primary axis
    let (from, to) = match field.orientation {
        Orientation::Horizontal => (Vec2::new(center.x, 0.0), Vec2::new(center.x, field.height)),
        Orientation::Vertical => (Vec2::new(0.0, center.y), Vec2::new(field.width, center.y)),
    };

    vec![
        DrawCommand::Clear {
            width: field.width,
            height: field.height,
        },
        DrawCommand::DashedLine {
            from,
            to,
            dash: CENTER_LINE_DASH,
            width: MARKING_WIDTH,
            color: colors::MARKINGS,
        },
        DrawCommand::StrokeCircle {
            center,
            radius: CENTER_CIRCLE_RADIUS,
            dash: CENTER_CIRCLE_DASH,
            width: MARKING_WIDTH,
            color: colors::MARKINGS,
        },
    ]
}

/// Trail, ball, then both paddles
pub fn entity_commands(state: &GameState) -> Vec<DrawCommand> {
    let capacity = state.tuning.trail_length;
    let mut commands = trail(&state.ball.trail, state.ball.radius, capacity);
    commands.reserve(3);

    commands.push(DrawCommand::FillCircle {
        center: state.ball.pos,
        radius: state.ball.radius,
        color: colors::BALL,
        blend: Blend::Normal,
    });
    commands.push(paddle(&state.player, colors::PLAYER));
    commands.push(paddle(&state.opponent, colors::OPPONENT));
    commands
}

/// Fading trail, newest point largest and most opaque
///
/// Fade is measured against the trail's full capacity so a fresh trail does
/// not flash at full length.
fn trail(points: &[TrailPoint], ball_radius: f32, capacity: usize) -> Vec<DrawCommand> {
    let capacity = capacity.max(1) as f32;
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let t = i as f32 / capacity;
            DrawCommand::FillCircle {
                center: point.pos,
                radius: ball_radius * (1.0 - t * 0.9),
                color: [1.0, 1.0, 1.0, 1.0 - t],
                blend: Blend::Additive,
            }
        })
        .collect()
}

fn paddle(paddle: &Paddle, color: Color) -> DrawCommand {
    DrawCommand::FillRect {
        pos: paddle.pos,
        size: paddle.size(),
        color,
    }
}
