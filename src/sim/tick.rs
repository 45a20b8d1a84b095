//! One simulation frame
//!
//! Order within a frame is fixed:
//! pointer -> ball step -> goal check -> trail -> walls -> player paddle -> AI -> AI paddle

use glam::Vec2;

use super::collision::{self, PaddleContact};
use super::field::{Field, Side};
use super::state::{Ball, GameEvent, GameState};
use super::{ai, scoring};

/// Input sampled for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Latest pointer position, field-local
    pub pointer: Option<Vec2>,
}

/// Whether the loop should keep going after this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    GameOver,
}

/// Ball's leading edge has reached `side`'s goal line
pub fn reached_goal(ball: &Ball, field: &Field, side: Side) -> bool {
    let g = field.goal_axis().of(ball.pos);
    let line = field.goal_line(side);
    if field.goal_direction(side) < 0.0 {
        g - ball.radius <= line
    } else {
        g + ball.radius >= line
    }
}

/// Advance the game by one frame
///
/// A game that is already over is left untouched.
pub fn tick(state: &mut GameState, input: &TickInput) -> TickOutcome {
    if state.match_state.game_over {
        return TickOutcome::GameOver;
    }

    let field = state.field;

    if let Some(pointer) = input.pointer {
        state.player.center_on(&field, field.primary_axis().of(pointer));
    }

    state.ball.step();

    // Goal lines
    if reached_goal(&state.ball, &field, Side::Player) {
        let last = state.match_state.lose_life();
        let lives = state.match_state.lives;
        state.events.push(GameEvent::LifeLost { lives });
        if last {
            let score = state.player.score;
            log::info!("Game over: epoch {} score {}", state.match_state.epoch, score);
            state.events.push(GameEvent::GameOver { score });
            state.time_ticks += 1;
            return TickOutcome::GameOver;
        }
        log::debug!("Life lost, {} remaining", lives);
        state.reset_ball(Side::Player);
    } else if reached_goal(&state.ball, &field, Side::Opponent) {
        state.events.push(GameEvent::RallyConceded(Side::Opponent));
        state.reset_ball(Side::Opponent);
    }

    let trail_length = state.tuning.trail_length;
    state.ball.record_trail(trail_length);

    if collision::resolve_walls(&mut state.ball, &field) {
        state.events.push(GameEvent::WallHit);
    }

    if let PaddleContact::Hit { .. } = collision::resolve_paddle(&mut state.ball, &state.player, &field) {
        state.events.push(GameEvent::PaddleHit(Side::Player));
        let award = scoring::award_point(
            &mut state.player,
            &mut state.ball,
            state.tuning.level_speed_increment,
        );
        state.events.push(GameEvent::ScoreChanged {
            side: Side::Player,
            score: award.score,
        });
        if let Some(level) = award.level_up {
            state.match_state.base_speed = state.ball.speed();
            state.events.push(GameEvent::LevelChanged {
                side: Side::Player,
                level,
            });
        }
    }

    let tuning = state.tuning;
    ai::drive(&mut state.opponent, &state.ball, &field, &tuning);

    if collision::resolve_paddle(&mut state.ball, &state.opponent, &field).is_hit() {
        state.events.push(GameEvent::PaddleHit(Side::Opponent));
    }

    state.time_ticks += 1;
    TickOutcome::Running
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn desktop() -> Field {
        Field::for_viewport(1200.0, 600.0)
    }

    fn new_state() -> GameState {
        GameState::new(desktop(), Tuning::default(), 1, 99)
    }

    #[test]
    fn test_pointer_centers_player_paddle() {
        let mut state = new_state();
        let input = TickInput {
            pointer: Some(Vec2::new(40.0, 150.0)),
        };
        tick(&mut state, &input);
        assert!((state.player.center().y - 150.0).abs() < 1e-3);

        // Far outside the field still clamps
        let input = TickInput {
            pointer: Some(Vec2::new(40.0, -900.0)),
        };
        tick(&mut state, &input);
        assert_eq!(state.player.pos.y, 0.0);
    }

    #[test]
    fn test_last_life_ends_game_and_freezes_state() {
        let mut state = new_state();
        state.match_state.lives = 1;
        state.ball.pos = Vec2::new(15.0, 60.0);
        state.ball.vel = Vec2::new(-7.0, 0.0);

        assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::GameOver);
        assert!(state.match_state.game_over);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::LifeLost { lives: 0 }, GameEvent::GameOver { score: 0 }]
        );

        let ball = state.ball.clone();
        let player = state.player.clone();
        let opponent = state.opponent.clone();
        let ticks = state.time_ticks;
        let input = TickInput {
            pointer: Some(Vec2::new(0.0, 500.0)),
        };
        for _ in 0..10 {
            assert_eq!(tick(&mut state, &input), TickOutcome::GameOver);
        }
        assert_eq!(state.ball.pos, ball.pos);
        assert_eq!(state.ball.vel, ball.vel);
        assert_eq!(state.player.pos, player.pos);
        assert_eq!(state.opponent.pos, opponent.pos);
        assert_eq!(state.time_ticks, ticks);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_life_loss_reserves_at_base_speed() {
        let mut state = new_state();
        state.ball.pos = Vec2::new(15.0, 60.0);
        state.ball.vel = Vec2::new(-7.0, 0.0);

        assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::Running);
        assert_eq!(state.match_state.lives, 2);
        assert!(!state.match_state.game_over);
        assert!(state.drain_events().contains(&GameEvent::LifeLost { lives: 2 }));
        assert!((state.ball.speed() - state.match_state.base_speed).abs() < 1e-3);
        assert_eq!(state.ball.trail.len(), 1);
    }

    #[test]
    fn test_opponent_goal_costs_no_life() {
        let mut state = new_state();
        state.opponent.center_on(&desktop(), 550.0);
        state.ball.pos = Vec2::new(1180.0, 60.0);
        state.ball.vel = Vec2::new(9.0, 0.0);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.match_state.lives, 3);
        assert!(state.drain_events().contains(&GameEvent::RallyConceded(Side::Opponent)));
        // Default policy serves back at the player
        assert!(state.ball.vel.x < 0.0);
    }

    #[test]
    fn test_player_hit_scores_once() {
        let mut state = new_state();
        let center = state.player.center().y;
        let face = state.player.face(&state.field);
        state.ball.pos = Vec2::new(face + 20.0, center);
        state.ball.vel = Vec2::new(-10.0, 0.0);

        tick(&mut state, &TickInput::default());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PaddleHit(Side::Player)));
        assert!(events.contains(&GameEvent::ScoreChanged { side: Side::Player, score: 1 }));
        assert_eq!(state.player.score, 1);
        assert!(state.ball.vel.x > 0.0);
    }

    #[test]
    fn test_sustained_overlap_scores_once() {
        let mut state = new_state();
        let center = state.player.center().y;
        let face = state.player.face(&state.field);
        state.ball.pos = Vec2::new(face + 20.0, center);
        state.ball.vel = Vec2::new(-10.0, 0.0);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.score, 1);
        state.drain_events();

        // Shove the ball back into the paddle while it is still flagged
        let radius = state.ball.radius;
        state.ball.pos = Vec2::new(face + radius - 2.0, center);
        state.ball.vel = Vec2::new(-1.0, 0.0);

        tick(&mut state, &TickInput::default());
        let events = state.drain_events();
        assert_eq!(state.player.score, 1);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ScoreChanged { .. })));
        assert!(!events.contains(&GameEvent::PaddleHit(Side::Player)));
        // No second reflection
        assert_eq!(state.ball.vel, Vec2::new(-1.0, 0.0));
        assert_eq!(state.ball.last_hit, Some(Side::Player));
    }

    #[test]
    fn test_fifth_hit_raises_level_and_base_speed() {
        let mut state = new_state();
        state.player.score = 4;
        let center = state.player.center().y;
        let face = state.player.face(&state.field);
        state.ball.pos = Vec2::new(face + 20.0, center + 30.0);
        state.ball.vel = Vec2::new(-10.0, 0.0);
        let before = state.match_state.base_speed;

        tick(&mut state, &TickInput::default());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::LevelChanged { side: Side::Player, level: 2 }));
        assert_eq!(state.player.level, 2);
        assert!((state.match_state.base_speed - state.ball.speed()).abs() < 1e-4);
        assert!(state.ball.speed() > 10.0);
        assert!(state.match_state.base_speed != before);
    }

    #[test]
    fn test_vertical_player_goal_is_bottom() {
        let field = Field::for_viewport(400.0, 700.0);
        let mut state = GameState::new(field, Tuning::default(), 1, 5);
        state.ball.pos = Vec2::new(40.0, 690.0);
        state.ball.vel = Vec2::new(0.0, 6.0);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.match_state.lives, 2);
        // Re-served toward the player, i.e. downward
        assert!(state.ball.vel.y > 0.0);
    }
}
