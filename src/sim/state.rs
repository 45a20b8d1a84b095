//! Game state and core simulation types
//!
//! One `GameState` is one epoch: exactly one ball and two paddles. A restart
//! throws the whole value away and builds a new one.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::{Field, Side};
use super::serve;
use crate::consts::*;
use crate::tuning::Tuning;

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Units per frame
    pub vel: Vec2,
    pub radius: f32,
    /// Paddle the ball is still overlapping after its last bounce
    pub last_hit: Option<Side>,
    /// Trail history for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<TrailPoint>,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            last_hit: None,
            trail: Vec::new(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Substeps needed this frame so no single move exceeds one radius
    pub fn substeps(&self) -> u32 {
        let steps = (self.speed() / self.radius).ceil();
        if steps.is_finite() && steps >= 1.0 {
            steps as u32
        } else {
            1
        }
    }

    /// Advance one frame
    ///
    /// Substep `i` of `n` lands on `start + vel * i/n`, so the final position
    /// is exactly `start + vel` however many substeps were taken.
    pub fn step(&mut self) {
        let n = self.substeps();
        let start = self.pos;
        for i in 1..=n {
            self.pos = start + self.vel * (i as f32 / n as f32);
        }
    }

    /// Record current position to trail, keeping at most `capacity` points
    pub fn record_trail(&mut self, capacity: usize) {
        self.trail.insert(0, TrailPoint { pos: self.pos });
        self.trail.truncate(capacity);
    }

    /// Clear trail (on serve)
    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }
}

/// A paddle. Position is the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub score: u32,
    pub level: u32,
}

impl Paddle {
    /// Paddle resting at its goal edge, centered on the primary axis
    pub fn new(side: Side, field: &Field) -> Self {
        let mut paddle = Self {
            side,
            pos: Vec2::ZERO,
            width: 0.0,
            height: 0.0,
            score: 0,
            level: 1,
        };
        paddle.fit(field, 0.5);
        paddle
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }

    /// Extent along the movement (primary) axis
    pub fn length(&self, field: &Field) -> f32 {
        field.primary_axis().of(self.size())
    }

    /// Extent along the goal axis
    pub fn thickness(&self, field: &Field) -> f32 {
        field.goal_axis().of(self.size())
    }

    /// Corner coordinate along the movement axis
    pub fn primary_position(&self, field: &Field) -> f32 {
        field.primary_axis().of(self.pos)
    }

    /// Move along the primary axis, then clamp into the field
    pub fn set_primary_position(&mut self, field: &Field, value: f32) {
        field.primary_axis().set(&mut self.pos, value);
        self.clamp_to(field);
    }

    /// Center the paddle on a primary-axis coordinate
    pub fn center_on(&mut self, field: &Field, coord: f32) {
        let half = self.length(field) / 2.0;
        self.set_primary_position(field, coord - half);
    }

    /// Goal-axis coordinate of the face the ball bounces off
    pub fn face(&self, field: &Field) -> f32 {
        let back = field.goal_axis().of(self.pos);
        if field.goal_direction(self.side) < 0.0 {
            back + self.thickness(field)
        } else {
            back
        }
    }

    /// Keep the rectangle fully inside the field
    pub fn clamp_to(&mut self, field: &Field) {
        let max = (field.size() - self.size()).max(Vec2::ZERO);
        self.pos = self.pos.clamp(Vec2::ZERO, max);
    }

    /// True if the rectangle lies within the field bounds
    pub fn is_inside(&self, field: &Field) -> bool {
        let eps = 1e-3;
        self.pos.x >= -eps
            && self.pos.y >= -eps
            && self.pos.x + self.width <= field.width + eps
            && self.pos.y + self.height <= field.height + eps
    }

    /// Resize for `field` and park at the goal edge, centered at the given
    /// fraction of the primary axis
    fn fit(&mut self, field: &Field, center_fraction: f32) {
        let size = field.paddle_size();
        self.width = size.x;
        self.height = size.y;

        let thickness = field.paddle_thickness();
        let goal = if field.goal_direction(self.side) < 0.0 {
            PADDLE_INSET
        } else {
            field.goal_extent() - PADDLE_INSET - thickness
        };
        field.goal_axis().set(&mut self.pos, goal);
        self.center_on(field, center_fraction * field.primary_extent());
    }

    /// Carry the paddle over to a resized (possibly reoriented) field
    pub fn refit(&mut self, old: &Field, new: &Field) {
        let center = old.primary_axis().of(self.center()) / old.primary_extent();
        self.fit(new, center);
    }
}

/// Lives and lifecycle of one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub lives: u8,
    /// Terminal until a restart replaces the whole game state
    pub game_over: bool,
    pub epoch: u64,
    /// Serve speed, raised at every level-up
    pub base_speed: f32,
}

impl MatchState {
    pub fn new(epoch: u64, base_speed: f32) -> Self {
        Self {
            lives: STARTING_LIVES,
            game_over: false,
            epoch,
            base_speed,
        }
    }

    /// Take one life. Returns true if that was the last one.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.game_over = true;
        }
        self.game_over
    }
}

/// Things that happened during a tick, for the collaborators outside the sim
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WallHit,
    PaddleHit(Side),
    ScoreChanged { side: Side, score: u32 },
    LevelChanged { side: Side, level: u32 },
    LifeLost { lives: u8 },
    /// The ball crossed this side's goal line without costing a life
    RallyConceded(Side),
    GameOver { score: u32 },
}

/// Complete per-epoch simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub field: Field,
    pub ball: Ball,
    pub player: Paddle,
    pub opponent: Paddle,
    pub match_state: MatchState,
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

impl GameState {
    /// Build a fresh ball and paddles for `epoch`, serving toward the player
    pub fn new(field: Field, tuning: Tuning, epoch: u64, seed: u64) -> Self {
        let base_speed = tuning.base_speed();
        let mut state = Self {
            field,
            ball: Ball::new(field.center(), Vec2::ZERO, field.ball_radius()),
            player: Paddle::new(Side::Player, &field),
            opponent: Paddle::new(Side::Opponent, &field),
            match_state: MatchState::new(epoch, base_speed),
            tuning,
            time_ticks: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        serve::serve(
            &mut state.ball,
            &state.field,
            base_speed,
            Side::Player,
            &mut state.rng,
        );
        state
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Recenter and relaunch the ball after `conceding` lost the point
    pub fn reset_ball(&mut self, conceding: Side) {
        let toward = serve::serve_target(self.tuning.serve_target, conceding);
        serve::serve(
            &mut self.ball,
            &self.field,
            self.match_state.base_speed,
            toward,
            &mut self.rng,
        );
    }

    /// Apply a new field size/orientation without rebuilding entities
    pub fn resize(&mut self, field: Field) {
        let old = self.field;
        if old == field {
            return;
        }
        if old.orientation != field.orientation {
            log::info!("Orientation changed: {:?} -> {:?}", old.orientation, field.orientation);
        }

        let ball = &mut self.ball;
        ball.pos = field.from_logical(old.to_logical(ball.pos));
        ball.vel = field.velocity_from_logical(old.velocity_to_logical(ball.vel));
        ball.radius = field.ball_radius();
        for point in &mut ball.trail {
            point.pos = field.from_logical(old.to_logical(point.pos));
        }

        // Walls are the only boundary the ball may never sit outside of
        let axis = field.primary_axis();
        let extent = field.primary_extent();
        let p = axis.of(ball.pos);
        let clamped = if extent > 2.0 * ball.radius {
            p.clamp(ball.radius, extent - ball.radius)
        } else {
            extent / 2.0
        };
        axis.set(&mut ball.pos, clamped);

        self.player.refit(&old, &field);
        self.opponent.refit(&old, &field);
        self.field = field;
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Substep count is ceil(speed / radius), at least one, and the
        /// substeps add up to exactly one frame's velocity
        #[test]
        fn prop_step_partitions_displacement(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            vx in -200.0f32..200.0,
            vy in -200.0f32..200.0,
            radius in 1.0f32..30.0,
        ) {
            let start = Vec2::new(x, y);
            let vel = Vec2::new(vx, vy);
            let mut ball = Ball::new(start, vel, radius);

            let expected = ((vel.length() / radius).ceil() as u32).max(1);
            prop_assert_eq!(ball.substeps(), expected);

            ball.step();
            prop_assert_eq!(ball.pos, start + vel);
            prop_assert_eq!(ball.vel, vel);
        }
    }
}
