//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per host frame, velocities in units per frame
//! - Seeded RNG only (one PCG stream per epoch)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod collision;
pub mod field;
pub mod scoring;
pub mod serve;
pub mod state;
pub mod tick;

pub use ai::{AiMove, Prediction, predict_intercept};
pub use collision::{PaddleContact, bounce_angle, resolve_paddle, resolve_walls};
pub use field::{Axis, Field, Orientation, Side};
pub use scoring::{PointAward, award_point, level_for_score};
pub use state::{Ball, GameEvent, GameState, MatchState, Paddle, TrailPoint};
pub use tick::{TickInput, TickOutcome, tick};
