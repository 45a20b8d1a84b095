//! Pong Arena - A two-paddle arcade game against a predictive AI
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, AI, scoring)
//! - `game_loop`: Frame-driven orchestration and collaborator contracts
//! - `renderer`: Display list built from the simulation each frame
//! - `tuning`: Data-driven game balance
//! - `settings`: Host configuration (audio, leaderboard endpoint, seed)

pub mod audio;
pub mod game_loop;
pub mod input;
pub mod leaderboard;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game_loop::{GameLoop, LoopPhase, TickToken};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game rule constants
pub mod consts {
    /// Lives at the start of every epoch
    pub const STARTING_LIVES: u8 = 3;
    /// Player score points per level-up
    pub const POINTS_PER_LEVEL: u32 = 5;

    /// Viewports this wide or narrower play vertically
    pub const VERTICAL_BREAKPOINT: f32 = 768.0;

    /// Ball radius as a fraction of the field's short side
    pub const BALL_RADIUS_FRACTION: f32 = 0.02;
    /// Paddle length as a fraction of the primary-axis extent
    pub const PADDLE_LENGTH_FRACTION: f32 = 0.2;
    /// Paddle thickness as a fraction of the goal-axis extent
    pub const PADDLE_THICKNESS_FRACTION: f32 = 0.01;
    /// Gap between a paddle and its goal edge
    pub const PADDLE_INSET: f32 = 5.0;

    /// Maximum bounce half-angle off a paddle (60 degrees)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;
    /// Clearance left between the ball and a paddle face after a bounce
    pub const PADDLE_SEPARATION: f32 = 0.5;
    /// Bounce speed used when a stationary ball is struck
    pub const FALLBACK_BOUNCE_SPEED: f32 = 5.0;
    /// Distance the AI aims short of its paddle face
    pub const AI_INTERCEPT_GAP: f32 = 1.0;

    /// Sound cooldowns (milliseconds)
    pub const WALL_HIT_COOLDOWN_MS: f64 = 40.0;
    pub const PADDLE_HIT_COOLDOWN_MS: f64 = 60.0;
    pub const GAME_OVER_COOLDOWN_MS: f64 = 60.0;

    /// Board marking geometry
    pub const CENTER_CIRCLE_RADIUS: f32 = 25.0;
}
