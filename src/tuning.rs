//! Data-driven game balance
//!
//! Everything here can be overridden from the settings JSON; `validated`
//! pulls out-of-range values back into the ranges the simulation supports.

use serde::{Deserialize, Serialize};

/// Which way the ball heads after a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServeTarget {
    /// Every serve heads at the player's goal
    #[default]
    Player,
    /// Serve toward whichever side just lost the point
    Conceder,
}

/// Game balance values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Speed of each velocity component on the opening serve (units/frame)
    pub serve_component_speed: f32,
    /// Added to each velocity component's magnitude on level-up
    pub level_speed_increment: f32,
    /// AI over-drive factor applied to the required intercept speed
    pub ai_margin_factor: f32,
    /// AI paddle speed floor (units/frame)
    pub ai_min_speed: f32,
    /// AI paddle speed cap (units/frame)
    pub ai_max_speed: f32,
    /// Step budget for the AI trajectory prediction
    pub ai_prediction_steps: u32,
    /// Number of trail points kept behind the ball
    pub trail_length: usize,
    /// Serve direction policy
    pub serve_target: ServeTarget,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            serve_component_speed: 7.0,
            level_speed_increment: 2.0,
            ai_margin_factor: 1.15,
            ai_min_speed: 3.0,
            ai_max_speed: 30.0,
            ai_prediction_steps: 2000,
            trail_length: 12,
            serve_target: ServeTarget::Player,
        }
    }
}

impl Tuning {
    pub const AI_MARGIN_RANGE: (f32, f32) = (1.15, 1.3);
    pub const AI_MAX_SPEED_RANGE: (f32, f32) = (20.0, 30.0);
    pub const TRAIL_LENGTH_RANGE: (usize, usize) = (1, 64);
    pub const SERVE_SPEED_MAX: f32 = 50.0;
    pub const LEVEL_INCREMENT_MAX: f32 = 10.0;

    /// Serve speed magnitude at the start of an epoch
    pub fn base_speed(&self) -> f32 {
        self.serve_component_speed * std::f32::consts::SQRT_2
    }

    /// Clamp every value into its supported range
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        self.ai_margin_factor = clamp_logged(
            "ai_margin_factor",
            self.ai_margin_factor,
            Self::AI_MARGIN_RANGE.0,
            Self::AI_MARGIN_RANGE.1,
        );
        self.ai_max_speed = clamp_logged(
            "ai_max_speed",
            self.ai_max_speed,
            Self::AI_MAX_SPEED_RANGE.0,
            Self::AI_MAX_SPEED_RANGE.1,
        );
        self.ai_min_speed = clamp_logged("ai_min_speed", self.ai_min_speed, 0.5, self.ai_max_speed);

        if !(self.serve_component_speed > 0.0) {
            log::warn!(
                "serve_component_speed {} is not positive, using {}",
                self.serve_component_speed,
                defaults.serve_component_speed
            );
            self.serve_component_speed = defaults.serve_component_speed;
        }
        self.serve_component_speed = clamp_logged(
            "serve_component_speed",
            self.serve_component_speed,
            0.0,
            Self::SERVE_SPEED_MAX,
        );
        if !(self.level_speed_increment >= 0.0) {
            log::warn!(
                "level_speed_increment {} is negative, using {}",
                self.level_speed_increment,
                defaults.level_speed_increment
            );
            self.level_speed_increment = defaults.level_speed_increment;
        }
        self.level_speed_increment = clamp_logged(
            "level_speed_increment",
            self.level_speed_increment,
            0.0,
            Self::LEVEL_INCREMENT_MAX,
        );
        if self.ai_prediction_steps == 0 {
            self.ai_prediction_steps = defaults.ai_prediction_steps;
        }

        let (lo, hi) = Self::TRAIL_LENGTH_RANGE;
        if self.trail_length < lo || self.trail_length > hi {
            log::warn!("trail_length {} out of range, clamping", self.trail_length);
            self.trail_length = self.trail_length.clamp(lo, hi);
        }

        self
    }
}

/// Clamp with a warning; NaN falls back to the lower bound
fn clamp_logged(name: &str, value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        log::warn!("{name} is NaN, using {lo}");
        return lo;
    }
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        log::warn!("{name} {value} out of range [{lo}, {hi}], using {clamped}");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert_eq!(tuning.validated(), tuning);
    }

    #[test]
    fn test_base_speed_is_diagonal_of_components() {
        let tuning = Tuning::default();
        assert!((tuning.base_speed() - (7.0f32 * 7.0 * 2.0).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_validated_clamps_ai_ranges() {
        let tuning = Tuning {
            ai_margin_factor: 3.0,
            ai_max_speed: 5.0,
            trail_length: 0,
            serve_component_speed: -1.0,
            ..Default::default()
        }
        .validated();

        assert_eq!(tuning.ai_margin_factor, 1.3);
        assert_eq!(tuning.ai_max_speed, 20.0);
        assert_eq!(tuning.trail_length, 1);
        assert_eq!(tuning.serve_component_speed, 7.0);
    }

    #[test]
    fn test_validated_caps_ball_speeds() {
        let tuning = Tuning {
            serve_component_speed: 1.0e12,
            level_speed_increment: f32::INFINITY,
            ..Default::default()
        }
        .validated();

        assert_eq!(tuning.serve_component_speed, Tuning::SERVE_SPEED_MAX);
        assert_eq!(tuning.level_speed_increment, Tuning::LEVEL_INCREMENT_MAX);

        let field = crate::sim::field::Field::for_viewport(1200.0, 600.0);
        let state = crate::sim::state::GameState::new(field, tuning, 1, 3);
        assert!(state.ball.substeps() <= 10);
    }

    #[test]
    fn test_serve_target_serde_names() {
        let json = serde_json::to_string(&ServeTarget::Conceder).unwrap();
        assert_eq!(json, "\"conceder\"");
    }
}
