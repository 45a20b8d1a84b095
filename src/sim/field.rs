//! Play field geometry and orientation-dependent axis binding
//!
//! The simulation never hard-codes "x" or "y". Every rule is written in
//! terms of two roles:
//! - primary axis: the ball bounces off its boundaries, paddles slide along it
//! - goal axis: crossing one of its boundaries ends a life or a rally
//!
//! Horizontal play binds primary = Y, goal = X (player on the left).
//! Vertical play binds primary = X, goal = Y (player at the bottom).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Play orientation, chosen from the viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Desktop layout: paddles at the left and right edges
    Horizontal,
    /// Narrow layout: paddles at the bottom and top edges
    Vertical,
}

impl Orientation {
    /// Vertical if the viewport is at most 768 units wide
    pub fn classify(viewport_width: f32) -> Self {
        if viewport_width <= VERTICAL_BREAKPOINT {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn primary_axis(self) -> Axis {
        match self {
            Orientation::Horizontal => Axis::Y,
            Orientation::Vertical => Axis::X,
        }
    }

    pub fn goal_axis(self) -> Axis {
        self.primary_axis().other()
    }
}

/// A physical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Component of `v` along this axis
    #[inline]
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    #[inline]
    pub fn set(self, v: &mut Vec2, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
    }
}

/// Which paddle (and which goal) something belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Pointer/touch controlled paddle
    Player,
    /// AI controlled paddle
    Opponent,
}

/// The rectangular play area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub orientation: Orientation,
}

impl Field {
    /// Smallest extent accepted on either axis
    pub const MIN_EXTENT: f32 = 1.0;

    pub fn new(width: f32, height: f32, orientation: Orientation) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            orientation,
        }
    }

    /// Field filling the viewport, orientation classified from its width
    pub fn for_viewport(width: f32, height: f32) -> Self {
        Self::new(width, height, Orientation::classify(width))
    }

    #[inline]
    pub fn primary_axis(&self) -> Axis {
        self.orientation.primary_axis()
    }

    #[inline]
    pub fn goal_axis(&self) -> Axis {
        self.orientation.goal_axis()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    pub fn extent(&self, axis: Axis) -> f32 {
        axis.of(self.size())
    }

    pub fn primary_extent(&self) -> f32 {
        self.extent(self.primary_axis())
    }

    pub fn goal_extent(&self) -> f32 {
        self.extent(self.goal_axis())
    }

    /// Build a physical vector from goal-axis and primary-axis components
    pub fn compose(&self, goal: f32, primary: f32) -> Vec2 {
        let mut v = Vec2::ZERO;
        self.goal_axis().set(&mut v, goal);
        self.primary_axis().set(&mut v, primary);
        v
    }

    pub fn ball_radius(&self) -> f32 {
        self.width.min(self.height) * BALL_RADIUS_FRACTION
    }

    pub fn paddle_length(&self) -> f32 {
        self.primary_extent() * PADDLE_LENGTH_FRACTION
    }

    pub fn paddle_thickness(&self) -> f32 {
        self.goal_extent() * PADDLE_THICKNESS_FRACTION
    }

    /// Physical (width, height) of a paddle in this field
    pub fn paddle_size(&self) -> Vec2 {
        self.compose(self.paddle_thickness(), self.paddle_length())
    }

    /// Goal-axis coordinate of `side`'s goal line
    pub fn goal_line(&self, side: Side) -> f32 {
        match (self.orientation, side) {
            (Orientation::Horizontal, Side::Player) => 0.0,
            (Orientation::Horizontal, Side::Opponent) => self.width,
            (Orientation::Vertical, Side::Player) => self.height,
            (Orientation::Vertical, Side::Opponent) => 0.0,
        }
    }

    /// Goal-axis direction pointing from the field toward `side`'s goal
    ///
    /// -1.0 when that goal line sits at zero, +1.0 when it sits at the far end.
    pub fn goal_direction(&self, side: Side) -> f32 {
        match (self.orientation, side) {
            (Orientation::Horizontal, Side::Player) | (Orientation::Vertical, Side::Opponent) => {
                -1.0
            }
            _ => 1.0,
        }
    }

    /// Express a position as fractions of the field:
    /// x = distance from the player's goal line, y = offset along the primary axis
    pub fn to_logical(&self, pos: Vec2) -> Vec2 {
        let goal = self.goal_axis().of(pos);
        let from_player = (goal - self.goal_line(Side::Player)) * -self.goal_direction(Side::Player);
        Vec2::new(
            from_player / self.goal_extent(),
            self.primary_axis().of(pos) / self.primary_extent(),
        )
    }

    /// Inverse of [`Field::to_logical`]
    pub fn from_logical(&self, logical: Vec2) -> Vec2 {
        let toward_opponent = -self.goal_direction(Side::Player);
        let goal = self.goal_line(Side::Player) + toward_opponent * logical.x * self.goal_extent();
        self.compose(goal, logical.y * self.primary_extent())
    }

    /// Express a velocity as (component toward the opponent, primary component)
    pub fn velocity_to_logical(&self, vel: Vec2) -> Vec2 {
        Vec2::new(
            self.goal_axis().of(vel) * -self.goal_direction(Side::Player),
            self.primary_axis().of(vel),
        )
    }

    /// Inverse of [`Field::velocity_to_logical`]
    pub fn velocity_from_logical(&self, logical: Vec2) -> Vec2 {
        self.compose(logical.x * -self.goal_direction(Side::Player), logical.y)
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(Field::MIN_EXTENT)
    } else {
        Field::MIN_EXTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_breakpoint() {
        assert_eq!(Orientation::classify(768.0), Orientation::Vertical);
        assert_eq!(Orientation::classify(400.0), Orientation::Vertical);
        assert_eq!(Orientation::classify(768.5), Orientation::Horizontal);
        assert_eq!(Orientation::classify(1280.0), Orientation::Horizontal);
    }

    #[test]
    fn test_axis_binding() {
        let desktop = Field::for_viewport(1200.0, 600.0);
        assert_eq!(desktop.primary_axis(), Axis::Y);
        assert_eq!(desktop.goal_axis(), Axis::X);
        assert_eq!(desktop.goal_line(Side::Player), 0.0);
        assert_eq!(desktop.goal_line(Side::Opponent), 1200.0);

        let phone = Field::for_viewport(400.0, 700.0);
        assert_eq!(phone.primary_axis(), Axis::X);
        assert_eq!(phone.goal_axis(), Axis::Y);
        assert_eq!(phone.goal_line(Side::Player), 700.0);
        assert_eq!(phone.goal_line(Side::Opponent), 0.0);
    }

    #[test]
    fn test_goal_direction_points_at_goal_line() {
        for field in [Field::for_viewport(1200.0, 600.0), Field::for_viewport(400.0, 700.0)] {
            for side in [Side::Player, Side::Opponent] {
                let line = field.goal_line(side);
                let center = field.goal_axis().of(field.center());
                assert_eq!((line - center).signum(), field.goal_direction(side));
            }
        }
    }

    #[test]
    fn test_size_fractions() {
        let field = Field::for_viewport(1200.0, 600.0);
        assert!((field.ball_radius() - 12.0).abs() < 1e-4);
        assert!((field.paddle_length() - 120.0).abs() < 1e-4);
        assert!((field.paddle_thickness() - 12.0).abs() < 1e-4);
        assert!((field.paddle_size() - Vec2::new(12.0, 120.0)).length() < 1e-4);

        let phone = Field::for_viewport(400.0, 700.0);
        assert!((phone.ball_radius() - 8.0).abs() < 1e-4);
        assert!((phone.paddle_size() - Vec2::new(80.0, 7.0)).length() < 1e-4);
    }

    #[test]
    fn test_logical_mapping_across_orientations() {
        let desktop = Field::for_viewport(1200.0, 600.0);
        let phone = Field::for_viewport(400.0, 700.0);

        // A quarter of the way from the player's goal, near the first wall
        let pos = Vec2::new(300.0, 60.0);
        let logical = desktop.to_logical(pos);
        assert!((logical - Vec2::new(0.25, 0.1)).length() < 1e-5);

        let mapped = phone.from_logical(logical);
        assert!((mapped - Vec2::new(40.0, 525.0)).length() < 1e-3);
        assert!((phone.to_logical(mapped) - logical).length() < 1e-5);
    }

    #[test]
    fn test_velocity_mapping_keeps_heading() {
        let desktop = Field::for_viewport(1200.0, 600.0);
        let phone = Field::for_viewport(400.0, 700.0);

        // Moving toward the opponent on desktop (+x) must move toward the top on phone (-y)
        let vel = Vec2::new(7.0, 3.0);
        let mapped = phone.velocity_from_logical(desktop.velocity_to_logical(vel));
        assert_eq!(mapped, Vec2::new(3.0, -7.0));
        assert!((mapped.length() - vel.length()).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_extent_is_sanitized() {
        let field = Field::new(0.0, f32::NAN, Orientation::Horizontal);
        assert_eq!(field.width, Field::MIN_EXTENT);
        assert_eq!(field.height, Field::MIN_EXTENT);
        assert!(field.ball_radius() > 0.0);
    }
}
