//! 2D rendering module
//!
//! Each frame is described as a display list of [`DrawCommand`]s built from
//! the simulation state. A [`Canvas`] turns them into pixels: the browser
//! build maps them onto a `CanvasRenderingContext2d`, tests just record them.

pub mod shapes;

use glam::Vec2;

pub use shapes::{board_commands, entity_commands};

/// RGBA, each channel in [0, 1]
pub type Color = [f32; 4];

/// Palette
pub mod colors {
    use super::Color;

    pub const BALL: Color = [1.0, 1.0, 1.0, 1.0];
    /// #3498DB
    pub const PLAYER: Color = [52.0 / 255.0, 152.0 / 255.0, 219.0 / 255.0, 1.0];
    /// #E74C3C
    pub const OPPONENT: Color = [231.0 / 255.0, 76.0 / 255.0, 60.0 / 255.0, 1.0];
    pub const MARKINGS: Color = [1.0, 1.0, 1.0, 0.5];
}

/// Compositing mode for a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    #[default]
    Normal,
    /// Colors add up where shapes overlap
    Additive,
}

/// One draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Wipe the whole field
    Clear { width: f32, height: f32 },
    DashedLine {
        from: Vec2,
        to: Vec2,
        /// Dash and gap lengths
        dash: [f32; 2],
        width: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        dash: [f32; 2],
        width: f32,
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        blend: Blend,
    },
    /// Axis-aligned rectangle from its top-left corner
    FillRect { pos: Vec2, size: Vec2, color: Color },
}

/// Drawing surface
pub trait Canvas {
    fn draw(&mut self, command: &DrawCommand);
}

/// Format a color as a CSS `rgba()` string
pub fn css_color(color: Color) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({},{},{},{})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(colors::PLAYER), "rgba(52,152,219,1)");
        assert_eq!(css_color(colors::OPPONENT), "rgba(231,76,60,1)");
        assert_eq!(css_color(colors::MARKINGS), "rgba(255,255,255,0.5)");
    }
}
