//! Engine-free render descriptions.
//!
//! Drawable entities produce a [`RenderData`] each frame. It is a plain
//! value: no graphics calls happen here, and the rendering layer is free to
//! batch or discard it.

use serde::{Deserialize, Serialize};

use crate::transform::{Transform, Vec2};

/// RGBA colour with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque colour from components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same colour with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// White.
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Red, used for damage and health bars.
    pub const RED: Color = Color::rgb(0.86, 0.2, 0.18);
    /// Yellow, used for bullets and thruster exhaust.
    pub const YELLOW: Color = Color::rgb(0.71, 0.54, 0.0);
    /// Muted grey, used for static geometry.
    pub const GREY: Color = Color::rgb(0.4, 0.48, 0.51);
    /// Green, used for the hill.
    pub const GREEN: Color = Color::rgb(0.52, 0.6, 0.0);
}

/// A textured quad.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Texture name, resolved by the rendering layer.
    pub texture: String,
    /// World placement of the sprite centre.
    pub transform: Transform,
    /// Size in world units.
    pub scale: Vec2,
    /// Tint.
    pub color: Color,
}

/// A short-lived cosmetic particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Spawn position.
    pub position: Vec2,
    /// Initial velocity.
    pub velocity: Vec2,
    /// Radius in world units.
    pub size: f32,
    /// Lifetime in seconds.
    pub lifetime: f32,
    /// Colour at spawn.
    pub color: Color,
}

/// A polyline with per-point width and colour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Points in world space.
    pub points: Vec<Vec2>,
    /// Width at each point.
    pub widths: Vec<f32>,
    /// Colour at each point.
    pub colors: Vec<Color>,
}

/// A text label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// The string to draw.
    pub text: String,
    /// Font name, resolved by the rendering layer.
    pub font: String,
    /// World position of the label centre.
    pub position: Vec2,
    /// Uniform scale.
    pub scale: f32,
    /// Colour.
    pub color: Color,
}

/// Everything an entity wants drawn this frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderData {
    /// Sprites.
    pub sprites: Vec<Sprite>,
    /// Particles to emit. Always empty for lightweight renders.
    pub particles: Vec<Particle>,
    /// Lines.
    pub lines: Vec<Line>,
    /// Text labels.
    pub texts: Vec<Text>,
}

impl RenderData {
    /// An empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move everything from `other` into `self`.
    pub fn append(&mut self, mut other: RenderData) {
        self.sprites.append(&mut other.sprites);
        self.particles.append(&mut other.particles);
        self.lines.append(&mut other.lines);
        self.texts.append(&mut other.texts);
    }

    /// True if nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
            && self.particles.is_empty()
            && self.lines.is_empty()
            && self.texts.is_empty()
    }
}
