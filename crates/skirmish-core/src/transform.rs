//! Planar rigid transforms.
//!
//! A [`Transform`] is a rotation followed by a translation. Composition
//! follows the physics engine's convention: `a.compose(&b)` first applies
//! `b`, then `a`, so `a.compose(&b).apply(p) == a.apply(b.apply(p))`.

use std::f32::consts::PI;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D vector in world units (metres).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct a vector from components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate counter-clockwise by `angle` radians.
    pub fn rotated(self, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    /// Dot product.
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(v: [f32; 2]) -> Self {
        Vec2::new(v[0], v[1])
    }
}

/// Rotation (radians) followed by translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation component.
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        position: Vec2::ZERO,
        rotation: 0.0,
    };

    /// Construct from a position and a rotation in radians.
    pub const fn new(x: f32, y: f32, rotation: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            rotation,
        }
    }

    /// Construct from a position and a rotation in degrees.
    pub fn from_degrees(x: f32, y: f32, degrees: f32) -> Self {
        Self::new(x, y, degrees.to_radians())
    }

    /// `self ∘ other`: apply `other`, then `self`.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + other.position.rotated(self.rotation),
            rotation: self.rotation + other.rotation,
        }
    }

    /// Map a point from this transform's local frame to the parent frame.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.position + point.rotated(self.rotation)
    }

    /// Rotate a direction without translating it.
    pub fn apply_vector(&self, v: Vec2) -> Vec2 {
        v.rotated(self.rotation)
    }

    /// The inverse transform, so `t.inverse().compose(&t)` is the identity.
    pub fn inverse(&self) -> Transform {
        Transform {
            position: (-self.position).rotated(-self.rotation),
            rotation: -self.rotation,
        }
    }

    /// Compare with a tolerance. Rotations are compared modulo 2π.
    pub fn approx_eq(&self, other: &Transform, tolerance: f32) -> bool {
        self.position.distance(other.position) <= tolerance
            && angle_delta(self.rotation, other.rotation).abs() <= tolerance
    }
}

/// Signed smallest difference `a - b`, wrapped into `(-π, π]`.
pub fn angle_delta(a: f32, b: f32) -> f32 {
    let mut d = (a - b) % (2.0 * PI);
    if d > PI {
        d -= 2.0 * PI;
    } else if d <= -PI {
        d += 2.0 * PI;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotated(PI / 2.0);
        assert!(v.distance(Vec2::new(0.0, 1.0)) < 1e-6);
    }

    #[test]
    fn compose_applies_right_then_left() {
        let a = Transform::from_degrees(1.0, 2.0, 90.0);
        let b = Transform::new(3.0, 0.0, 0.0);
        let c = a.compose(&b);
        assert!(c.position.distance(Vec2::new(1.0, 5.0)) < 1e-5);
        assert!((c.rotation - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn angle_delta_wraps() {
        assert!((angle_delta(2.0 * PI + 0.1, 0.0) - 0.1).abs() < 1e-5);
        assert!((angle_delta(-0.1, 2.0 * PI) + 0.1).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn compose_matches_sequential_apply(
            ax in -10.0f32..10.0, ay in -10.0f32..10.0, ar in -6.0f32..6.0,
            bx in -10.0f32..10.0, by in -10.0f32..10.0, br in -6.0f32..6.0,
            px in -5.0f32..5.0, py in -5.0f32..5.0,
        ) {
            let a = Transform::new(ax, ay, ar);
            let b = Transform::new(bx, by, br);
            let p = Vec2::new(px, py);
            let lhs = a.compose(&b).apply(p);
            let rhs = a.apply(b.apply(p));
            prop_assert!(lhs.distance(rhs) < 1e-3);
        }

        #[test]
        fn inverse_cancels(x in -10.0f32..10.0, y in -10.0f32..10.0, r in -6.0f32..6.0) {
            let t = Transform::new(x, y, r);
            let id = t.inverse().compose(&t);
            prop_assert!(id.approx_eq(&Transform::IDENTITY, 1e-3));
        }
    }
}
