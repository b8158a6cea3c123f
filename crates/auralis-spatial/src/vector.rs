//! Minimal 2D and 3D vectors for listener-relative directions.
//!
//! The listener faces negative Z with positive X to the right and positive
//! Y up. Horizontal-plane directions drop the Y axis, so a [`Vec2`] holds
//! `(x, z)` and "straight ahead" is `(0, -1)`.

use core::ops::{Add, Mul, Neg, Sub};

/// A direction or position in the horizontal plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    /// Left (negative) to right (positive).
    pub x: f32,
    /// Front (negative) to back (positive).
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Straight ahead of the listener.
    pub const FORWARD: Self = Self { x: 0.0, y: -1.0 };

    /// Creates a new vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the length of the vector.
    pub fn length(self) -> f32 {
        libm::sqrtf(self.dot(self))
    }

    /// Returns a unit-length copy, or [`ZERO`](Self::ZERO) for a
    /// (near) zero vector.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 1e-8 { self * (1.0 / len) } else { Self::ZERO }
    }

    /// Computes the dot product.
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Azimuth in `[0, 2π)`, counter-clockwise from the right.
    ///
    /// Straight ahead is `π/2`, left is `π` and right is `0`.
    pub fn azimuth(self) -> f32 {
        let angle = libm::atan2f(-self.y, self.x);
        if angle >= 0.0 {
            return angle;
        }
        // Tiny negative angles round up to exactly TAU.
        let wrapped = angle + core::f32::consts::TAU;
        if wrapped < core::f32::consts::TAU { wrapped } else { 0.0 }
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// A listener-relative direction in 3D.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    /// Left (negative) to right (positive).
    pub x: f32,
    /// Down (negative) to up (positive).
    pub y: f32,
    /// Front (negative) to back (positive).
    pub z: f32,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Straight ahead of the listener.
    pub const FORWARD: Self = Self {
        x: 0.0,
        y: 0.0,
        z: -1.0,
    };

    /// Straight up.
    pub const UP: Self = Self {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    /// Creates a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the length of the vector.
    pub fn length(self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Projects onto the horizontal plane as `(x, z)`.
    pub fn xz(self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

impl From<Vec2> for Vec3 {
    /// Lifts a horizontal direction to `(x, 0, y)`.
    fn from(v: Vec2) -> Self {
        Self::new(v.x, 0.0, v.y)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}
