//! Plain value types shared by the kinematics and proximity passes.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point or displacement in screen space (y grows downwards).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Offset of length `length` at `degrees` counter-clockwise from +x,
    /// expressed in screen space.
    #[must_use]
    pub fn polar_screen(length: f64, degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self::new(length * rad.cos(), -length * rad.sin())
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

/// Joint angles of the two-link arm, in degrees.
///
/// Angles accumulate without wraparound; the trigonometry downstream makes
/// any value valid.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct ArmPose {
    pub angle1: f64,
    pub angle2: f64,
}

impl ArmPose {
    #[must_use]
    pub const fn new(angle1: f64, angle2: f64) -> Self {
        Self { angle1, angle2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert!((b.distance(a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn polar_screen_inverts_y() {
        let up = Vec2::polar_screen(10.0, 90.0);
        assert!(up.x.abs() < 1e-9);
        assert!((up.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn pose_casts_to_flat_floats() {
        let pose = ArmPose::new(15.0, -30.0);
        let flat: &[f64] = bytemuck::cast_slice(std::slice::from_ref(&pose));
        assert_eq!(flat, &[15.0, -30.0]);
    }
}
