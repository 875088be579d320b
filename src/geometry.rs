//! Planar vectors for positions and headings.
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Vec2 {
        let norm = self.norm();
        if norm > 0.0 {
            self / norm
        } else {
            Vec2::ZERO
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (b - a).norm()
}

/// Unit vector pointing from `a` to `b`. Coincident points have no direction and yield zero.
#[must_use]
pub fn heading_towards(a: Vec2, b: Vec2) -> Vec2 {
    (b - a).normalized()
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

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn norm_and_distance() {
        assert_relative_eq!(Vec2::new(3.0, 4.0).norm(), 5.0);
        assert_relative_eq!(distance(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0)), 5.0);
        assert_relative_eq!(distance(Vec2::new(2.0, 2.0), Vec2::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn heading_is_unit() {
        let heading = heading_towards(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert_eq!(heading, Vec2::new(1.0, 0.0));

        let heading = heading_towards(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert_relative_eq!(heading.norm(), 1.0);
        assert_relative_eq!(heading.x, 0.6);
        assert_relative_eq!(heading.y, 0.8);
    }

    #[test]
    fn heading_to_self_is_zero() {
        let p = Vec2::new(7.0, 3.0);
        assert_eq!(heading_towards(p, p), Vec2::ZERO);
    }

    #[test]
    fn arithmetic() {
        let mut v = Vec2::new(1.0, 2.0) + Vec2::new(3.0, 4.0) * 2.0;
        assert_eq!(v, Vec2::new(7.0, 10.0));
        v -= Vec2::new(1.0, 1.0);
        assert_eq!(v / 2.0, Vec2::new(3.0, 4.5));
        assert_eq!(-v, Vec2::new(-6.0, -9.0));
    }
}
