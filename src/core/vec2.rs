//! Fixed-Point 2D Vector
//!
//! Positions, velocities, aim directions and surface normals.
//! Every operation stays in Q16.16; `to_floats` exists for log output only.

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

use super::fixed::{
    Fixed, FIXED_ONE, FIXED_SCALE,
    fixed_mul, isqrt_u64, to_fixed,
};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: FIXED_ONE, y: 0 };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self { x: 0, y: FIXED_ONE };

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self { x: -FIXED_ONE, y: 0 };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// Create a vector from configuration floats.
    ///
    /// Only for bootstrap; the tick loop never sees floats.
    #[inline]
    pub const fn from_config(v: [f64; 2]) -> Self {
        Self {
            x: to_fixed(v[0]),
            y: to_fixed(v[1]),
        }
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_mul(self.x, scalar),
            y: fixed_mul(self.y, scalar),
        }
    }

    /// Squared length as a raw Q32.32 value.
    ///
    /// Does not overflow for any pair of components.
    #[inline]
    pub fn length_squared_wide(self) -> u64 {
        let x = u64::from(self.x.unsigned_abs());
        let y = u64::from(self.y.unsigned_abs());
        (x * x).saturating_add(y * y)
    }

    /// Squared length, saturating at the largest Fixed value.
    #[inline]
    pub fn length_squared(self) -> Fixed {
        (self.length_squared_wide() >> FIXED_SCALE).min(Fixed::MAX as u64) as Fixed
    }

    /// Length as a raw Q16.16 value that may exceed the Fixed range.
    #[inline]
    fn length_wide(self) -> i64 {
        isqrt_u64(self.length_squared_wide()) as i64
    }

    /// Length, saturating at the largest Fixed value.
    #[inline]
    pub fn length(self) -> Fixed {
        self.length_wide().min(Fixed::MAX as i64) as Fixed
    }

    /// Unit vector in the same direction, or ZERO for a zero vector.
    ///
    /// Used for aim directions and surface normals, so any length works.
    pub fn normalize(self) -> Self {
        let len = self.length_wide();
        if len == 0 {
            return Self::ZERO;
        }
        let unit = |c: Fixed| ((i64::from(c) << FIXED_SCALE) / len) as Fixed;
        Self::new(unit(self.x), unit(self.y))
    }

    /// Dot product as a raw Q32.32 value.
    #[inline]
    pub fn dot_wide(self, other: Self) -> i64 {
        (i64::from(self.x) * i64::from(other.x))
            .saturating_add(i64::from(self.y) * i64::from(other.y))
    }

    /// Clamp each component to `[-limit, limit]`.
    #[inline]
    pub fn clamp_components(self, limit: Fixed) -> Self {
        Self::new(self.x.clamp(-limit, limit), self.y.clamp(-limit, limit))
    }

    /// Rotate 90 degrees counter-clockwise.
    #[inline]
    pub fn perpendicular(self) -> Self {
        Self {
            x: self.y.wrapping_neg(),
            y: self.x,
        }
    }

    /// Convert to floats for log output.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (
            self.x as f32 / FIXED_ONE as f32,
            self.y as f32 / FIXED_ONE as f32,
        )
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(self.x.wrapping_neg(), self.y.wrapping_neg())
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2{}", self)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.3}, {:.3})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::TICK_DURATION;

    #[test]
    fn test_vec2_arithmetic() {
        let a = FixedVec2::new(to_fixed(3.0), to_fixed(4.0));
        let b = FixedVec2::new(to_fixed(1.0), to_fixed(2.0));
        assert_eq!(a + b, FixedVec2::from_ints(4, 6));
        assert_eq!(a - b, FixedVec2::from_ints(2, 2));
        assert_eq!(-FixedVec2::RIGHT, FixedVec2::LEFT);
        assert_eq!(b.scale(to_fixed(2.0)), FixedVec2::from_ints(2, 4));
    }

    #[test]
    fn test_velocity_step() {
        // 5 units/s for one 1/60 s tick
        let step = FixedVec2::new(to_fixed(5.0), 0).scale(TICK_DURATION);
        assert!((step.x - to_fixed(5.0 / 60.0)).abs() < 8);
        assert_eq!(step.y, 0);
    }

    #[test]
    fn test_vec2_length() {
        // 3-4-5 triangle
        let v = FixedVec2::new(to_fixed(3.0), to_fixed(4.0));
        assert_eq!(v.length_squared(), to_fixed(25.0));
        assert_eq!(v.length(), to_fixed(5.0));
    }

    #[test]
    fn test_long_vectors_do_not_wrap() {
        // 300-400-500: the square is far beyond the Fixed range
        let v = FixedVec2::from_ints(300, 400);
        assert_eq!(v.length(), to_fixed(500.0));
        assert_eq!(v.length_squared(), Fixed::MAX);
        assert_eq!(v.normalize(), FixedVec2::new(to_fixed(0.6), to_fixed(0.8)));

        let floor = FixedVec2::from_ints(200, 0);
        assert_eq!(floor.perpendicular().normalize(), FixedVec2::UP);
        assert_eq!(floor.dot_wide(floor), 200i64 * 200 << 32);

        let extreme = FixedVec2::new(Fixed::MIN, Fixed::MIN);
        assert!(extreme.normalize().x < 0);
        assert_eq!(extreme.length(), Fixed::MAX);
    }

    #[test]
    fn test_clamp_components() {
        let v = FixedVec2::from_ints(-50, 3);
        assert_eq!(v.clamp_components(to_fixed(10.0)), FixedVec2::from_ints(-10, 3));
    }

    #[test]
    fn test_vec2_normalize() {
        let v = FixedVec2::new(to_fixed(3.0), to_fixed(4.0));
        let norm = v.normalize();
        assert_eq!(norm, FixedVec2::new(to_fixed(0.6), to_fixed(0.8)));

        // Axis-aligned unit vectors survive exactly
        assert_eq!(FixedVec2::from_ints(7, 0).normalize(), FixedVec2::RIGHT);

        // Zero vector normalizes to zero
        assert_eq!(FixedVec2::ZERO.normalize(), FixedVec2::ZERO);
    }

    #[test]
    fn test_vec2_dot_and_perpendicular() {
        let a = FixedVec2::new(to_fixed(2.0), to_fixed(3.0));
        let b = FixedVec2::new(to_fixed(4.0), to_fixed(5.0));
        // 2*4 + 3*5 = 8 + 15 = 23
        assert_eq!(a.dot_wide(b) >> FIXED_SCALE, i64::from(to_fixed(23.0)));

        assert_eq!(FixedVec2::RIGHT.perpendicular(), FixedVec2::UP);
        assert_eq!(a.dot_wide(a.perpendicular()), 0);
    }

    #[test]
    fn test_vec2_from_config_and_display() {
        let v = FixedVec2::from_config([1.5, -2.0]);
        assert_eq!(v, FixedVec2::new(to_fixed(1.5), to_fixed(-2.0)));
        assert_eq!(v.to_string(), "(1.500, -2.000)");
        assert_eq!(format!("{:?}", v), "Vec2(1.500, -2.000)");
    }
}
