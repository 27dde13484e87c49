//! Angle type and small numeric helpers shared by the estimator and the
//! motion controllers.

use std::{
    f64::consts::{PI, TAU},
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// A planar angle stored in radians.
///
/// Arithmetic never wraps; call [`Angle::wrapped`] where a value in
/// `(-π, π]` is required (error terms, gyro deltas).
///
/// # Example
///
/// ```
/// use talos::math::Angle;
///
/// let a = Angle::from_degrees(270.0);
/// assert!((a.wrapped().as_degrees() + 90.0).abs() < 1e-9);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    /// The zero angle.
    pub const ZERO: Angle = Angle(0.0);

    /// Creates an angle from radians.
    pub const fn from_radians(radians: f64) -> Self { Self(radians) }

    /// Creates an angle from degrees.
    pub fn from_degrees(degrees: f64) -> Self { Self(degrees.to_radians()) }

    /// Returns the angle in radians.
    pub const fn as_radians(self) -> f64 { self.0 }

    /// Returns the angle in degrees.
    pub fn as_degrees(self) -> f64 { self.0.to_degrees() }

    pub fn sin(self) -> f64 { self.0.sin() }

    pub fn cos(self) -> f64 { self.0.cos() }

    pub fn abs(self) -> Self { Self(self.0.abs()) }

    /// Returns the equivalent angle in `(-π, π]`.
    pub fn wrapped(self) -> Self {
        let mut r = self.0 % TAU;
        if r > PI {
            r -= TAU;
        } else if r <= -PI {
            r += TAU;
        }
        Self(r)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle { Angle(self.0 + rhs.0) }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) { self.0 += rhs.0; }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle { Angle(self.0 - rhs.0) }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Angle) { self.0 -= rhs.0; }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle { Angle(-self.0) }
}

impl Mul<f64> for Angle {
    type Output = Angle;

    fn mul(self, rhs: f64) -> Angle { Angle(self.0 * rhs) }
}

impl Div<f64> for Angle {
    type Output = Angle;

    fn div(self, rhs: f64) -> Angle { Angle(self.0 / rhs) }
}

/// Clamps `val` to `[-cap, cap]`.
pub fn abscap(val: f64, cap: f64) -> f64 {
    let cap = cap.abs();
    val.clamp(-cap, cap)
}

/// Raises a non-zero command to at least `floor` in magnitude, keeping its sign.
///
/// Used so that small errors still overcome static friction.
pub fn with_floor(val: f64, floor: f64) -> f64 {
    if val == 0.0 || val.abs() >= floor { val } else { floor.copysign(val) }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn wrapped_stays_in_half_open_range() {
        assert_relative_eq!(Angle::from_degrees(190.0).wrapped().as_degrees(), -170.0, epsilon = 1e-9);
        assert_relative_eq!(Angle::from_degrees(-190.0).wrapped().as_degrees(), 170.0, epsilon = 1e-9);
        assert_relative_eq!(Angle::from_degrees(180.0).wrapped().as_degrees(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(Angle::from_degrees(-180.0).wrapped().as_degrees(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(Angle::from_degrees(720.0 + 45.0).wrapped().as_degrees(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn abscap_limits_both_sides() {
        assert_eq!(abscap(3.0, 1.0), 1.0);
        assert_eq!(abscap(-3.0, 1.0), -1.0);
        assert_eq!(abscap(0.4, -1.0), 0.4);
    }

    #[test]
    fn floor_keeps_sign_and_zero() {
        assert_eq!(with_floor(0.01, 0.1), 0.1);
        assert_eq!(with_floor(-0.01, 0.1), -0.1);
        assert_eq!(with_floor(0.0, 0.1), 0.0);
        assert_eq!(with_floor(0.5, 0.1), 0.5);
    }
}
