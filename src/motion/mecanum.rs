//! Mecanum inverse kinematics.
//!
//! Turns a body-frame command (forward, strafe right, rotate counter-clockwise)
//! into four wheel powers. Right-side motors are assumed to be configured so a
//! positive power drives the robot forward on both sides.
//!
//! # Example
//!
//! ```
//! use talos::motion::mecanum::{WheelPowers, mix};
//!
//! let p = mix(1.0, 0.0, 0.0);
//! assert_eq!(p, WheelPowers::uniform(1.0));
//! ```

use crate::math::Angle;

/// Power fractions for the four drive wheels.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WheelPowers {
    pub front_left:  f64,
    pub front_right: f64,
    pub rear_left:   f64,
    pub rear_right:  f64,
}

impl WheelPowers {
    pub const ZERO: WheelPowers = WheelPowers::uniform(0.0);

    pub const fn new(front_left: f64, front_right: f64, rear_left: f64, rear_right: f64) -> Self {
        Self {
            front_left,
            front_right,
            rear_left,
            rear_right,
        }
    }

    /// All four wheels at the same power.
    pub const fn uniform(power: f64) -> Self { Self::new(power, power, power, power) }

    pub fn max_magnitude(&self) -> f64 {
        self.front_left
            .abs()
            .max(self.front_right.abs())
            .max(self.rear_left.abs())
            .max(self.rear_right.abs())
    }

    pub fn is_zero(&self) -> bool { self.max_magnitude() == 0.0 }

    /// Scales all four powers by the same factor so none exceeds 1.0.
    ///
    /// Powers already inside the unit range are returned unchanged.
    pub fn normalized(self) -> Self {
        let max = self.max_magnitude();
        if max > 1.0 { self.scaled(1.0 / max) } else { self }
    }

    pub fn scaled(self, k: f64) -> Self {
        Self::new(
            self.front_left * k,
            self.front_right * k,
            self.rear_left * k,
            self.rear_right * k,
        )
    }

    /// Returns `[front_left, front_right, rear_left, rear_right]`.
    pub fn to_array(self) -> [f64; 4] {
        [self.front_left, self.front_right, self.rear_left, self.rear_right]
    }
}

/// Robot-centric mix.
///
/// * `y` - forward translation.
/// * `x` - strafe, positive to the right.
/// * `rotation` - positive turns counter-clockwise.
///
/// The result is normalised.
pub fn mix(y: f64, x: f64, rotation: f64) -> WheelPowers {
    WheelPowers {
        front_right: y - x + rotation,
        front_left:  y + x - rotation,
        rear_right:  y + x + rotation,
        rear_left:   y - x - rotation,
    }
    .normalized()
}

/// Field-centric mix for driver-relative control.
///
/// `reference` is how far the robot front is rotated counter-clockwise from
/// the driver's "forward". The translation command is rotated into the robot
/// frame before mixing, so pushing the stick away from the driver always
/// drives away from the driver.
pub fn mix_field_centric(y: f64, x: f64, rotation: f64, reference: Angle) -> WheelPowers {
    let (s, c) = ((-reference).sin(), (-reference).cos());
    let robot_x = x * c - y * s;
    let robot_y = x * s + y * c;
    mix(robot_y, robot_x, rotation)
}
