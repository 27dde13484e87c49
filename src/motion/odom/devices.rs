//! Tracking wheel geometry.
//!
//! A tracking wheel is an unpowered omni wheel on an encoder. Two of them,
//! one facing forward and one sideways, plus the gyro give the dead-reckoning
//! inputs for [`OdometryTracker`](super::tracker::OdometryTracker).
//!
//! # Example
//!
//! ```
//! use talos::motion::odom::devices::TrackingWheel;
//!
//! // 48 mm pod, 2000 counts per revolution, direct drive, 3" left of centre
//! let wheel = TrackingWheel::new(2000.0, 1.8898, 1.0, 1.0, -3.0);
//! assert!((wheel.inches(2000.0) - 1.8898 * std::f64::consts::PI).abs() < 1e-9);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Configuration for one tracking wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingWheel {
    /// Encoder counts per encoder-shaft revolution.
    pub ticks_per_rev:  f64,
    /// The diameter of the tracking wheel in inches.
    pub wheel_diameter: f64,
    /// The number of teeth on the driven (wheel-side) gear.
    pub driven_gear:    f64,
    /// The number of teeth on the driving (encoder-side) gear.
    pub driving_gear:   f64,
    /// Perpendicular distance from the tracking centre in inches.
    ///
    /// For the forward wheel this is measured to the right, for the strafe
    /// wheel it is measured forward.
    pub offset:         f64,
}

impl TrackingWheel {
    pub fn new(
        ticks_per_rev: f64,
        wheel_diameter: f64,
        driven_gear: f64,
        driving_gear: f64,
        offset: f64,
    ) -> Self {
        Self {
            ticks_per_rev,
            wheel_diameter,
            driven_gear,
            driving_gear,
            offset,
        }
    }

    /// Converts encoder ticks to inches of wheel travel.
    pub fn inches(&self, ticks: f64) -> f64 {
        let revs = ticks / self.ticks_per_rev;
        let gear_ratio = self.driving_gear / self.driven_gear;
        revs * gear_ratio * PI * self.wheel_diameter
    }
}

/// Both tracking wheels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdometryConfig {
    /// The forward-facing wheel.
    pub vertical:   TrackingWheel,
    /// The sideways wheel, counting up when the robot strafes right.
    pub horizontal: TrackingWheel,
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            vertical:   TrackingWheel::new(2000.0, 1.8898, 1.0, 1.0, -3.0),
            horizontal: TrackingWheel::new(2000.0, 1.8898, 1.0, 1.0, -5.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn gearing_scales_distance() {
        let direct = TrackingWheel::new(8192.0, 2.0, 1.0, 1.0, 0.0);
        let geared = TrackingWheel::new(8192.0, 2.0, 2.0, 1.0, 0.0);
        assert_relative_eq!(geared.inches(8192.0), direct.inches(8192.0) / 2.0);
    }
}
