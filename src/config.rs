//! Robot configuration.
//!
//! Everything that differs between two builds of the same robot design lives
//! in [`RobotConfig`]: tracking-wheel geometry, motion controller tuning, and
//! the mechanism controllers. Field constants and mechanism set points are
//! compiled in (see [`crate::vision::markers`] and
//! [`crate::mechanism::setpoints`]).
//!
//! # Example
//!
//! ```
//! use talos::config::RobotConfig;
//!
//! let config = RobotConfig::from_json(r#"{ "motion": { "drive_tolerance": 0.75 } }"#).unwrap();
//! assert_eq!(config.motion.drive_tolerance, 0.75);
//! // Anything not given keeps its default.
//! assert_eq!(config.motion.poll_interval_ms, 50);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    mechanism::{MotorMechanismConfig, ServoConfig},
    motion::odom::devices::OdometryConfig,
};

/// Power presets shared by autonomous and teleop.
pub mod speed {
    pub const DRIVE_20: f64 = 0.20;
    pub const DRIVE_30: f64 = 0.30;
    pub const DRIVE_50: f64 = 0.50;
    pub const DRIVE_70: f64 = 0.70;
    pub const DRIVE_90: f64 = 0.90;
    pub const DRIVE_100: f64 = 1.00;

    pub const TURN_20: f64 = 0.20;
    pub const TURN_30: f64 = 0.30;
    pub const TURN_50: f64 = 0.50;
    pub const TURN_70: f64 = 0.70;
}

/// Gains, floors and tolerances of the drive primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Control tick of the motion primitives.
    pub loop_period_ms:          u64,
    /// Sleep between completion polls in the sequencer.
    pub poll_interval_ms:        u64,
    /// Drive power per inch of position error.
    pub drive_gain:              f64,
    /// Turn power per degree of heading error.
    pub turn_gain:               f64,
    /// Heading-hold power per degree while gyro driving.
    pub heading_hold_gain:       f64,
    /// Smallest drive power for `DriveTo` moves, so the robot does not stall
    /// short of the target.
    pub min_drive_power:         f64,
    /// Smallest drive power for `DriveThru` moves.
    pub min_thru_power:          f64,
    pub min_turn_power:          f64,
    /// `DriveTo` position tolerance, inches.
    pub drive_tolerance:         f64,
    /// `DriveTo` heading tolerance, degrees.
    pub turn_tolerance_deg:      f64,
    /// `DriveThru` position tolerance, inches.
    pub thru_tolerance:          f64,
    /// `DriveThru` heading tolerance, degrees.
    pub thru_turn_tolerance_deg: f64,
    /// Hard limit for any single primitive without its own timeout.
    pub default_timeout_ms:      u64,
}

impl MotionTuning {
    pub fn loop_period(&self) -> Duration { Duration::from_millis(self.loop_period_ms) }

    pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms) }

    pub fn default_timeout(&self) -> Duration { Duration::from_millis(self.default_timeout_ms) }
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            loop_period_ms:          10,
            poll_interval_ms:        50,
            drive_gain:              0.06,
            turn_gain:               0.02,
            heading_hold_gain:       0.015,
            min_drive_power:         0.08,
            min_thru_power:          0.35,
            min_turn_power:          0.06,
            drive_tolerance:         0.5,
            turn_tolerance_deg:      1.5,
            thru_tolerance:          2.0,
            thru_turn_tolerance_deg: 5.0,
            default_timeout_ms:      5000,
        }
    }
}

/// The whole robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub odometry: OdometryConfig,
    pub motion:   MotionTuning,
    /// Viper slide extension.
    pub lift:     MotorMechanismConfig,
    /// Arm tilt.
    pub tilt:     MotorMechanismConfig,
    /// Shared by the wrist, elbow and claw servos.
    pub servo:    ServoConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            odometry: OdometryConfig::default(),
            motion:   MotionTuning::default(),
            lift:     MotorMechanismConfig::lift(),
            tilt:     MotorMechanismConfig::tilt(),
            servo:    ServoConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: RobotConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> { Ok(serde_json::to_string_pretty(self)?) }

    /// Rejects values that would make a controller misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, wheel) in [
            ("odometry.vertical", &self.odometry.vertical),
            ("odometry.horizontal", &self.odometry.horizontal),
        ] {
            if wheel.ticks_per_rev <= 0.0 || wheel.wheel_diameter <= 0.0 {
                return Err(ConfigError::invalid(field, "ticks per rev and wheel diameter must be positive"));
            }
            if wheel.driven_gear <= 0.0 || wheel.driving_gear <= 0.0 {
                return Err(ConfigError::invalid(field, "gear teeth must be positive"));
            }
        }

        let m = &self.motion;
        if m.loop_period_ms == 0 || m.poll_interval_ms == 0 {
            return Err(ConfigError::invalid("motion", "loop periods must be non-zero"));
        }
        for (field, power) in [
            ("motion.min_drive_power", m.min_drive_power),
            ("motion.min_thru_power", m.min_thru_power),
            ("motion.min_turn_power", m.min_turn_power),
        ] {
            if !(0.0..=1.0).contains(&power) {
                return Err(ConfigError::invalid(field, format!("{power} is outside 0..=1")));
            }
        }
        if m.drive_tolerance <= 0.0 || m.turn_tolerance_deg <= 0.0 {
            return Err(ConfigError::invalid("motion", "tolerances must be positive"));
        }
        if m.thru_tolerance < m.drive_tolerance {
            return Err(ConfigError::invalid(
                "motion.thru_tolerance",
                "must not be tighter than drive_tolerance",
            ));
        }

        self.lift.validate("lift")?;
        self.tilt.validate("tilt")?;
        self.servo.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        RobotConfig::default().validate().unwrap();
    }

    #[test]
    fn json_round_trip() {
        let config = RobotConfig::default();
        let text = config.to_json().unwrap();
        let back = RobotConfig::from_json(&text).unwrap();
        assert_eq!(back.motion.default_timeout_ms, config.motion.default_timeout_ms);
        assert_eq!(back.lift.timeout_ms, config.lift.timeout_ms);
        approx::assert_relative_eq!(back.odometry.vertical.offset, config.odometry.vertical.offset);
    }

    #[test]
    fn rejects_bad_floor() {
        let err = RobotConfig::from_json(r#"{ "motion": { "min_drive_power": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "motion.min_drive_power",
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(RobotConfig::from_json("{ motion"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn thru_tolerance_cannot_be_tighter() {
        let mut config = RobotConfig::default();
        config.motion.thru_tolerance = 0.1;
        assert!(config.validate().is_err());
    }
}
