//! Teleop drivetrain control.
//!
//! Three drive modes share the mecanum mixing used by autonomous:
//!
//! - **Single wheel**: each stick axis drives one wheel, for diagnosing
//!   wiring and motor direction.
//! - **Standard**: robot-centric; the left stick translates, the right stick
//!   turns. Circle swaps which end of the robot is the front.
//! - **Driver-centric**: the left stick translates relative to the driver,
//!   using the gyro. Holding square while pointing the left stick where the
//!   robot faces sets the reference.
//!
//! Any dpad button overrides the sticks with a slow fixed-power nudge.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::buttons::{Button, ButtonEdges, GamepadState};
use crate::{
    math::Angle,
    motion::mecanum::{WheelPowers, mix, mix_field_centric},
};

/// Stick deflections below this are ignored in single-wheel mode.
const SINGLE_WHEEL_DEADBAND: f64 = 0.02;
/// Stick deflections below this are ignored by the shaping curves.
const STICK_DEADBAND: f64 = 0.05;
/// Wheel power for dpad nudges.
pub const FINE_CONTROL_SPEED: f64 = 0.30;

/// Which teleop mixing is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveMode {
    SingleWheel,
    #[default]
    Standard,
    DriverCentric,
}

impl DriveMode {
    /// Decodes a stored mode number, falling back to `Standard` for anything
    /// unknown.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => DriveMode::SingleWheel,
            2 => DriveMode::Standard,
            3 => DriveMode::DriverCentric,
            other => {
                warn!("Unknown drive mode {}, using standard", other);
                DriveMode::Standard
            }
        }
    }

    pub fn code(self) -> u8 {
        match self {
            DriveMode::SingleWheel => 1,
            DriveMode::Standard => 2,
            DriveMode::DriverCentric => 3,
        }
    }
}

/// Zeroes tiny stick deflections.
pub fn deadband(value: f64, band: f64) -> f64 { if value.abs() < band { 0.0 } else { value } }

/// Multi-segment translation curve: gentle near centre, full power only at
/// the end of travel. Output is clipped to `[-1, 1]`.
pub fn shape_translation(value: f64) -> f64 {
    let v = value.abs();
    if v < STICK_DEADBAND {
        return 0.0;
    }
    let out = if v < 0.50 {
        0.25 * v + 0.040
    } else if v < 0.90 {
        0.75 * v - 0.210
    } else {
        8.0 * v - 6.735
    };
    out.min(1.0).copysign(value)
}

/// Multi-segment rotation curve, at most half power.
pub fn shape_rotation(value: f64) -> f64 {
    let v = value.abs();
    if v < STICK_DEADBAND {
        return 0.0;
    }
    let out = if v < 0.33 {
        0.25 * v + 0.0650
    } else if v < 0.60 {
        0.50 * v - 0.0175
    } else if v < 0.90 {
        0.75 * v - 0.1675
    } else {
        6.00 * v - 4.8925
    };
    (out.min(1.0) / 2.0).copysign(value)
}

/// Teleop drive state carried between loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleopDrive {
    pub mode:        DriveMode,
    /// Standard mode drives with the back of the robot as the front.
    pub backward:    bool,
    /// Use the shaping curves instead of linear stick scaling.
    pub shaped:      bool,
    /// Driver-centric reference: robot heading seen by the driver minus the
    /// gyro heading.
    driver_offset:   Angle,
}

impl Default for TeleopDrive {
    fn default() -> Self {
        Self {
            mode:          DriveMode::Standard,
            backward:      false,
            shaped:        true,
            driver_offset: Angle::ZERO,
        }
    }
}

impl TeleopDrive {
    pub fn new(mode: DriveMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Handles mode buttons and computes this loop's wheel powers.
    ///
    /// `gyro` is the robot heading, counter-clockwise positive.
    pub fn process(&mut self, edges: &ButtonEdges, gyro: Angle) -> WheelPowers {
        self.handle_mode_buttons(edges);
        let pad = edges.state();
        if let Some(nudge) = dpad_nudge(pad) {
            return nudge;
        }
        match self.mode {
            DriveMode::SingleWheel => single_wheel(pad),
            DriveMode::Standard => self.standard(pad),
            DriveMode::DriverCentric => self.driver_centric(pad, gyro),
        }
    }

    fn handle_mode_buttons(&mut self, edges: &ButtonEdges) {
        if edges.pressed(Button::Triangle) {
            self.mode = DriveMode::SingleWheel;
            info!("Drive mode: single wheel");
        }
        if edges.pressed(Button::Square) {
            self.mode = DriveMode::DriverCentric;
            info!("Drive mode: driver-centric");
        }
        if edges.pressed(Button::Circle) {
            if self.mode != DriveMode::Standard {
                self.mode = DriveMode::Standard;
                self.backward = true;
            } else {
                self.backward = !self.backward;
            }
            info!("Drive mode: standard, {}", if self.backward { "backward" } else { "forward" });
        }
    }

    fn sticks(&self, pad: &GamepadState) -> (f64, f64, f64) {
        if self.shaped {
            (
                shape_translation(-pad.left_stick_y),
                shape_translation(pad.left_stick_x),
                shape_rotation(-pad.right_stick_x),
            )
        } else {
            (-pad.left_stick_y, pad.left_stick_x * 1.25, -pad.right_stick_x * 0.50)
        }
    }

    fn standard(&self, pad: &GamepadState) -> WheelPowers {
        let (mut y, mut x, rotation) = self.sticks(pad);
        if self.backward {
            y = -y;
            x = -x;
        }
        mix(y, x, rotation)
    }

    fn driver_centric(&mut self, pad: &GamepadState, gyro: Angle) -> WheelPowers {
        if pad.square {
            // Stick points where the robot front faces, counter-clockwise
            // from straight away from the driver.
            let facing = Angle::from_radians((-pad.left_stick_x).atan2(-pad.left_stick_y));
            self.driver_offset = facing - gyro;
            return WheelPowers::ZERO;
        }
        let (y, x, rotation) = self.sticks(pad);
        mix_field_centric(y, x, rotation, gyro + self.driver_offset)
    }
}

fn dpad_nudge(pad: &GamepadState) -> Option<WheelPowers> {
    let s = FINE_CONTROL_SPEED;
    if pad.dpad_up {
        Some(WheelPowers::uniform(s))
    } else if pad.dpad_down {
        Some(WheelPowers::uniform(-s))
    } else if pad.dpad_left {
        Some(WheelPowers::new(-s, s, s, -s))
    } else if pad.dpad_right {
        Some(WheelPowers::new(s, -s, -s, s))
    } else {
        None
    }
}

fn single_wheel(pad: &GamepadState) -> WheelPowers {
    WheelPowers::new(
        deadband(pad.left_stick_y, SINGLE_WHEEL_DEADBAND),
        deadband(pad.right_stick_y, SINGLE_WHEEL_DEADBAND),
        deadband(pad.left_stick_x, SINGLE_WHEEL_DEADBAND),
        deadband(pad.right_stick_x, SINGLE_WHEEL_DEADBAND),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn edges(state: GamepadState) -> ButtonEdges {
        let mut e = ButtonEdges::default();
        e.capture(state);
        e
    }

    #[test]
    fn unknown_code_falls_back_to_standard() {
        assert_eq!(DriveMode::from_code(3), DriveMode::DriverCentric);
        assert_eq!(DriveMode::from_code(0), DriveMode::Standard);
        assert_eq!(DriveMode::from_code(42), DriveMode::Standard);
        assert_eq!(DriveMode::from_code(DriveMode::SingleWheel.code()), DriveMode::SingleWheel);
    }

    #[test]
    fn shaping_curves_are_continuous_and_odd() {
        assert_eq!(shape_translation(0.03), 0.0);
        assert_relative_eq!(shape_translation(0.5), 0.165, epsilon = 1e-9);
        assert_relative_eq!(shape_translation(0.9), 0.465, epsilon = 1e-9);
        assert_eq!(shape_translation(1.0), 1.0);
        assert_relative_eq!(shape_translation(-0.7), -shape_translation(0.7));
        assert_relative_eq!(shape_rotation(0.6), 0.2825 / 2.0, epsilon = 1e-9);
        assert_eq!(shape_rotation(-1.0), -0.5);
    }

    #[test]
    fn standard_forward_and_backward() {
        let mut drive = TeleopDrive::default();
        let pad = GamepadState {
            left_stick_y: -1.0,
            ..GamepadState::default()
        };
        let p = drive.process(&edges(pad), Angle::ZERO);
        assert_eq!(p, WheelPowers::uniform(1.0));

        let flip = GamepadState {
            circle: true,
            ..pad
        };
        let p = drive.process(&edges(flip), Angle::ZERO);
        assert!(drive.backward);
        assert_eq!(p, WheelPowers::uniform(-1.0));
    }

    #[test]
    fn dpad_overrides_sticks() {
        let mut drive = TeleopDrive::default();
        let pad = GamepadState {
            left_stick_y: -1.0,
            dpad_right: true,
            ..GamepadState::default()
        };
        let p = drive.process(&edges(pad), Angle::ZERO);
        assert_eq!(p, WheelPowers::new(0.3, -0.3, -0.3, 0.3));
    }

    #[test]
    fn single_wheel_maps_axes() {
        let mut drive = TeleopDrive::new(DriveMode::SingleWheel);
        let pad = GamepadState {
            left_stick_y: 0.5,
            right_stick_x: 0.01,
            ..GamepadState::default()
        };
        let p = drive.process(&edges(pad), Angle::ZERO);
        assert_eq!(p, WheelPowers::new(0.5, 0.0, 0.0, 0.0));
    }

    #[test]
    fn driver_centric_follows_driver_reference() {
        let mut drive = TeleopDrive::new(DriveMode::DriverCentric);
        drive.shaped = false;

        // Robot faces the driver's left; driver points the stick left while
        // holding square.
        let set = GamepadState {
            square: true,
            left_stick_x: -1.0,
            ..GamepadState::default()
        };
        assert_eq!(drive.process(&edges(set), Angle::ZERO), WheelPowers::ZERO);

        // Pushing away from the driver is a strafe to the robot's right.
        let push = GamepadState {
            left_stick_y: -1.0,
            ..GamepadState::default()
        };
        let p = drive.process(&edges(push), Angle::ZERO);
        let strafe_right = mix(0.0, 1.0, 0.0);
        for (a, b) in p.to_array().iter().zip(strafe_right.to_array()) {
            assert_relative_eq!(*a, b, epsilon = 1e-9);
        }
    }
}
