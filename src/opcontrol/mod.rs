//! Operator control for the driver-controlled period.
//!
//! This module turns gamepad snapshots into drivetrain commands. The
//! gamepad hardware is polled elsewhere; everything here works on plain
//! [`GamepadState`](buttons::GamepadState) values, which keeps it testable.
//!
//! # Features
//!
//! - **Edge detection**: Mode buttons act once per press.
//! - **Drive modes**: Single-wheel diagnostics, robot-centric and
//!   driver-centric mecanum driving.
//! - **Fine control**: The dpad nudges the robot at low fixed power.
//!
//! # Example
//!
//! ```
//! use talos::math::Angle;
//! use talos::motion::mecanum::WheelPowers;
//! use talos::opcontrol::buttons::{ButtonEdges, GamepadState};
//! use talos::opcontrol::drive::TeleopDrive;
//!
//! let mut drive = TeleopDrive::default();
//! let mut edges = ButtonEdges::default();
//!
//! edges.capture(GamepadState { dpad_up: true, ..GamepadState::default() });
//! let powers = drive.process(&edges, Angle::ZERO);
//! assert_eq!(powers, WheelPowers::uniform(0.3));
//! ```

/// Gamepad snapshots and press detection.
pub mod buttons;

/// Teleop drive modes and stick shaping.
///
/// Provides [`TeleopDrive`](drive::TeleopDrive), which maps a gamepad to
/// mecanum wheel powers.
pub mod drive;
