//! # Talos
//!
//! Talos is the autonomy core of a mecanum competition robot. It keeps one
//! field pose from tracking-wheel odometry corrected by AprilTag sightings,
//! and drives a scripted autonomous mission of closed-loop moves and
//! mechanism actions that a single run signal can stop at any moment.
//!
//! - **Pose estimation**: Marker detections resolved against a wall-mounted
//!   tag table, fused per frame, overlaid on arc-method odometry.
//! - **Motion Control**: Drive-to-position, gyro drive, gyro turn and timed
//!   drive primitives on mecanum kinematics.
//! - **Mechanisms**: Non-blocking PID lift and tilt, time-estimated servos,
//!   and an intake.
//! - **Autonomous**: Missions as data, an init menu, and a cancellable
//!   runner.
//! - **Operator Control**: Teleop drive modes and stick shaping.
//! - **Logging**: A console and file logger for match records.
//!
//! Hardware is reached only through the traits in [`peripherals`]; the
//! [`sim`] module provides a kinematic robot for tests and dry runs.
//!
//! ## Quick Start
//!
//! ```
//! use talos::config::{RobotConfig, speed};
//! use talos::field::{SharedPose, left_start, Alliance};
//! use talos::motion::odom::tracker::OdometryTracker;
//! use talos::motion::primitives::{CompletionMode, MotionOutcome, MotionPrimitives, MotionTarget};
//! use talos::peripherals::RunSignal;
//! use talos::sim::SimBot;
//!
//! let mut config = RobotConfig::default();
//! config.motion.loop_period_ms = 1;
//!
//! let bot = SimBot::new();
//! let pose = SharedPose::default();
//! let odom = OdometryTracker::new(Box::new(bot.sensors()), config.odometry, pose.clone());
//! let mut drive = MotionPrimitives::new(Box::new(bot.motors()), odom, config.motion, RunSignal::new());
//!
//! drive.reset(left_start(Alliance::Blue));
//! let target = MotionTarget::new(12.0, 0.0, 0.0, speed::DRIVE_50, speed::TURN_30, CompletionMode::DriveTo);
//! assert_eq!(drive.drive_to_position(target, &mut ()), MotionOutcome::Reached);
//! ```
//!
//! ## Modules
//!
//! - [`field`]: Poses, the shared pose handle, and start positions.
//! - [`vision`]: Marker resolution and pose fusion.
//! - [`motion`]: Odometry, mecanum kinematics and drive primitives.
//! - [`mechanism`]: Lift, tilt, servos and intake.
//! - [`auton`]: Autonomous options, missions and the sequencer.
//! - [`opcontrol`]: Gamepad handling and teleop drive.
//! - [`config`]: Tunable robot configuration.
//! - [`fs`]: Logging.

/// Autonomous period module.
///
/// Builds a mission from the operator's init-menu choices and runs it:
///
/// - **Options**: Alliance, preload, cycle count, delay, park.
/// - **Missions**: Plain `Vec<Phase>` data.
/// - **Sequencer**: Interprets phases, polls mechanisms, stops on request.
pub mod auton;

/// Robot configuration and speed presets.
pub mod config;

/// Error types for configuration and device access.
pub mod error;

/// Field geometry and the shared robot pose.
pub mod field;

/// Filesystem utilities module.
///
/// Contains the logger that records robot telemetry and debug information
/// to the console and a file.
pub mod fs;

/// Angles and numeric helpers.
pub mod math;

/// Arm mechanisms with non-blocking position control.
pub mod mechanism;

/// Drivetrain motion control module.
///
/// - **Odometry**: Position tracking using tracking wheels and a gyro.
/// - **Mecanum**: Body commands to wheel powers.
/// - **Primitives**: Blocking closed-loop moves.
pub mod motion;

/// Operator control utilities module.
///
/// Maps gamepad snapshots to drive commands during the driver period.
pub mod opcontrol;

/// Hardware traits and the run signal.
pub mod peripherals;

/// Kinematic robot simulation.
pub mod sim;

/// AprilTag pose estimation.
pub mod vision;
