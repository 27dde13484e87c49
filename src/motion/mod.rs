//! Drivetrain motion control.
//!
//! This module provides everything needed to move a mecanum chassis to a
//! place on the field. It includes:
//!
//! - **Odometry**: Position tracking using tracking wheels and a gyro, with
//!   marker fixes overlaid.
//! - **Mecanum kinematics**: Body commands to wheel powers.
//! - **Primitives**: Blocking closed-loop moves that honour the run signal.
//!
//! # Architecture
//!
//! Everything runs on the caller's thread. A primitive owns its loop: each
//! tick it updates odometry, computes and writes one wheel command, runs the
//! caller's hook (usually the mechanism controllers) and sleeps one control
//! period. Only the vision thread runs concurrently, writing marker fixes
//! into the shared pose.
//!
//! # Example
//!
//! ```
//! use talos::config::{MotionTuning, speed};
//! use talos::field::SharedPose;
//! use talos::motion::odom::{devices::OdometryConfig, tracker::OdometryTracker};
//! use talos::motion::primitives::{CompletionMode, MotionPrimitives};
//! use talos::peripherals::RunSignal;
//! use talos::sim::SimBot;
//!
//! let bot = SimBot::new();
//! let odom = OdometryTracker::new(Box::new(bot.sensors()), OdometryConfig::default(), SharedPose::default());
//! let tuning = MotionTuning { loop_period_ms: 1, ..MotionTuning::default() };
//! let mut drive = MotionPrimitives::new(Box::new(bot.motors()), odom, tuning, RunSignal::new());
//!
//! drive.gyro_turn(speed::TURN_30, 45.0, None, &mut ());
//! assert!((drive.odometry().gyro_heading() - 45.0).abs() < 2.0);
//! ```

/// Fixed-period loop, deadlines and per-tick hooks.
pub mod control;

/// Mecanum inverse kinematics.
pub mod mecanum;

/// Odometry tracking for position estimation.
///
/// Provides the [`OdometryTracker`](odom::tracker::OdometryTracker) that
/// integrates the tracking wheels and gyro into the shared pose.
pub mod odom;

/// Closed-loop drive moves.
pub mod primitives;
