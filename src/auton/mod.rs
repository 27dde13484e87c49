//! Autonomous period: options, mission data and the runner.
//!
//! # Module Structure
//!
//! - **[`options`]**: operator choices made on the init menu.
//! - **[`phase`]**: the step and phase records a mission is made of.
//! - **[`mission`]**: builds the phase list for a set of options.
//! - **[`sequencer`]**: interprets the phases against the drivetrain and the
//!   mechanisms, honouring the run signal throughout.
//!
//! # Example
//!
//! ```no_run
//! use talos::auton::{options::AutonOptions, sequencer::Sequencer};
//! # use talos::{config::RobotConfig, field::SharedPose, mechanism::{MechanismHardware, Mechanisms},
//! #     motion::{odom::tracker::OdometryTracker, primitives::MotionPrimitives},
//! #     opcontrol::buttons::GamepadState, peripherals::RunSignal, sim::{SimActuator, SimBot, SimServo}};
//! # let bot = SimBot::new();
//! # let config = RobotConfig::default();
//! # let odom = OdometryTracker::new(Box::new(bot.sensors()), config.odometry, SharedPose::default());
//! # let drive = MotionPrimitives::new(Box::new(bot.motors()), odom, config.motion, RunSignal::new());
//! # let mechanisms = Mechanisms::new(MechanismHardware {
//! #     lift: Box::new(SimActuator::new(200.0)), tilt: Box::new(SimActuator::new(50.0)),
//! #     wrist: Box::new(SimServo::new()), elbow: Box::new(SimServo::new()),
//! #     claw: Box::new(SimServo::new()), intake: Box::new(SimServo::new()),
//! # }, &config);
//! # let started = || true;
//! # let poll_gamepad = GamepadState::default;
//!
//! let mut sequencer = Sequencer::new(drive, mechanisms, AutonOptions::default());
//! while !started() {
//!     sequencer.init_loop(poll_gamepad());
//! }
//! let report = sequencer.run();
//! println!("{:?}", report.completed);
//! ```

/// Mission construction.
pub mod mission;

/// Init-menu options.
pub mod options;

/// Step and phase records.
pub mod phase;

/// The mission runner.
pub mod sequencer;
