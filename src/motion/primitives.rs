//! Blocking closed-loop drive moves.
//!
//! Each primitive runs its own [`ControlLoop`] until the move completes, its
//! hard timeout expires, or the run signal drops. On every tick it updates
//! odometry, computes one command, checks the run signal, writes the wheels,
//! and runs the caller's [`LoopHook`] so mechanisms keep moving during the
//! drive.
//!
//! Targets for [`drive_to_position`](MotionPrimitives::drive_to_position) are
//! in the run frame: inches forward and to the right of the start pose, and
//! degrees clockwise from the start heading.
//!
//! # Example
//!
//! ```
//! use talos::config::{MotionTuning, speed};
//! use talos::field::{FieldCoordinate, SharedPose};
//! use talos::motion::odom::{devices::OdometryConfig, tracker::OdometryTracker};
//! use talos::motion::primitives::{CompletionMode, MotionOutcome, MotionPrimitives, MotionTarget};
//! use talos::peripherals::RunSignal;
//! use talos::sim::SimBot;
//!
//! let bot = SimBot::new();
//! let odom = OdometryTracker::new(Box::new(bot.sensors()), OdometryConfig::default(), SharedPose::default());
//! let tuning = MotionTuning { loop_period_ms: 1, ..MotionTuning::default() };
//! let mut drive = MotionPrimitives::new(Box::new(bot.motors()), odom, tuning, RunSignal::new());
//! drive.reset(FieldCoordinate::from_degrees(96.0, 8.5, 90.0));
//!
//! let target = MotionTarget::new(12.0, 0.0, 0.0, speed::DRIVE_50, speed::TURN_20, CompletionMode::DriveTo);
//! assert_eq!(drive.drive_to_position(target, &mut ()), MotionOutcome::Reached);
//! assert!((drive.odometry().pose().y - 20.5).abs() < 0.5);
//! ```

use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{
    control::{ControlLoop, Deadline, LoopHook},
    mecanum::{WheelPowers, mix},
    odom::tracker::OdometryTracker,
};
use crate::{
    config::MotionTuning,
    field::FieldCoordinate,
    math::{Angle, abscap, with_floor},
    peripherals::{DriveMotors, RunSignal},
};

/// How a move finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionMode {
    /// Settle inside the tight tolerance and stop the wheels.
    #[default]
    DriveTo,
    /// Pass inside the loose tolerance and keep the wheels running into the
    /// next move.
    DriveThru,
}

/// Which tracking wheel a gyro drive measures distance on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveAxis {
    /// Forward and backward.
    Forward,
    /// Strafing, positive to the right.
    Lateral,
}

/// One closed-loop position move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionTarget {
    /// Inches along the start heading.
    pub forward:     f64,
    /// Inches to the right of the start heading.
    pub lateral:     f64,
    /// Degrees clockwise from the start heading.
    pub heading_deg: f64,
    /// Drive power cap.
    pub drive_speed: f64,
    /// Turn power cap.
    pub turn_speed:  f64,
    pub mode:        CompletionMode,
    /// Hard limit; the tuning default applies when `None`.
    pub timeout:     Option<Duration>,
}

impl MotionTarget {
    pub fn new(
        forward: f64,
        lateral: f64,
        heading_deg: f64,
        drive_speed: f64,
        turn_speed: f64,
        mode: CompletionMode,
    ) -> Self {
        Self {
            forward,
            lateral,
            heading_deg,
            drive_speed,
            turn_speed,
            mode,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// How a primitive ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionOutcome {
    /// Settled at the target, wheels stopped.
    Reached,
    /// Passed through the target, wheels still running.
    Passed,
    /// Hard timeout expired, wheels stopped.
    TimedOut,
    /// The run signal dropped, wheels stopped.
    Cancelled,
}

impl MotionOutcome {
    pub fn is_cancelled(self) -> bool { self == MotionOutcome::Cancelled }
}

/// The drivetrain together with the odometry that closes its loops.
pub struct MotionPrimitives {
    motors:   Box<dyn DriveMotors>,
    odom:     OdometryTracker,
    tuning:   MotionTuning,
    control:  ControlLoop,
    /// The wheels were left running by the last write.
    coasting: bool,
}

impl MotionPrimitives {
    pub fn new(motors: Box<dyn DriveMotors>, odom: OdometryTracker, tuning: MotionTuning, signal: RunSignal) -> Self {
        Self {
            motors,
            odom,
            control: ControlLoop::new(tuning.loop_period(), signal),
            tuning,
            coasting: false,
        }
    }

    /// Re-anchors odometry and the run frame at `start`.
    pub fn reset(&mut self, start: FieldCoordinate) {
        info!("Odometry reset to ({:.1}, {:.1}, {:.1}°)", start.x, start.y, start.t.as_degrees());
        self.odom.reset(start);
    }

    pub fn odometry(&self) -> &OdometryTracker { &self.odom }

    pub fn odometry_mut(&mut self) -> &mut OdometryTracker { &mut self.odom }

    pub fn tuning(&self) -> &MotionTuning { &self.tuning }

    pub fn control(&self) -> &ControlLoop { &self.control }

    pub fn is_coasting(&self) -> bool { self.coasting }

    /// Commands zero power to all four wheels.
    pub fn stop(&mut self) {
        self.motors.set_powers(WheelPowers::ZERO);
        self.coasting = false;
    }

    fn write(&mut self, powers: WheelPowers) -> bool {
        if !self.control.is_active() {
            return false;
        }
        self.motors.set_powers(powers);
        self.coasting = !powers.is_zero();
        true
    }

    fn cancel(&mut self) -> MotionOutcome {
        self.stop();
        info!("Motion cancelled");
        MotionOutcome::Cancelled
    }

    fn time_out(&mut self, what: &str, deadline: &Deadline) -> MotionOutcome {
        self.stop();
        warn!("{} timed out after {}", what, humantime::format_duration(deadline.elapsed()));
        MotionOutcome::TimedOut
    }

    fn arrive(&mut self, mode: CompletionMode) -> MotionOutcome {
        match mode {
            CompletionMode::DriveTo => {
                if self.coasting {
                    self.stop();
                }
                MotionOutcome::Reached
            }
            CompletionMode::DriveThru => MotionOutcome::Passed,
        }
    }

    fn deadline(&self, timeout: Option<Duration>) -> Deadline {
        Deadline::after(Some(timeout.unwrap_or(self.tuning.default_timeout())))
    }

    fn tolerances(&self, mode: CompletionMode) -> (f64, f64, f64) {
        let t = &self.tuning;
        match mode {
            CompletionMode::DriveTo => (t.drive_tolerance, t.turn_tolerance_deg, t.min_drive_power),
            CompletionMode::DriveThru => (t.thru_tolerance, t.thru_turn_tolerance_deg, t.min_thru_power),
        }
    }

    /// Turn command for a clockwise heading error, as a counter-clockwise
    /// mecanum rotation.
    fn turn_power(&self, error_deg: f64, tolerance_deg: f64, cap: f64) -> f64 {
        if error_deg.abs() <= tolerance_deg {
            return 0.0;
        }
        let cap = cap.abs();
        -with_floor(
            abscap(self.tuning.turn_gain * error_deg, cap),
            self.tuning.min_turn_power.min(cap),
        )
    }

    /// Drives to a run-frame pose, translating and turning at once.
    pub fn drive_to_position(&mut self, target: MotionTarget, hook: &mut impl LoopHook) -> MotionOutcome {
        let (tolerance, turn_tolerance, floor) = self.tolerances(target.mode);
        let deadline = self.deadline(target.timeout);
        debug!(
            "Drive to ({:.1}, {:.1}, {:.1}°) {:?}",
            target.forward, target.lateral, target.heading_deg, target.mode
        );

        loop {
            if !self.control.is_active() {
                return self.cancel();
            }
            self.odom.update();
            let here = self.odom.run_pose();

            let e_forward = target.forward - here.forward;
            let e_lateral = target.lateral - here.lateral;
            let e_heading = Angle::from_degrees(target.heading_deg - here.heading_deg)
                .wrapped()
                .as_degrees();
            let distance = e_forward.hypot(e_lateral);

            if distance <= tolerance && e_heading.abs() <= turn_tolerance {
                return self.arrive(target.mode);
            }
            if deadline.expired() {
                return self.time_out("Drive to position", &deadline);
            }

            // Rotate the run-frame error into the robot frame.
            let psi = Angle::from_degrees(here.heading_deg);
            let (s, c) = (psi.sin(), psi.cos());
            let robot_forward = e_forward * c + e_lateral * s;
            let robot_right = -e_forward * s + e_lateral * c;

            let (y, x) = if distance > tolerance {
                let cap = target.drive_speed.abs();
                let power = with_floor((self.tuning.drive_gain * distance).min(cap), floor.min(cap));
                (robot_forward / distance * power, robot_right / distance * power)
            } else {
                (0.0, 0.0)
            };
            let rotation = self.turn_power(e_heading, turn_tolerance, target.turn_speed);

            if !self.write(mix(y, x, rotation)) {
                return self.cancel();
            }
            hook.every_loop();
            self.control.tick();
        }
    }

    /// Drives `distance` inches along one robot axis while holding a gyro
    /// heading (degrees clockwise since reset; the current heading when
    /// `None`). `timeout` falls back to the tuning default.
    #[allow(clippy::too_many_arguments)]
    pub fn gyro_drive(
        &mut self,
        speed: f64,
        axis: DriveAxis,
        distance: f64,
        heading_deg: Option<f64>,
        mode: CompletionMode,
        timeout: Option<Duration>,
        hook: &mut impl LoopHook,
    ) -> MotionOutcome {
        let (tolerance, _, floor) = self.tolerances(mode);
        let deadline = self.deadline(timeout);
        let hold = heading_deg.unwrap_or_else(|| self.odom.gyro_heading());
        let measure = |odom: &OdometryTracker| {
            let (forward, lateral) = odom.travel();
            match axis {
                DriveAxis::Forward => forward,
                DriveAxis::Lateral => lateral,
            }
        };
        let start = measure(&self.odom);
        debug!("Gyro drive {:?} {:.1}\" holding {:.1}°", axis, distance, hold);

        loop {
            if !self.control.is_active() {
                return self.cancel();
            }
            self.odom.update();
            let remaining = distance - (measure(&self.odom) - start);
            if remaining.abs() <= tolerance {
                return self.arrive(mode);
            }
            if deadline.expired() {
                return self.time_out("Gyro drive", &deadline);
            }

            let cap = speed.abs();
            let power = with_floor(abscap(self.tuning.drive_gain * remaining, cap), floor.min(cap));
            let heading_error = Angle::from_degrees(hold - self.odom.gyro_heading())
                .wrapped()
                .as_degrees();
            let rotation = -abscap(self.tuning.heading_hold_gain * heading_error, cap);
            let powers = match axis {
                DriveAxis::Forward => mix(power, 0.0, rotation),
                DriveAxis::Lateral => mix(0.0, power, rotation),
            };

            if !self.write(powers) {
                return self.cancel();
            }
            hook.every_loop();
            self.control.tick();
        }
    }

    /// Turns in place to a gyro heading (degrees clockwise since reset).
    pub fn gyro_turn(
        &mut self,
        speed: f64,
        heading_deg: f64,
        timeout: Option<Duration>,
        hook: &mut impl LoopHook,
    ) -> MotionOutcome {
        let deadline = self.deadline(timeout);
        let tolerance = self.tuning.turn_tolerance_deg;
        debug!("Gyro turn to {:.1}°", heading_deg);

        loop {
            if !self.control.is_active() {
                return self.cancel();
            }
            self.odom.update();
            let error = Angle::from_degrees(heading_deg - self.odom.gyro_heading())
                .wrapped()
                .as_degrees();
            if error.abs() <= tolerance {
                return self.arrive(CompletionMode::DriveTo);
            }
            if deadline.expired() {
                return self.time_out("Gyro turn", &deadline);
            }

            let rotation = self.turn_power(error, tolerance, speed);
            if !self.write(mix(0.0, 0.0, rotation)) {
                return self.cancel();
            }
            hook.every_loop();
            self.control.tick();
        }
    }

    /// Drives straight at `speed` for `duration` without feedback, then
    /// stops. Negative speeds drive backward.
    pub fn time_drive_straight(&mut self, speed: f64, duration: Duration, hook: &mut impl LoopHook) -> MotionOutcome {
        let deadline = Deadline::after(Some(duration));
        debug!("Timed drive at {:.2} for {}", speed, humantime::format_duration(duration));

        while !deadline.expired() {
            if !self.control.is_active() {
                return self.cancel();
            }
            self.odom.update();
            if !self.write(mix(speed, 0.0, 0.0)) {
                return self.cancel();
            }
            hook.every_loop();
            self.control.tick();
        }
        self.stop();
        MotionOutcome::Reached
    }
}
