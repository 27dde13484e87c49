//! Arm mechanisms and their non-blocking position control.
//!
//! Every mechanism follows the same pattern: a move is requested with
//! `move_to_target`, the controller is advanced by `update` once per control
//! loop, and the caller polls `is_moving` / `is_moving_within` to decide when
//! to continue. Nothing here ever blocks.
//!
//! # Module Structure
//!
//! - **[`motor`]**: encoder-feedback mechanisms (viper slide, arm tilt).
//! - **[`servo`]**: feedback-free servos with time-based completion.
//! - **[`pid`]**: the position PID the motor mechanisms use.
//! - **[`setpoints`]**: named positions used by the missions.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::RobotConfig,
    motion::control::LoopHook,
    peripherals::{PositionActuator, PowerOutput, ServoOutput},
};

/// Encoder-feedback mechanisms.
pub mod motor;

/// Single-motor position PID.
pub mod pid;

/// Feedback-free positional servos.
pub mod servo;

/// Named mechanism positions.
pub mod setpoints;

pub use motor::{MechanismTarget, MotorMechanism, MotorMechanismConfig};
pub use servo::{ServoConfig, ServoMechanism};

/// When a move counts as done for the purpose of waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DoneWhen {
    /// Within this many units of the target.
    Within(f64),
    /// This long after the move started, even if still travelling.
    After(Duration),
}

/// The mechanisms a sequencer step can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MechanismId {
    Lift,
    Tilt,
    Wrist,
    Elbow,
    Claw,
}

/// The continuous-rotation gecko-wheel intake.
pub struct Intake {
    output: Box<dyn PowerOutput>,
    power:  f64,
}

impl Intake {
    pub fn new(mut output: Box<dyn PowerOutput>) -> Self {
        output.set_power(0.0);
        Self { output, power: 0.0 }
    }

    pub fn set_power(&mut self, power: f64) {
        let power = power.clamp(-1.0, 1.0);
        if power != self.power {
            debug!("Intake power {:.2}", power);
        }
        self.power = power;
        self.output.set_power(power);
    }

    pub fn power(&self) -> f64 { self.power }

    pub fn is_running(&self) -> bool { self.power != 0.0 }

    /// Runs at `power` if stopped, stops if running.
    pub fn toggle(&mut self, power: f64) {
        if self.is_running() {
            self.set_power(0.0);
        } else {
            self.set_power(power);
        }
    }

    pub fn stop(&mut self) { self.set_power(0.0); }
}

/// Every mechanism on the robot.
pub struct Mechanisms {
    pub lift:   MotorMechanism,
    pub tilt:   MotorMechanism,
    pub wrist:  ServoMechanism,
    pub elbow:  ServoMechanism,
    pub claw:   ServoMechanism,
    pub intake: Intake,
}

/// Hardware handles for [`Mechanisms::new`].
pub struct MechanismHardware {
    pub lift:   Box<dyn PositionActuator>,
    pub tilt:   Box<dyn PositionActuator>,
    pub wrist:  Box<dyn ServoOutput>,
    pub elbow:  Box<dyn ServoOutput>,
    pub claw:   Box<dyn ServoOutput>,
    pub intake: Box<dyn PowerOutput>,
}

impl Mechanisms {
    /// Builds the mechanisms in their stowed positions.
    pub fn new(hardware: MechanismHardware, config: &RobotConfig) -> Self {
        Self {
            lift:   MotorMechanism::new("lift", hardware.lift, config.lift),
            tilt:   MotorMechanism::new("tilt", hardware.tilt, config.tilt),
            wrist:  ServoMechanism::new("wrist", hardware.wrist, config.servo, setpoints::wrist::INIT),
            elbow:  ServoMechanism::new("elbow", hardware.elbow, config.servo, setpoints::elbow::INIT),
            claw:   ServoMechanism::new("claw", hardware.claw, config.servo, setpoints::claw::CLOSED),
            intake: Intake::new(hardware.intake),
        }
    }

    /// Starts a move on one mechanism.
    pub fn move_to(&mut self, id: MechanismId, target: f64, max_velocity: Option<f64>) {
        match id {
            MechanismId::Lift => self.lift.move_to_target(target, max_velocity),
            MechanismId::Tilt => self.tilt.move_to_target(target, max_velocity),
            MechanismId::Wrist => self.wrist.move_to_target(target, max_velocity),
            MechanismId::Elbow => self.elbow.move_to_target(target, max_velocity),
            MechanismId::Claw => self.claw.move_to_target(target, max_velocity),
        }
    }

    pub fn is_moving(&self, id: MechanismId) -> bool {
        match id {
            MechanismId::Lift => self.lift.is_moving(),
            MechanismId::Tilt => self.tilt.is_moving(),
            MechanismId::Wrist => self.wrist.is_moving(),
            MechanismId::Elbow => self.elbow.is_moving(),
            MechanismId::Claw => self.claw.is_moving(),
        }
    }

    pub fn is_moving_within(&self, id: MechanismId, done: DoneWhen) -> bool {
        match id {
            MechanismId::Lift => self.lift.is_moving_within(done),
            MechanismId::Tilt => self.tilt.is_moving_within(done),
            MechanismId::Wrist => self.wrist.is_moving_within(done),
            MechanismId::Elbow => self.elbow.is_moving_within(done),
            MechanismId::Claw => self.claw.is_moving_within(done),
        }
    }

    /// Whether any of `ids` should still be waited on.
    ///
    /// `None` means "until the mechanism reports idle".
    pub fn any_moving(&self, ids: &[MechanismId], done: Option<DoneWhen>) -> bool {
        ids.iter().any(|&id| match done {
            Some(d) => self.is_moving_within(id, d),
            None => self.is_moving(id),
        })
    }

    /// Steps every controller once.
    pub fn update(&mut self) {
        self.lift.update();
        self.tilt.update();
        self.wrist.update();
        self.elbow.update();
        self.claw.update();
    }

    /// Abandons motor moves and cuts motor and intake power.
    ///
    /// Servos hold their last commanded position.
    pub fn stop_all(&mut self) {
        self.lift.stop();
        self.tilt.stop();
        self.intake.stop();
    }
}

impl LoopHook for Mechanisms {
    fn every_loop(&mut self) { self.update(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimActuator, SimServo};

    struct Rig {
        lift:   SimActuator,
        intake: SimServo,
        claw:   SimServo,
        mech:   Mechanisms,
    }

    fn rig() -> Rig {
        let lift = SimActuator::new(200.0);
        let intake = SimServo::new();
        let claw = SimServo::new();
        let mech = Mechanisms::new(
            MechanismHardware {
                lift:   Box::new(lift.clone()),
                tilt:   Box::new(SimActuator::new(40.0)),
                wrist:  Box::new(SimServo::new()),
                elbow:  Box::new(SimServo::new()),
                claw:   Box::new(claw.clone()),
                intake: Box::new(intake.clone()),
            },
            &RobotConfig::default(),
        );
        Rig {
            lift,
            intake,
            claw,
            mech,
        }
    }

    #[test]
    fn servos_start_stowed() {
        let r = rig();
        assert_eq!(r.claw.last(), Some(setpoints::claw::CLOSED));
        assert_eq!(r.intake.last(), Some(0.0));
    }

    #[test]
    fn loop_hook_steps_motors() {
        let mut r = rig();
        r.mech.move_to(MechanismId::Lift, 10.0, None);
        assert!(r.mech.any_moving(&[MechanismId::Lift, MechanismId::Claw], None));
        for _ in 0..500 {
            r.mech.every_loop();
        }
        assert!(!r.mech.is_moving(MechanismId::Lift));
        assert!((r.lift.current_position() / 113.6 - 10.0).abs() < 0.5);
    }

    #[test]
    fn stop_all_cuts_power() {
        let mut r = rig();
        r.mech.intake.set_power(setpoints::intake::COLLECT);
        r.mech.move_to(MechanismId::Lift, 20.0, None);
        r.mech.update();
        assert!(r.lift.power() > 0.0);
        r.mech.stop_all();
        assert_eq!(r.lift.power(), 0.0);
        assert_eq!(r.intake.last(), Some(0.0));
        assert!(!r.mech.is_moving(MechanismId::Lift));
    }

    #[test]
    fn intake_toggle() {
        let mut r = rig();
        r.mech.intake.toggle(setpoints::intake::HOLD);
        assert_eq!(r.mech.intake.power(), setpoints::intake::HOLD);
        r.mech.intake.toggle(setpoints::intake::HOLD);
        assert!(!r.mech.intake.is_running());
    }
}
