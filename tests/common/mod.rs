//! A simulated robot wired up the way the robot binary wires real hardware.

#![allow(dead_code)]

use talos::{
    auton::{options::AutonOptions, sequencer::Sequencer},
    config::{MotionTuning, RobotConfig},
    field::SharedPose,
    mechanism::{MechanismHardware, Mechanisms},
    motion::{odom::tracker::OdometryTracker, primitives::MotionPrimitives},
    peripherals::RunSignal,
    sim::{SimActuator, SimBot, SimServo},
};

pub struct SimRobot {
    pub bot:    SimBot,
    pub lift:   SimActuator,
    pub tilt:   SimActuator,
    pub claw:   SimServo,
    pub intake: SimServo,
    pub pose:   SharedPose,
    pub signal: RunSignal,
    pub config: RobotConfig,
}

/// Fast loops so a whole mission runs in a few seconds of wall time.
pub fn fast_config() -> RobotConfig {
    RobotConfig {
        motion: MotionTuning {
            loop_period_ms: 1,
            poll_interval_ms: 2,
            ..MotionTuning::default()
        },
        ..RobotConfig::default()
    }
}

impl SimRobot {
    pub fn new() -> Self {
        Self {
            bot:    SimBot::new(),
            lift:   SimActuator::new(300.0),
            tilt:   SimActuator::new(80.0),
            claw:   SimServo::new(),
            intake: SimServo::new(),
            pose:   SharedPose::default(),
            signal: RunSignal::new(),
            config: fast_config(),
        }
    }

    pub fn drive(&self) -> MotionPrimitives {
        let odom = OdometryTracker::new(Box::new(self.bot.sensors()), self.config.odometry, self.pose.clone());
        MotionPrimitives::new(Box::new(self.bot.motors()), odom, self.config.motion, self.signal.clone())
    }

    pub fn mechanisms(&self) -> Mechanisms {
        Mechanisms::new(
            MechanismHardware {
                lift:   Box::new(self.lift.clone()),
                tilt:   Box::new(self.tilt.clone()),
                wrist:  Box::new(SimServo::new()),
                elbow:  Box::new(SimServo::new()),
                claw:   Box::new(self.claw.clone()),
                intake: Box::new(self.intake.clone()),
            },
            &self.config,
        )
    }

    pub fn sequencer(&self, options: AutonOptions) -> Sequencer {
        Sequencer::new(self.drive(), self.mechanisms(), options)
    }
}
