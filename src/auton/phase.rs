//! Mission records.
//!
//! A mission is plain data: an ordered list of [`Phase`]s, each an ordered
//! list of [`Step`]s. The [`sequencer`](super::sequencer) interprets them.

use std::{borrow::Cow, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    mechanism::{DoneWhen, MechanismId},
    motion::primitives::{CompletionMode, DriveAxis, MotionTarget},
};

/// One action of a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Drive to a run-frame pose.
    Drive(MotionTarget),
    /// Drive a measured distance along one axis holding a gyro heading.
    GyroDrive {
        speed:       f64,
        axis:        DriveAxis,
        distance:    f64,
        heading_deg: Option<f64>,
        mode:        CompletionMode,
        #[serde(default)]
        timeout:     Option<Duration>,
    },
    /// Turn in place to a gyro heading.
    GyroTurn {
        speed:       f64,
        heading_deg: f64,
        #[serde(default)]
        timeout:     Option<Duration>,
    },
    /// Open-loop straight drive; negative speed backs up.
    TimedDrive { speed: f64, duration: Duration },
    /// Start a mechanism move without waiting for it.
    Move {
        mechanism:    MechanismId,
        target:       f64,
        max_velocity: Option<f64>,
    },
    /// Set the intake wheel power.
    Intake(f64),
    /// Wait until none of `mechanisms` is still moving.
    AwaitIdle {
        mechanisms: Vec<MechanismId>,
        done_when:  Option<DoneWhen>,
    },
    /// Wait a fixed time, stepping mechanisms meanwhile.
    Pause(Duration),
}

impl Step {
    pub fn drive(
        forward: f64,
        lateral: f64,
        heading_deg: f64,
        drive_speed: f64,
        turn_speed: f64,
        mode: CompletionMode,
    ) -> Self {
        Step::Drive(MotionTarget::new(
            forward,
            lateral,
            heading_deg,
            drive_speed,
            turn_speed,
            mode,
        ))
    }

    pub fn move_to(mechanism: MechanismId, target: f64) -> Self {
        Step::Move {
            mechanism,
            target,
            max_velocity: None,
        }
    }

    pub fn move_slowly(mechanism: MechanismId, target: f64, max_velocity: f64) -> Self {
        Step::Move {
            mechanism,
            target,
            max_velocity: Some(max_velocity),
        }
    }

    pub fn await_idle(mechanisms: &[MechanismId]) -> Self {
        Step::AwaitIdle {
            mechanisms: mechanisms.to_vec(),
            done_when:  None,
        }
    }

    pub fn await_within(mechanisms: &[MechanismId], done_when: DoneWhen) -> Self {
        Step::AwaitIdle {
            mechanisms: mechanisms.to_vec(),
            done_when:  Some(done_when),
        }
    }

    pub fn pause_ms(ms: u64) -> Self { Step::Pause(Duration::from_millis(ms)) }
}

/// How the runner treats a phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    #[default]
    Setup,
    /// A collect/score cycle, skipped once the cycle cutoff has passed.
    Cycle,
    Park,
}

/// A named run of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name:  Cow<'static, str>,
    pub kind:  PhaseKind,
    pub steps: Vec<Step>,
}

impl Phase {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: PhaseKind, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            kind,
            steps,
        }
    }

    pub fn is_cycle(&self) -> bool { self.kind == PhaseKind::Cycle }
}
