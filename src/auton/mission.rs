//! The left-side (basket side) autonomous mission.
//!
//! Drive targets are in the run frame: inches forward and to the right of the
//! start pose, degrees clockwise from the start heading. The same mission
//! runs for either alliance because the run frame follows the start pose.
//!
//! Order of play:
//!
//! 1. Optional start delay.
//! 2. Score the preload, either clipping a specimen on the high chamber or
//!    dropping a sample in the high basket.
//! 3. Collect each spike-mark sample and score it in the basket.
//! 4. Level-one ascent.

use super::{
    options::{AutonOptions, ParkLocation, ScoringMode},
    phase::{Phase, PhaseKind, Step},
};
use crate::{
    config::speed::{DRIVE_20, DRIVE_50, DRIVE_70, DRIVE_90, TURN_20, TURN_30, TURN_50},
    mechanism::{
        DoneWhen,
        MechanismId::{Elbow, Lift, Tilt, Wrist},
        setpoints::{elbow, intake, lift, tilt, wrist},
    },
    motion::primitives::{
        CompletionMode::{DriveThru, DriveTo},
        DriveAxis,
    },
};

/// Where the robot sits to pick up each spike-mark sample.
pub const SPIKE_POSES: [(f64, f64, f64); 3] = [(16.0, -37.0, 0.0), (17.0, -46.0, 0.0), (17.5, -53.0, 7.0)];

/// Where the robot sits to score in the high basket.
pub const BASKET_POSE: (f64, f64, f64) = (3.5, -47.5, -32.0);

/// Builds the phases for a set of options.
///
/// # Example
///
/// ```
/// use talos::auton::{mission, options::AutonOptions, phase::PhaseKind};
///
/// let phases = mission::build(&AutonOptions::default());
/// assert_eq!(phases.iter().filter(|p| p.kind == PhaseKind::Cycle).count(), 3);
///
/// let park_only = AutonOptions { park_only: true, ..AutonOptions::default() };
/// assert_eq!(mission::build(&park_only).len(), 1);
/// ```
pub fn build(options: &AutonOptions) -> Vec<Phase> {
    let mut phases = Vec::new();

    if !options.start_delay.is_zero() {
        phases.push(Phase::new("start delay", PhaseKind::Setup, vec![Step::Pause(
            options.start_delay,
        )]));
    }

    let scoring = !options.park_only;
    if scoring && options.score_preload {
        phases.push(match options.scoring {
            ScoringMode::Specimen => specimen_preload(options.cycles > 0),
            ScoringMode::Sample => sample_preload(),
        });
    }

    if scoring && options.cycles > 0 {
        phases.push(approach_spikes());
        for (i, &spike) in SPIKE_POSES.iter().take(usize::from(options.cycles)).enumerate() {
            let mut steps = collect_sample(spike);
            steps.extend(score_in_basket());
            phases.push(Phase::new(format!("cycle {}", i + 1), PhaseKind::Cycle, steps));
        }
    }

    if options.park == ParkLocation::Ascent {
        phases.push(level_one_ascent());
    }
    phases
}

/// A short check of the gyro primitives against a tape measure: forward
/// 12", right 12", then a 45° clockwise turn.
pub fn gyro_check() -> Vec<Phase> {
    vec![Phase::new("gyro check", PhaseKind::Setup, vec![
        Step::GyroDrive {
            speed:       DRIVE_20,
            axis:        DriveAxis::Forward,
            distance:    12.0,
            heading_deg: None,
            mode:        DriveThru,
            timeout:     None,
        },
        Step::GyroDrive {
            speed:       DRIVE_20,
            axis:        DriveAxis::Lateral,
            distance:    12.0,
            heading_deg: None,
            mode:        DriveTo,
            timeout:     None,
        },
        Step::GyroTurn {
            speed:       TURN_20,
            heading_deg: 45.0,
            timeout:     None,
        },
    ])]
}

/// The same check using odometry moves.
pub fn odometry_check() -> Vec<Phase> {
    vec![Phase::new("odometry check", PhaseKind::Setup, vec![
        Step::drive(12.0, 0.0, 0.0, DRIVE_20, TURN_20, DriveTo),
        Step::drive(12.0, 12.0, 0.0, DRIVE_20, TURN_20, DriveTo),
        Step::drive(12.0, 12.0, 90.0, DRIVE_20, TURN_20, DriveTo),
    ])]
}

fn specimen_preload(cycles_follow: bool) -> Phase {
    let mut steps = vec![
        // Clear the wall before tilting up; the slide would hit it.
        Step::drive(3.0, 0.0, 0.0, DRIVE_70, TURN_20, DriveThru),
        Step::move_to(Tilt, tilt::SPECIMEN_RAISE),
        Step::drive(6.0, 0.0, 0.0, DRIVE_70, TURN_20, DriveThru),
        Step::move_to(Elbow, elbow::BAR),
        Step::move_to(Wrist, wrist::BAR),
        Step::drive(12.0, 3.0, 0.0, DRIVE_70, TURN_20, DriveTo),
        Step::move_to(Lift, lift::SPECIMEN_RAISE),
        Step::drive(35.0, 8.0, 45.0, DRIVE_70, TURN_50, DriveTo),
        Step::await_idle(&[Lift, Tilt]),
        // Clip.
        Step::Intake(intake::HOLD),
        Step::move_to(Tilt, tilt::SPECIMEN_CLIP),
        Step::await_idle(&[Tilt]),
        Step::move_to(Lift, lift::SPECIMEN_CLIP),
        Step::await_idle(&[Lift]),
        Step::Intake(intake::RELEASE),
        Step::pause_ms(750),
        Step::Intake(intake::OFF),
    ];
    if cycles_follow {
        steps.extend([
            Step::move_to(Lift, lift::SECURE),
            Step::await_idle(&[Lift]),
            Step::move_to(Elbow, elbow::GRAB),
            Step::move_to(Wrist, wrist::GRAB),
        ]);
    } else {
        steps.extend(stow_arm());
    }
    Phase::new("preload specimen", PhaseKind::Setup, steps)
}

fn sample_preload() -> Phase {
    let mut steps = vec![Step::drive(3.0, 0.0, 0.0, DRIVE_70, TURN_20, DriveThru)];
    steps.extend(score_in_basket());
    Phase::new("preload sample", PhaseKind::Setup, steps)
}

fn stow_arm() -> [Step; 6] {
    [
        Step::move_to(Lift, lift::ZERO),
        Step::await_idle(&[Lift]),
        Step::move_to(Elbow, elbow::INIT),
        Step::move_to(Wrist, wrist::INIT),
        Step::move_to(Tilt, tilt::ZERO),
        Step::await_idle(&[Tilt]),
    ]
}

fn approach_spikes() -> Phase {
    Phase::new("approach spikes", PhaseKind::Setup, vec![
        Step::drive(16.0, -19.0, 0.0, DRIVE_90, TURN_50, DriveThru),
        Step::move_to(Tilt, tilt::DRIVE),
        Step::move_to(Lift, lift::AUTO_READY),
        Step::move_to(Elbow, elbow::GRAB),
        Step::move_to(Wrist, wrist::GRAB),
    ])
}

fn collect_sample((forward, lateral, heading): (f64, f64, f64)) -> Vec<Step> {
    vec![
        Step::move_to(Tilt, tilt::DRIVE),
        Step::move_to(Lift, lift::AUTO_READY),
        Step::move_to(Elbow, elbow::GRAB),
        Step::move_to(Wrist, wrist::GRAB),
        Step::drive(forward, lateral, heading, DRIVE_90, TURN_50, DriveTo),
        Step::move_to(Tilt, tilt::COLLECT),
        Step::await_idle(&[Tilt]),
        Step::Intake(intake::COLLECT),
        Step::move_slowly(Lift, lift::COLLECT, 0.5),
        Step::await_idle(&[Lift]),
        Step::move_to(Tilt, tilt::DRIVE),
        Step::move_to(Lift, lift::AUTO_READY),
    ]
}

fn score_in_basket() -> Vec<Step> {
    let (forward, lateral, heading) = BASKET_POSE;
    vec![
        Step::await_idle(&[Tilt]),
        Step::move_to(Tilt, tilt::BASKET_PRE),
        Step::drive(forward, lateral, heading, DRIVE_90, TURN_50, DriveTo),
        Step::move_to(Lift, lift::BASKET),
        Step::move_to(Elbow, elbow::SAFE),
        Step::move_to(Wrist, wrist::SCORE),
        Step::await_within(&[Tilt, Lift], DoneWhen::Within(2.0)),
        Step::move_to(Tilt, tilt::BASKET),
        Step::Intake(intake::EJECT),
        Step::move_to(Wrist, wrist::SAFE),
        Step::await_idle(&[Tilt]),
        Step::pause_ms(500),
        Step::Intake(intake::OFF),
        Step::move_to(Elbow, elbow::GRAB),
        Step::move_to(Wrist, wrist::GRAB),
        Step::move_to(Lift, lift::AUTO_READY),
        Step::move_to(Tilt, tilt::DRIVE),
    ]
}

fn level_one_ascent() -> Phase {
    Phase::new("level one ascent", PhaseKind::Park, vec![
        // Back away from the submersible, then around it to the low rung.
        Step::drive(32.0, 6.0, 90.0, DRIVE_50, TURN_50, DriveTo),
        Step::drive(38.0, -27.0, 90.0, DRIVE_50, TURN_30, DriveTo),
        Step::drive(64.0, -27.0, 90.0, DRIVE_70, TURN_50, DriveTo),
        Step::drive(64.0, -15.0, 90.0, DRIVE_20, TURN_20, DriveTo),
        Step::move_to(Lift, lift::GRAB),
        Step::move_to(Tilt, tilt::ASCENT),
        Step::TimedDrive {
            speed:    -DRIVE_20,
            duration: std::time::Duration::from_secs(3),
        },
        Step::await_idle(&[Tilt, Lift]),
    ])
}
