//! Whole missions against the simulated robot.

mod common;

use std::{
    thread,
    time::{Duration, Instant},
};

use approx::assert_abs_diff_eq;
use common::SimRobot;
use talos::{
    auton::{
        mission::{self, BASKET_POSE},
        options::{AutonOptions, ParkLocation, ScoringMode},
    },
    field::{Alliance, RunFrame, RunPose, left_start},
    mechanism::setpoints,
    opcontrol::buttons::{Button, GamepadState},
};

fn basket_in_field(alliance: Alliance) -> talos::field::FieldCoordinate {
    let (forward, lateral, heading) = BASKET_POSE;
    RunFrame::new(left_start(alliance)).to_field(RunPose::new(forward, lateral, heading))
}

#[test]
fn specimen_and_cycles_end_at_the_basket() {
    let robot = SimRobot::new();
    robot.bot.place(left_start(Alliance::Blue));
    let mut seq = robot.sequencer(AutonOptions {
        park: ParkLocation::None,
        ..AutonOptions::default()
    });

    let report = seq.run();

    assert!(!report.cancelled);
    assert_eq!(report.timeouts, 0);
    assert_eq!(report.completed, [
        "preload specimen",
        "approach spikes",
        "cycle 1",
        "cycle 2",
        "cycle 3"
    ]);

    let truth = robot.bot.pose();
    let basket = basket_in_field(Alliance::Blue);
    assert_abs_diff_eq!(truth.x, basket.x, epsilon = 1.0);
    assert_abs_diff_eq!(truth.y, basket.y, epsilon = 1.0);
    assert_abs_diff_eq!(
        (truth.t - basket.t).wrapped().as_degrees(),
        0.0,
        epsilon = 2.0
    );

    // Odometry agrees with where the robot really is.
    let estimate = seq.drive().odometry().pose();
    assert_abs_diff_eq!(estimate.x, truth.x, epsilon = 0.5);
    assert_abs_diff_eq!(estimate.y, truth.y, epsilon = 0.5);

    let intake = robot.intake.history();
    assert!(intake.contains(&setpoints::intake::RELEASE));
    assert_eq!(intake.iter().filter(|&&p| p == setpoints::intake::EJECT).count(), 3);
    assert_eq!(robot.bot.last_command().map(|c| c.is_zero()), Some(true));
}

#[test]
fn red_alliance_runs_the_mirrored_mission() {
    let robot = SimRobot::new();
    robot.bot.place(left_start(Alliance::Red));
    let mut seq = robot.sequencer(AutonOptions {
        scoring: ScoringMode::Sample,
        cycles: 1,
        park: ParkLocation::None,
        ..AutonOptions::default()
    });
    seq.init_loop(GamepadState::with(Button::Cross));
    assert_eq!(seq.options().alliance, Alliance::Red);

    let report = seq.run();
    assert!(!report.cancelled);

    let truth = robot.bot.pose();
    let basket = basket_in_field(Alliance::Red);
    assert_abs_diff_eq!(truth.x, basket.x, epsilon = 1.0);
    assert_abs_diff_eq!(truth.y, basket.y, epsilon = 1.0);
}

#[test]
fn stop_mid_mission_halts_everything() {
    let robot = SimRobot::new();
    robot.bot.place(left_start(Alliance::Blue));
    let mut seq = robot.sequencer(AutonOptions::default());

    let stopper = {
        let signal = robot.signal.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            signal.stop();
        })
    };
    let started = Instant::now();
    let report = seq.run();
    stopper.join().unwrap();

    assert!(report.cancelled);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!report.completed.iter().any(|p| p == "level one ascent"));
    assert_eq!(robot.bot.last_command().map(|c| c.is_zero()), Some(true));
    assert_eq!(robot.lift.power(), 0.0);
    assert_eq!(robot.tilt.power(), 0.0);
    assert_eq!(robot.intake.last(), Some(0.0));
}

#[test]
fn park_only_with_delay() {
    let robot = SimRobot::new();
    robot.bot.place(left_start(Alliance::Blue));
    let options = AutonOptions {
        park_only: true,
        start_delay: Duration::from_millis(200),
        ..AutonOptions::default()
    };
    let phases = mission::build(&options);
    assert_eq!(phases.len(), 2);

    let mut seq = robot.sequencer(options);
    let started = Instant::now();
    let report = seq.run();
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(report.completed, ["start delay", "level one ascent"]);
    // The slide never reached for a sample.
    assert!(!robot.intake.history().contains(&setpoints::intake::COLLECT));
}

#[test]
fn odometry_check_mission_lands_on_the_tape_marks() {
    let robot = SimRobot::new();
    let mut seq = robot.sequencer(AutonOptions::default());
    seq.drive_mut().reset(talos::field::FieldCoordinate::origin());

    let report = seq.run_phases(&mission::odometry_check());
    assert_eq!(report.completed, ["odometry check"]);
    let run = seq.drive().odometry().run_pose();
    assert_abs_diff_eq!(run.forward, 12.0, epsilon = 0.6);
    assert_abs_diff_eq!(run.lateral, 12.0, epsilon = 0.6);
    assert_abs_diff_eq!(run.heading_deg, 90.0, epsilon = 1.6);
}

#[test]
fn gyro_check_mission_turns_forty_five() {
    let robot = SimRobot::new();
    let mut seq = robot.sequencer(AutonOptions::default());
    seq.drive_mut().reset(talos::field::FieldCoordinate::origin());

    let report = seq.run_phases(&mission::gyro_check());
    assert_eq!(report.completed, ["gyro check"]);
    assert_abs_diff_eq!(seq.drive().odometry().gyro_heading(), 45.0, epsilon = 1.6);
}
