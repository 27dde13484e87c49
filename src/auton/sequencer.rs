//! The autonomous runner.
//!
//! [`Sequencer`] owns the drivetrain and the mechanisms for the period. Before
//! the start, [`init_loop`](Sequencer::init_loop) takes operator menu input.
//! [`run`](Sequencer::run) then freezes the options, builds the mission and
//! interprets it step by step on the calling thread.
//!
//! The run signal is checked before every phase and every step, and inside
//! every wait. Once it drops, the drivetrain and motor mechanisms are
//! stopped and every remaining phase is skipped.

use std::{
    borrow::Cow,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use super::{
    mission,
    options::AutonOptions,
    phase::{Phase, Step},
};
use crate::{
    field::left_start,
    mechanism::{DoneWhen, MechanismId, Mechanisms, setpoints},
    motion::{
        control::ControlLoop,
        primitives::{MotionOutcome, MotionPrimitives},
    },
    opcontrol::buttons::{Button, ButtonEdges, GamepadState},
};

/// What happened during a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    /// Phases that ran to the end.
    pub completed: Vec<Cow<'static, str>>,
    /// Cycle phases skipped because the cutoff had passed.
    pub skipped:   Vec<Cow<'static, str>>,
    /// Moves that hit their hard timeout.
    pub timeouts:  usize,
    /// The run signal dropped before the mission finished.
    pub cancelled: bool,
    pub elapsed:   Duration,
}

/// Step-level result inside the runner.
enum Flow {
    Continue,
    Cancelled,
}

/// Runs an autonomous mission.
pub struct Sequencer {
    drive:      MotionPrimitives,
    mechanisms: Mechanisms,
    options:    AutonOptions,
    edges:      ButtonEdges,
    poll:       ControlLoop,
    started:    bool,
}

impl Sequencer {
    pub fn new(drive: MotionPrimitives, mechanisms: Mechanisms, options: AutonOptions) -> Self {
        let poll = ControlLoop::new(drive.tuning().poll_interval(), drive.control().signal().clone());
        Self {
            drive,
            mechanisms,
            options,
            edges: ButtonEdges::default(),
            poll,
            started: false,
        }
    }

    pub fn options(&self) -> &AutonOptions { &self.options }

    pub fn drive(&self) -> &MotionPrimitives { &self.drive }

    pub fn drive_mut(&mut self) -> &mut MotionPrimitives { &mut self.drive }

    pub fn mechanisms(&self) -> &Mechanisms { &self.mechanisms }

    pub fn mechanisms_mut(&mut self) -> &mut Mechanisms { &mut self.mechanisms }

    pub fn into_parts(self) -> (MotionPrimitives, Mechanisms) { (self.drive, self.mechanisms) }

    /// One pass of the pre-start loop.
    ///
    /// Right bumper toggles the intake so a preloaded element can be loaded
    /// and held; every other button goes to the options menu. Ignored once
    /// the run has started.
    pub fn init_loop(&mut self, pad: GamepadState) {
        if self.started {
            warn!("Init menu input after start ignored");
            return;
        }
        self.edges.capture(pad);
        if self.edges.pressed(Button::RightBumper) {
            self.mechanisms.intake.toggle(setpoints::intake::HOLD);
        }
        self.options.apply_menu(&self.edges);
    }

    /// Runs the mission built from the current options.
    ///
    /// Odometry is re-anchored at the left start tile of the chosen alliance
    /// so that anything bumped during setup is forgotten.
    pub fn run(&mut self) -> RunReport {
        self.started = true;
        info!("Autonomous start: {}", self.options.summary());
        self.drive.reset(left_start(self.options.alliance));
        let phases = mission::build(&self.options);
        self.run_phases(&phases)
    }

    /// Interprets `phases` in order.
    pub fn run_phases(&mut self, phases: &[Phase]) -> RunReport {
        self.started = true;
        let started = Instant::now();
        let mut report = RunReport::default();

        for phase in phases {
            if !self.poll.is_active() {
                report.cancelled = true;
                break;
            }
            if phase.is_cycle() && started.elapsed() >= self.options.cycle_cutoff {
                info!("Skipping {}: past cycle cutoff", phase.name);
                report.skipped.push(phase.name.clone());
                continue;
            }

            info!("Phase: {} ({} steps)", phase.name, phase.steps.len());
            let mut flow = Flow::Continue;
            for step in &phase.steps {
                if !self.poll.is_active() {
                    flow = Flow::Cancelled;
                    break;
                }
                flow = self.run_step(step, &mut report);
                if matches!(flow, Flow::Cancelled) {
                    break;
                }
            }
            match flow {
                Flow::Continue => report.completed.push(phase.name.clone()),
                Flow::Cancelled => {
                    report.cancelled = true;
                    break;
                }
            }
        }

        self.drive.stop();
        if report.cancelled {
            self.mechanisms.stop_all();
            info!("Autonomous cancelled after {}", humantime::format_duration(started.elapsed()));
        } else {
            info!("Autonomous complete in {}", humantime::format_duration(started.elapsed()));
        }
        report.elapsed = started.elapsed();
        report
    }

    fn run_step(&mut self, step: &Step, report: &mut RunReport) -> Flow {
        debug!("Step: {:?}", step);
        let outcome = match step {
            Step::Drive(target) => self.drive.drive_to_position(*target, &mut self.mechanisms),
            Step::GyroDrive {
                speed,
                axis,
                distance,
                heading_deg,
                mode,
                timeout,
            } => self.drive.gyro_drive(
                *speed,
                *axis,
                *distance,
                *heading_deg,
                *mode,
                *timeout,
                &mut self.mechanisms,
            ),
            Step::GyroTurn {
                speed,
                heading_deg,
                timeout,
            } => self
                .drive
                .gyro_turn(*speed, *heading_deg, *timeout, &mut self.mechanisms),
            Step::TimedDrive { speed, duration } => {
                self.drive.time_drive_straight(*speed, *duration, &mut self.mechanisms)
            }
            Step::Move {
                mechanism,
                target,
                max_velocity,
            } => {
                self.mechanisms.move_to(*mechanism, *target, *max_velocity);
                return Flow::Continue;
            }
            Step::Intake(power) => {
                self.mechanisms.intake.set_power(*power);
                return Flow::Continue;
            }
            Step::AwaitIdle {
                mechanisms,
                done_when,
            } => {
                self.settle_drive();
                return self.await_idle(mechanisms, *done_when);
            }
            Step::Pause(duration) => {
                self.settle_drive();
                return if self.poll.pause(*duration, &mut self.mechanisms) {
                    Flow::Continue
                } else {
                    Flow::Cancelled
                };
            }
        };

        match outcome {
            MotionOutcome::Cancelled => Flow::Cancelled,
            MotionOutcome::TimedOut => {
                report.timeouts += 1;
                Flow::Continue
            }
            MotionOutcome::Reached | MotionOutcome::Passed => Flow::Continue,
        }
    }

    /// Waits never leave the wheels running from a pass-through move.
    fn settle_drive(&mut self) {
        if self.drive.is_coasting() {
            debug!("Stopping coasting drive before wait");
            self.drive.stop();
        }
    }

    /// Polls until none of `ids` is moving, keeping odometry and every
    /// mechanism stepping meanwhile.
    fn await_idle(&mut self, ids: &[MechanismId], done: Option<DoneWhen>) -> Flow {
        while self.mechanisms.any_moving(ids, done) {
            if !self.poll.is_active() {
                return Flow::Cancelled;
            }
            self.poll.tick();
            self.drive.odometry_mut().update();
            self.mechanisms.update();
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{
        auton::phase::PhaseKind,
        config::{
            MotionTuning, RobotConfig,
            speed::{DRIVE_50, TURN_50},
        },
        field::SharedPose,
        mechanism::MechanismHardware,
        motion::{odom::tracker::OdometryTracker, primitives::CompletionMode},
        peripherals::RunSignal,
        sim::{SimActuator, SimBot, SimServo},
    };

    struct Rig {
        bot:    SimBot,
        lift:   SimActuator,
        intake: SimServo,
        signal: RunSignal,
        seq:    Sequencer,
    }

    fn rig(options: AutonOptions) -> Rig {
        let bot = SimBot::new();
        let lift = SimActuator::new(400.0);
        let intake = SimServo::new();
        let signal = RunSignal::new();
        let config = RobotConfig {
            motion: MotionTuning {
                loop_period_ms: 1,
                poll_interval_ms: 1,
                ..MotionTuning::default()
            },
            ..RobotConfig::default()
        };
        let odom = OdometryTracker::new(Box::new(bot.sensors()), config.odometry, SharedPose::default());
        let drive = MotionPrimitives::new(Box::new(bot.motors()), odom, config.motion, signal.clone());
        let mechanisms = Mechanisms::new(
            MechanismHardware {
                lift:   Box::new(lift.clone()),
                tilt:   Box::new(SimActuator::new(100.0)),
                wrist:  Box::new(SimServo::new()),
                elbow:  Box::new(SimServo::new()),
                claw:   Box::new(SimServo::new()),
                intake: Box::new(intake.clone()),
            },
            &config,
        );
        Rig {
            bot,
            lift,
            intake,
            signal,
            seq: Sequencer::new(drive, mechanisms, options),
        }
    }

    #[test]
    fn init_loop_toggles_intake_and_menu() {
        let mut r = rig(AutonOptions::default());
        r.seq.init_loop(GamepadState::with(Button::RightBumper));
        assert_eq!(r.intake.last(), Some(setpoints::intake::HOLD));
        r.seq.init_loop(GamepadState::default());
        r.seq.init_loop(GamepadState::with(Button::RightBumper));
        assert_eq!(r.intake.last(), Some(0.0));

        r.seq.init_loop(GamepadState::with(Button::DpadDown));
        assert_eq!(r.seq.options().cycles, 2);
    }

    #[test]
    fn await_idle_steps_mechanisms_until_done() {
        let mut r = rig(AutonOptions::default());
        let phases = [Phase::new("lift", PhaseKind::Setup, vec![
            Step::move_to(MechanismId::Lift, 6.0),
            Step::await_idle(&[MechanismId::Lift]),
        ])];
        let report = r.seq.run_phases(&phases);
        assert_eq!(report.completed, ["lift"]);
        assert!(!r.seq.mechanisms().is_moving(MechanismId::Lift));
        assert!((r.lift.current_position() / 113.6 - 6.0).abs() < 0.5);
    }

    #[test]
    fn cycles_skipped_after_cutoff() {
        let mut r = rig(AutonOptions {
            cycle_cutoff: Duration::ZERO,
            ..AutonOptions::default()
        });
        let phases = [
            Phase::new("cycle 1", PhaseKind::Cycle, vec![Step::Intake(1.0)]),
            Phase::new("park", PhaseKind::Park, vec![Step::Intake(0.0)]),
        ];
        let report = r.seq.run_phases(&phases);
        assert_eq!(report.skipped, ["cycle 1"]);
        assert_eq!(report.completed, ["park"]);
        assert_eq!(r.intake.history(), [0.0, 0.0]);
    }

    #[test]
    fn stopped_before_start_runs_nothing() {
        let mut r = rig(AutonOptions::default());
        r.signal.stop();
        let report = r.seq.run();
        assert!(report.cancelled);
        assert!(report.completed.is_empty());
        assert!(r.bot.last_command().is_none_or(|c| c.is_zero()));
    }

    #[test]
    fn waits_stop_a_coasting_drive() {
        let mut r = rig(AutonOptions::default());
        let phases = [Phase::new("thru then wait", PhaseKind::Setup, vec![
            Step::drive(10.0, 0.0, 0.0, DRIVE_50, TURN_50, CompletionMode::DriveThru),
            Step::pause_ms(5),
            Step::Intake(1.0),
        ])];
        let report = r.seq.run_phases(&phases);
        assert_eq!(report.completed, ["thru then wait"]);

        // The pause stops the wheels, then the runner's final stop.
        let commands = r.bot.commands();
        let n = commands.len();
        assert!(n >= 3);
        assert!(!commands[n - 3].is_zero());
        assert!(commands[n - 2].is_zero());
        assert!(commands[n - 1].is_zero());
    }

    #[test]
    fn stop_during_pause_skips_the_rest() {
        let mut r = rig(AutonOptions::default());
        let phases = [
            Phase::new("wait", PhaseKind::Setup, vec![Step::Pause(Duration::from_secs(30))]),
            Phase::new("after", PhaseKind::Setup, vec![Step::Intake(1.0)]),
        ];
        let stopper = {
            let signal = r.signal.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                signal.stop();
            })
        };
        let report = r.seq.run_phases(&phases);
        stopper.join().unwrap();
        assert!(report.cancelled);
        assert!(report.completed.is_empty());
        assert!(report.elapsed < Duration::from_secs(5));
        assert_eq!(r.intake.last(), Some(0.0));
    }
}
