//! Fixed-period control loop plumbing.
//!
//! Every blocking loop in the crate (motion primitives, sequencer waits,
//! timed pauses) runs on a [`ControlLoop`]: check the run signal, do one
//! step, sleep one period. Nothing busy-waits and nothing backs off.

use std::{
    thread,
    time::{Duration, Instant},
};

use crate::peripherals::RunSignal;

/// Work done on every tick of a blocking loop, such as stepping the
/// mechanism controllers while the drivetrain moves.
pub trait LoopHook {
    fn every_loop(&mut self);
}

impl LoopHook for () {
    fn every_loop(&mut self) {}
}

/// A hard time limit that may be absent.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit:   Option<Duration>,
}

impl Deadline {
    pub fn after(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration { self.started.elapsed() }

    pub fn expired(&self) -> bool { self.limit.is_some_and(|l| self.started.elapsed() >= l) }
}

/// Sleep cadence plus the run signal it honours.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use talos::motion::control::ControlLoop;
/// use talos::peripherals::RunSignal;
///
/// let signal = RunSignal::new();
/// let control = ControlLoop::new(Duration::from_millis(1), signal.clone());
/// assert!(control.pause(Duration::from_millis(5), &mut ()));
///
/// signal.stop();
/// assert!(!control.pause(Duration::from_secs(60), &mut ()));
/// ```
#[derive(Debug, Clone)]
pub struct ControlLoop {
    period: Duration,
    signal: RunSignal,
}

impl ControlLoop {
    pub fn new(period: Duration, signal: RunSignal) -> Self { Self { period, signal } }

    pub fn period(&self) -> Duration { self.period }

    pub fn signal(&self) -> &RunSignal { &self.signal }

    pub fn is_active(&self) -> bool { self.signal.is_active() }

    /// Sleeps one period.
    pub fn tick(&self) { thread::sleep(self.period) }

    /// Waits `duration` in period-sized slices, running `hook` every slice.
    ///
    /// Returns `false` if the run signal dropped before the time was up.
    pub fn pause(&self, duration: Duration, hook: &mut impl LoopHook) -> bool {
        let deadline = Deadline::after(Some(duration));
        while !deadline.expired() {
            if !self.is_active() {
                return false;
            }
            let left = duration.saturating_sub(deadline.elapsed());
            thread::sleep(self.period.min(left));
            hook.every_loop();
        }
        self.is_active()
    }
}
