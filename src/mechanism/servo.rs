//! Positional servos without feedback (wrist, elbow, claw).
//!
//! A servo reports nothing back, so completion is estimated from the travel
//! distance: a move over the full `[0, 1]` range takes `full_travel_ms` at
//! full speed, and proportionally longer at a lower velocity fraction. Slow
//! moves are stepped through intermediate positions on every update.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::DoneWhen;
use crate::{error::ConfigError, peripherals::ServoOutput};

/// Slowest allowed velocity fraction.
const MIN_VELOCITY: f64 = 0.05;

/// Timing and range of the arm servos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// Time to sweep the full range at full speed.
    pub full_travel_ms: u64,
    pub min_position:   f64,
    pub max_position:   f64,
}

impl ServoConfig {
    pub fn full_travel(&self) -> Duration { Duration::from_millis(self.full_travel_ms) }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.full_travel_ms == 0 {
            return Err(ConfigError::invalid("servo.full_travel_ms", "must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.min_position)
            || !(0.0..=1.0).contains(&self.max_position)
            || self.min_position >= self.max_position
        {
            return Err(ConfigError::invalid("servo", "position range must be an ordered sub-range of 0..=1"));
        }
        Ok(())
    }
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            full_travel_ms: 900,
            min_position:   0.0,
            max_position:   1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sweep {
    from:     f64,
    to:       f64,
    /// Whether intermediate positions are commanded.
    stepped:  bool,
    started:  Instant,
    duration: Duration,
}

impl Sweep {
    fn fraction(&self) -> f64 {
        if self.duration.is_zero() {
            1.0
        } else {
            (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        }
    }

    fn estimate(&self) -> f64 { self.from + (self.to - self.from) * self.fraction() }
}

/// A positional servo with time-based completion.
///
/// # Example
///
/// ```
/// use talos::mechanism::{ServoConfig, ServoMechanism};
/// use talos::sim::SimServo;
///
/// let servo = SimServo::new();
/// let mut claw = ServoMechanism::new("claw", Box::new(servo.clone()), ServoConfig::default(), 0.3);
/// claw.move_to_target(0.7, None);
/// assert_eq!(servo.last(), Some(0.7));
/// assert!(claw.is_moving());
/// ```
pub struct ServoMechanism {
    name:     &'static str,
    output:   Box<dyn ServoOutput>,
    config:   ServoConfig,
    position: f64,
    sweep:    Option<Sweep>,
}

impl ServoMechanism {
    /// Creates the mechanism and commands `initial` straight away.
    pub fn new(name: &'static str, mut output: Box<dyn ServoOutput>, config: ServoConfig, initial: f64) -> Self {
        let initial = initial.clamp(config.min_position, config.max_position);
        output.set_position(initial);
        Self {
            name,
            output,
            config,
            position: initial,
            sweep: None,
        }
    }

    pub fn name(&self) -> &'static str { self.name }

    /// Estimated current position.
    pub fn position(&self) -> f64 { self.sweep.map_or(self.position, |s| s.estimate()) }

    /// Starts a move, replacing any move still in progress.
    ///
    /// `max_velocity` is a fraction of full speed; below 1.0 the servo is
    /// walked through intermediate positions.
    pub fn move_to_target(&mut self, target: f64, max_velocity: Option<f64>) {
        let target = target.clamp(self.config.min_position, self.config.max_position);
        let from = self.position();
        let velocity = max_velocity.map_or(1.0, |v| v.abs().clamp(MIN_VELOCITY, 1.0));
        let travel = (target - from).abs();
        let duration = self.config.full_travel().mul_f64(travel / velocity);
        let stepped = velocity < 1.0;

        self.output.set_position(if stepped { from } else { target });
        self.position = from;
        self.sweep = Some(Sweep {
            from,
            to: target,
            stepped,
            started: Instant::now(),
            duration,
        });
    }

    /// Advances a stepped move and retires a finished one.
    pub fn update(&mut self) {
        let Some(sweep) = self.sweep else {
            return;
        };
        if sweep.stepped {
            self.output.set_position(sweep.estimate());
        }
        if sweep.fraction() >= 1.0 {
            self.position = sweep.to;
            self.sweep = None;
        }
    }

    pub fn is_moving(&self) -> bool { self.sweep.is_some_and(|s| s.fraction() < 1.0) }

    /// Whether the move should still be waited on under `done`.
    pub fn is_moving_within(&self, done: DoneWhen) -> bool {
        let Some(sweep) = self.sweep else {
            return false;
        };
        match done {
            DoneWhen::Within(units) => (sweep.to - sweep.estimate()).abs() > units,
            DoneWhen::After(limit) => sweep.started.elapsed() < limit && sweep.fraction() < 1.0,
        }
    }
}
