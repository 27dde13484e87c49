//! Encoder-feedback mechanisms (viper slide, arm tilt).

use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{
    DoneWhen,
    pid::{PidGains, PositionPid},
};
use crate::{error::ConfigError, peripherals::PositionActuator};

/// Seconds per update fed to the integral and derivative terms. Callers step
/// mechanisms once per control tick.
const LOOP_DT: f64 = 0.01;

/// Controller settings for one motor mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorMechanismConfig {
    pub gains:          PidGains,
    /// Encoder ticks per mechanism unit (degrees of tilt, inches of slide).
    pub ticks_per_unit: f64,
    /// Target band counted as arrived, in units.
    pub tolerance:      f64,
    /// Power cap when a move gives no velocity limit.
    pub max_power:      f64,
    /// Soft travel limits in units; targets are clamped into them.
    pub min_position:   f64,
    pub max_position:   f64,
    /// A move still unresolved after this long is abandoned.
    pub timeout_ms:     u64,
}

impl MotorMechanismConfig {
    /// Viper slide, in inches of extension.
    pub fn lift() -> Self {
        Self {
            gains:          PidGains::new(0.12, 0.0, 0.001),
            ticks_per_unit: 113.6,
            tolerance:      0.25,
            max_power:      1.0,
            min_position:   0.0,
            max_position:   38.0,
            timeout_ms:     3000,
        }
    }

    /// Arm tilt, in degrees above horizontal.
    pub fn tilt() -> Self {
        Self {
            gains:          PidGains::new(0.03, 0.0, 0.0005),
            ticks_per_unit: 28.0,
            tolerance:      1.0,
            max_power:      0.8,
            min_position:   -5.0,
            max_position:   110.0,
            timeout_ms:     2500,
        }
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }

    pub(crate) fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.ticks_per_unit == 0.0 {
            return Err(ConfigError::invalid(field, "ticks_per_unit must be non-zero"));
        }
        if self.tolerance <= 0.0 {
            return Err(ConfigError::invalid(field, "tolerance must be positive"));
        }
        if !(0.0..=1.0).contains(&self.max_power) || self.max_power == 0.0 {
            return Err(ConfigError::invalid(field, "max_power must be in (0, 1]"));
        }
        if self.min_position >= self.max_position {
            return Err(ConfigError::invalid(field, "min_position must be below max_position"));
        }
        Ok(())
    }
}

impl Default for MotorMechanismConfig {
    fn default() -> Self { Self::lift() }
}

/// An unresolved position request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MechanismTarget {
    pub target:       f64,
    /// Power cap for this move as a fraction of full power.
    pub max_velocity: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveMove {
    goal:    MechanismTarget,
    started: Instant,
}

/// A motor with an encoder driven to targets by a position PID.
///
/// Non-blocking: [`move_to_target`](Self::move_to_target) only records the
/// target, and [`update`](Self::update) must be called every control loop.
///
/// # Example
///
/// ```
/// use talos::mechanism::{DoneWhen, MotorMechanism, MotorMechanismConfig};
/// use talos::sim::SimActuator;
///
/// let motor = SimActuator::new(40.0);
/// let mut tilt = MotorMechanism::new("tilt", Box::new(motor.clone()), MotorMechanismConfig::tilt());
/// tilt.move_to_target(45.0, None);
/// while tilt.is_moving() {
///     tilt.update();
/// }
/// assert!((tilt.position() - 45.0).abs() <= 1.0);
/// assert!(!tilt.is_moving_within(DoneWhen::Within(2.0)));
/// ```
pub struct MotorMechanism {
    name:     &'static str,
    actuator: Box<dyn PositionActuator>,
    config:   MotorMechanismConfig,
    pid:      PositionPid,
    active:   Option<ActiveMove>,
    position: f64,
}

impl MotorMechanism {
    pub fn new(name: &'static str, actuator: Box<dyn PositionActuator>, config: MotorMechanismConfig) -> Self {
        Self {
            name,
            actuator,
            config,
            pid: PositionPid::new(config.gains),
            active: None,
            position: 0.0,
        }
    }

    pub fn name(&self) -> &'static str { self.name }

    /// Last position read, in units.
    pub fn position(&self) -> f64 { self.position }

    /// The unresolved target, if any.
    pub fn target(&self) -> Option<MechanismTarget> { self.active.map(|a| a.goal) }

    /// Starts a move, replacing any move still in progress.
    ///
    /// `max_velocity` caps power as a fraction of full power.
    pub fn move_to_target(&mut self, target: f64, max_velocity: Option<f64>) {
        let clamped = target.clamp(self.config.min_position, self.config.max_position);
        if clamped != target {
            warn!("{} target {:.1} clamped to {:.1}", self.name, target, clamped);
        }
        if let Some(prev) = self.active {
            debug!("{} target {:.1} superseded by {:.1}", self.name, prev.goal.target, clamped);
        }
        self.sample();
        self.pid.reset();
        self.active = Some(ActiveMove {
            goal:    MechanismTarget {
                target: clamped,
                max_velocity,
            },
            started: Instant::now(),
        });
    }

    /// Reads the encoder into `position`.
    fn sample(&mut self) -> bool {
        match self.actuator.position() {
            Ok(ticks) => {
                self.position = ticks / self.config.ticks_per_unit;
                true
            }
            Err(e) => {
                warn!("{} Read Error: {}", self.name, e);
                false
            }
        }
    }

    /// Runs one controller step.
    ///
    /// A failed read cuts power for the cycle; the move stays pending until
    /// a later read or its timeout resolves it.
    pub fn update(&mut self) {
        let fresh = self.sample();
        let Some(active) = self.active else {
            return;
        };

        let error = active.goal.target - self.position;
        if fresh && error.abs() <= self.config.tolerance {
            self.finish();
            debug!("{} reached {:.1}", self.name, active.goal.target);
            return;
        }
        if active.started.elapsed() >= self.config.timeout() {
            self.finish();
            warn!(
                "{} gave up on {:.1} at {:.1} after {}",
                self.name,
                active.goal.target,
                self.position,
                humantime::format_duration(self.config.timeout())
            );
            return;
        }
        if !fresh {
            self.actuator.set_power(0.0);
            return;
        }

        let cap = active
            .goal
            .max_velocity
            .map_or(self.config.max_power, |v| v.abs().min(self.config.max_power));
        let power = self.pid.step(error, LOOP_DT, cap);
        self.actuator.set_power(power);
    }

    fn finish(&mut self) {
        self.active = None;
        self.actuator.set_power(0.0);
    }

    /// Whether a move is still unresolved.
    pub fn is_moving(&self) -> bool { self.active.is_some() }

    /// Whether the move should still be waited on under `done`.
    pub fn is_moving_within(&self, done: DoneWhen) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        match done {
            DoneWhen::Within(units) => (active.goal.target - self.position).abs() > units,
            DoneWhen::After(limit) => active.started.elapsed() < limit,
        }
    }

    /// Abandons any move and cuts power.
    pub fn stop(&mut self) { self.finish(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimActuator;

    fn lift(motor: &SimActuator) -> MotorMechanism {
        MotorMechanism::new("lift", Box::new(motor.clone()), MotorMechanismConfig::lift())
    }

    #[test]
    fn reaches_target_and_cuts_power() {
        let motor = SimActuator::new(200.0);
        let mut m = lift(&motor);
        m.move_to_target(10.0, None);
        for _ in 0..2000 {
            if !m.is_moving() {
                break;
            }
            m.update();
        }
        assert!(!m.is_moving());
        assert!((m.position() - 10.0).abs() <= 0.25);
        assert_eq!(motor.power(), 0.0);
    }

    #[test]
    fn target_is_clamped_to_travel() {
        let motor = SimActuator::new(200.0);
        let mut m = lift(&motor);
        m.move_to_target(500.0, None);
        assert_eq!(m.target().unwrap().target, 38.0);
    }

    #[test]
    fn new_target_supersedes_old() {
        let motor = SimActuator::new(200.0);
        let mut m = lift(&motor);
        m.move_to_target(20.0, None);
        m.update();
        m.move_to_target(0.0, None);
        assert_eq!(m.target().unwrap().target, 0.0);
    }

    #[test]
    fn velocity_limit_caps_power() {
        let motor = SimActuator::new(200.0);
        let mut m = lift(&motor);
        m.move_to_target(30.0, Some(0.5));
        m.update();
        assert_eq!(motor.power(), 0.5);
    }

    #[test]
    fn done_when_within_band() {
        let motor = SimActuator::new(200.0);
        let mut m = lift(&motor);
        m.move_to_target(30.0, None);
        m.update();
        assert!(m.is_moving_within(DoneWhen::Within(5.0)));
        assert!(!m.is_moving_within(DoneWhen::Within(100.0)));
        assert!(!m.is_moving_within(DoneWhen::After(Duration::ZERO)));
    }

    #[test]
    fn stalled_move_times_out() {
        let motor = SimActuator::new(0.0);
        let mut config = MotorMechanismConfig::lift();
        config.timeout_ms = 20;
        let mut m = MotorMechanism::new("lift", Box::new(motor.clone()), config);
        m.move_to_target(10.0, None);
        m.update();
        assert!(m.is_moving());
        std::thread::sleep(Duration::from_millis(30));
        m.update();
        assert!(!m.is_moving());
        assert_eq!(motor.power(), 0.0);
    }

    #[test]
    fn lost_encoder_cuts_power_until_timeout() {
        let motor = SimActuator::new(200.0);
        let mut config = MotorMechanismConfig::lift();
        config.timeout_ms = 20;
        let mut m = MotorMechanism::new("lift", Box::new(motor.clone()), config);
        m.move_to_target(30.0, None);
        m.update();
        assert_eq!(motor.power(), 1.0);

        motor.set_connected(false);
        m.update();
        assert!(m.is_moving());
        assert_eq!(motor.power(), 0.0);

        std::thread::sleep(Duration::from_millis(30));
        m.update();
        assert!(!m.is_moving());
        assert_eq!(motor.power(), 0.0);
    }

    #[test]
    fn band_check_uses_position_at_move_start() {
        let motor = SimActuator::new(200.0);
        let mut raw = motor.clone();
        raw.set_power(1.0);
        for _ in 0..12 {
            raw.position().unwrap();
        }
        raw.set_power(0.0);

        // 2400 ticks is just over 21".
        let mut m = lift(&motor);
        m.move_to_target(21.0, None);
        assert!((m.position() - 2400.0 / 113.6).abs() < 1e-9);
        assert!(!m.is_moving_within(DoneWhen::Within(2.0)));
        assert!(m.is_moving_within(DoneWhen::Within(0.05)));
    }
}
