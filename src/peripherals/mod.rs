//! Hardware seams.
//!
//! The control code talks to motors, servos and sensors only through the
//! traits in this module. A robot build implements them on top of its motor
//! controller SDK; the [`sim`](crate::sim) module implements them for tests
//! and dry runs.
//!
//! Reads return `Result<_, DeviceError>`. Callers log failures and carry on,
//! so a flaky cable costs one control cycle rather than the whole run.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{error::DeviceError, math::Angle, motion::mecanum::WheelPowers};

/// The four mecanum drive motors.
pub trait DriveMotors {
    /// Commands all four wheels. Powers are fractions in `[-1.0, 1.0]`.
    fn set_powers(&mut self, powers: WheelPowers);
}

/// One sample of the dead-reckoning sensors.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OdometryReading {
    /// Cumulative ticks of the forward-facing tracking wheel.
    pub vertical_ticks:   f64,
    /// Cumulative ticks of the strafe tracking wheel (positive to the right).
    pub horizontal_ticks: f64,
    /// Gyro heading, counter-clockwise positive.
    pub heading:          Angle,
}

/// The tracking wheels and gyro.
pub trait DriveSensors {
    fn read(&mut self) -> Result<OdometryReading, DeviceError>;
}

/// A motor with an encoder, such as a lift or tilt motor.
pub trait PositionActuator {
    /// Current encoder position in ticks.
    fn position(&mut self) -> Result<f64, DeviceError>;

    /// Sets the motor power in `[-1.0, 1.0]`.
    fn set_power(&mut self, power: f64);
}

/// A positional servo; `position` is in `[0.0, 1.0]`.
pub trait ServoOutput {
    fn set_position(&mut self, position: f64);
}

/// A continuous-rotation servo or bare motor driven by power alone.
pub trait PowerOutput {
    fn set_power(&mut self, power: f64);
}

/// The single cooperative "run is active" flag.
///
/// Cloned into every blocking loop and into the vision thread. Once stopped it
/// stays stopped for the rest of the run.
///
/// # Example
///
/// ```
/// use talos::peripherals::RunSignal;
///
/// let signal = RunSignal::new();
/// let remote = signal.clone();
/// assert!(signal.is_active());
/// remote.stop();
/// assert!(!signal.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct RunSignal {
    active: Arc<AtomicBool>,
}

impl RunSignal {
    /// Creates an active signal.
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool { self.active.load(Ordering::Acquire) }

    /// Requests every loop holding this signal to stop.
    pub fn stop(&self) { self.active.store(false, Ordering::Release); }
}

impl Default for RunSignal {
    fn default() -> Self { Self::new() }
}
