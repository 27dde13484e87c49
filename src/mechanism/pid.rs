//! Position PID for a single motor.
//!
//! Output is `Kp*error + Ki*integral + Kd*derivative`, capped to the allowed
//! power. The integral is clamped so the `Ki` term alone can never exceed the
//! cap.
//!
//! # Tuning
//!
//! Start with Kp and increase until the mechanism reaches the target.
//! Add Kd to reduce overshoot. Only add Ki if it consistently undershoots.

use serde::{Deserialize, Serialize};

use crate::math::abscap;

/// PID gains, in power per unit of error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self { Self { kp, ki, kd } }
}

/// Controller state between steps.
#[derive(Debug, Clone)]
pub struct PositionPid {
    gains:      PidGains,
    integral:   f64,
    prev_error: Option<f64>,
}

impl PositionPid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: None,
        }
    }

    pub fn gains(&self) -> PidGains { self.gains }

    /// Clears the integral and derivative history. Call on every new target.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }

    /// Computes one output for `error` after `dt` seconds, capped to
    /// `±max_power`.
    pub fn step(&mut self, error: f64, dt: f64, max_power: f64) -> f64 {
        let PidGains { kp, ki, kd } = self.gains;
        let cap = max_power.abs();

        self.integral += error * dt;
        if ki != 0.0 {
            let i_max = cap / ki.abs();
            self.integral = self.integral.clamp(-i_max, i_max);
        }

        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        abscap(kp * error + ki * self.integral + kd * derivative, cap)
    }
}
