//! Kinematic simulation of the robot.
//!
//! [`SimBot`] is an ideal mecanum chassis: wheel powers map straight onto
//! body velocities, with no slip or acceleration limits. Every sensor read
//! advances simulated time by one fixed step, so a loop that reads odometry
//! once per tick moves the robot one step per tick no matter how fast the
//! host runs.
//!
//! The handles returned by [`SimBot::sensors`] and [`SimBot::motors`] share
//! state with the bot, so tests keep the bot to inspect the true pose and the
//! command log while the control code owns the boxed handles.
//!
//! # Example
//!
//! ```
//! use talos::motion::mecanum::WheelPowers;
//! use talos::peripherals::{DriveMotors, DriveSensors};
//! use talos::sim::SimBot;
//!
//! let bot = SimBot::new();
//! let mut motors = bot.motors();
//! let mut sensors = bot.sensors();
//!
//! motors.set_powers(WheelPowers::uniform(0.5));
//! for _ in 0..100 {
//!     sensors.read().unwrap();
//! }
//! // 1 s at half of 50 in/s.
//! assert!((bot.pose().x - 25.0).abs() < 1e-6);
//! ```

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use log::warn;

use crate::{
    error::DeviceError,
    field::FieldCoordinate,
    math::Angle,
    motion::{
        mecanum::WheelPowers,
        odom::{algorithm::rotate_to_field, devices::OdometryConfig},
    },
    peripherals::{DriveMotors, DriveSensors, OdometryReading, PositionActuator, PowerOutput, ServoOutput},
    vision::{Detection, DetectionSource, FtcPose, markers::MarkerReferenceTable},
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| {
        warn!("Sim lock poisoned");
        e.into_inner()
    })
}

/// Physical parameters of the simulated chassis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Translation speed at full power, inches per second.
    pub max_speed:         f64,
    /// Turn rate at full rotation power, degrees per second.
    pub max_turn_rate_deg: f64,
    /// Simulated time per sensor read.
    pub step:              Duration,
    /// Tracking-wheel geometry used to synthesise encoder ticks.
    pub odometry:          OdometryConfig,
    /// Constant gyro offset from the true field heading.
    pub gyro_bias_deg:     f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_speed:         50.0,
            max_turn_rate_deg: 180.0,
            step:              Duration::from_millis(10),
            odometry:          OdometryConfig::default(),
            gyro_bias_deg:     0.0,
        }
    }
}

#[derive(Debug)]
struct SimState {
    config:           SimConfig,
    pose:             FieldCoordinate,
    powers:           WheelPowers,
    vertical_ticks:   f64,
    horizontal_ticks: f64,
    elapsed:          Duration,
    failing_reads:    usize,
    commands:         Vec<WheelPowers>,
}

impl SimState {
    fn step(&mut self) {
        let dt = self.config.step.as_secs_f64();
        let p = self.powers;
        let y = (p.front_left + p.front_right + p.rear_left + p.rear_right) / 4.0;
        let x = (p.front_left + p.rear_right - p.front_right - p.rear_left) / 4.0;
        let r = (p.front_right + p.rear_right - p.front_left - p.rear_left) / 4.0;

        let forward = y * self.config.max_speed * dt;
        let right = x * self.config.max_speed * dt;
        let turn = Angle::from_degrees(r * self.config.max_turn_rate_deg * dt);

        let (dx, dy) = rotate_to_field(forward, right, self.pose.t + turn / 2.0);
        self.pose.x += dx;
        self.pose.y += dy;
        self.pose.t += turn;

        let odo = self.config.odometry;
        let dv = forward + odo.vertical.offset * turn.as_radians();
        let dh = right - odo.horizontal.offset * turn.as_radians();
        self.vertical_ticks += dv / odo.vertical.inches(1.0);
        self.horizontal_ticks += dh / odo.horizontal.inches(1.0);
        self.elapsed += self.config.step;
    }
}

/// A simulated mecanum robot.
#[derive(Debug, Clone)]
pub struct SimBot {
    state: Arc<Mutex<SimState>>,
}

impl SimBot {
    /// A robot at the field origin with default physics.
    pub fn new() -> Self { Self::with_config(SimConfig::default()) }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                config,
                pose: FieldCoordinate::origin(),
                powers: WheelPowers::ZERO,
                vertical_ticks: 0.0,
                horizontal_ticks: 0.0,
                elapsed: Duration::ZERO,
                failing_reads: 0,
                commands: Vec::new(),
            })),
        }
    }

    /// Moves the robot without touching the encoders.
    pub fn place(&self, pose: FieldCoordinate) { lock(&self.state).pose = pose; }

    /// The true pose.
    pub fn pose(&self) -> FieldCoordinate { lock(&self.state).pose }

    pub fn config(&self) -> SimConfig { lock(&self.state).config }

    /// Simulated time since creation.
    pub fn elapsed(&self) -> Duration { lock(&self.state).elapsed }

    /// Makes the next `n` sensor reads fail.
    pub fn fail_reads(&self, n: usize) { lock(&self.state).failing_reads = n; }

    /// Every wheel command written so far, oldest first.
    pub fn commands(&self) -> Vec<WheelPowers> { lock(&self.state).commands.clone() }

    pub fn command_count(&self) -> usize { lock(&self.state).commands.len() }

    pub fn last_command(&self) -> Option<WheelPowers> { lock(&self.state).commands.last().copied() }

    /// The powers currently applied.
    pub fn powers(&self) -> WheelPowers { lock(&self.state).powers }

    pub fn sensors(&self) -> SimSensors {
        SimSensors {
            state: Arc::clone(&self.state),
        }
    }

    pub fn motors(&self) -> SimMotors {
        SimMotors {
            state: Arc::clone(&self.state),
        }
    }

    /// A camera mounted on the robot's front.
    pub fn camera(&self, table: MarkerReferenceTable) -> SimCamera {
        SimCamera {
            bot: self.clone(),
            table,
            max_range: 96.0,
            half_fov_deg: 35.0,
        }
    }
}

impl Default for SimBot {
    fn default() -> Self { Self::new() }
}

/// Sensor handle of a [`SimBot`].
#[derive(Debug)]
pub struct SimSensors {
    state: Arc<Mutex<SimState>>,
}

impl DriveSensors for SimSensors {
    fn read(&mut self) -> Result<OdometryReading, DeviceError> {
        let mut s = lock(&self.state);
        s.step();
        if s.failing_reads > 0 {
            s.failing_reads -= 1;
            return Err(DeviceError::ReadFailed {
                device: "sim odometry",
                reason: "injected failure".to_string(),
            });
        }
        Ok(OdometryReading {
            vertical_ticks:   s.vertical_ticks,
            horizontal_ticks: s.horizontal_ticks,
            heading:          s.pose.t + Angle::from_degrees(s.config.gyro_bias_deg),
        })
    }
}

/// Motor handle of a [`SimBot`].
#[derive(Debug)]
pub struct SimMotors {
    state: Arc<Mutex<SimState>>,
}

impl DriveMotors for SimMotors {
    fn set_powers(&mut self, powers: WheelPowers) {
        let mut s = lock(&self.state);
        s.powers = powers;
        s.commands.push(powers);
    }
}

/// Produces the detections the robot's camera would see from its true pose.
///
/// Readings follow the same wall model the resolver uses, so resolving them
/// gives back the true pose.
#[derive(Debug, Clone)]
pub struct SimCamera {
    bot:          SimBot,
    table:        MarkerReferenceTable,
    max_range:    f64,
    half_fov_deg: f64,
}

impl SimCamera {
    /// Detections for the current true pose.
    pub fn frame(&self) -> Vec<Detection> {
        let robot = self.bot.pose();
        self.table
            .iter()
            .filter_map(|(id, marker)| {
                let (forward, lateral) = marker
                    .wall
                    .camera_offsets(robot.x - marker.pose.x, robot.y - marker.pose.y);
                if forward <= 0.0 {
                    return None;
                }
                let range = forward.hypot(lateral);
                let bearing = lateral.atan2(forward).to_degrees();
                let yaw = (marker.pose.t - robot.t).wrapped().as_degrees();
                let visible = range <= self.max_range
                    && bearing.abs() <= self.half_fov_deg
                    && yaw.abs() <= 2.0 * self.half_fov_deg;
                visible.then(|| Detection::new(id, FtcPose::new(range, bearing, yaw)))
            })
            .collect()
    }
}

impl DetectionSource for SimCamera {
    fn fresh_detections(&mut self) -> Option<Vec<Detection>> { Some(self.frame()) }
}

#[derive(Debug)]
struct ActuatorState {
    position:  f64,
    power:     f64,
    /// Ticks moved per read at full power.
    rate:      f64,
    connected: bool,
}

/// A motor with an encoder whose position advances with power on every read.
#[derive(Debug, Clone)]
pub struct SimActuator {
    state: Arc<Mutex<ActuatorState>>,
}

impl SimActuator {
    pub fn new(rate: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ActuatorState {
                position: 0.0,
                power: 0.0,
                rate,
                connected: true,
            })),
        }
    }

    /// Position without advancing the simulation.
    pub fn current_position(&self) -> f64 { lock(&self.state).position }

    pub fn power(&self) -> f64 { lock(&self.state).power }

    pub fn set_connected(&self, connected: bool) { lock(&self.state).connected = connected; }
}

impl PositionActuator for SimActuator {
    fn position(&mut self) -> Result<f64, DeviceError> {
        let mut s = lock(&self.state);
        if !s.connected {
            return Err(DeviceError::Disconnected("sim actuator"));
        }
        s.position += s.power * s.rate;
        Ok(s.position)
    }

    fn set_power(&mut self, power: f64) { lock(&self.state).power = power.clamp(-1.0, 1.0); }
}

/// A servo or power-only output that records every command.
#[derive(Debug, Clone, Default)]
pub struct SimServo {
    history: Arc<Mutex<Vec<f64>>>,
}

impl SimServo {
    pub fn new() -> Self { Self::default() }

    /// Most recent command.
    pub fn last(&self) -> Option<f64> { lock(&self.history).last().copied() }

    pub fn history(&self) -> Vec<f64> { lock(&self.history).clone() }
}

impl ServoOutput for SimServo {
    fn set_position(&mut self, position: f64) { lock(&self.history).push(position); }
}

impl PowerOutput for SimServo {
    fn set_power(&mut self, power: f64) { lock(&self.history).push(power); }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        field::SharedPose,
        motion::{mecanum::mix, odom::tracker::OdometryTracker},
        vision::markers::MarkerPoseResolver,
    };

    #[test]
    fn spin_in_place_keeps_odometry_still() {
        let bot = SimBot::new();
        let mut motors = bot.motors();
        let mut odom = OdometryTracker::new(Box::new(bot.sensors()), OdometryConfig::default(), SharedPose::default());
        odom.reset(FieldCoordinate::from_degrees(50.0, 50.0, 90.0));
        motors.set_powers(mix(0.0, 0.0, 0.5));
        for _ in 0..100 {
            odom.update();
        }
        let p = odom.pose();
        assert_relative_eq!(p.x, 50.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 50.0, epsilon = 1e-6);
        assert_relative_eq!(odom.gyro_heading(), -90.0, epsilon = 1e-6);
    }

    #[test]
    fn odometry_tracks_strafe_while_turning() {
        let bot = SimBot::new();
        bot.place(FieldCoordinate::from_degrees(20.0, 20.0, 90.0));
        let mut motors = bot.motors();
        let mut odom = OdometryTracker::new(Box::new(bot.sensors()), OdometryConfig::default(), SharedPose::default());
        odom.reset(bot.pose());
        motors.set_powers(mix(0.3, 0.4, 0.2));
        for _ in 0..150 {
            odom.update();
        }
        let (truth, est) = (bot.pose(), odom.pose());
        assert_relative_eq!(est.x, truth.x, epsilon = 0.05);
        assert_relative_eq!(est.y, truth.y, epsilon = 0.05);
        assert_relative_eq!(est.t.as_radians(), truth.t.as_radians(), epsilon = 1e-9);
    }

    #[test]
    fn camera_readings_resolve_to_true_pose() {
        let bot = SimBot::new();
        bot.place(FieldCoordinate::from_degrees(38.0, 100.0, 95.0));
        let table = MarkerReferenceTable::centerstage();
        let frame = bot.camera(table.clone()).frame();
        assert!(!frame.is_empty());
        let resolver = MarkerPoseResolver::new(table);
        for d in &frame {
            let p = resolver.resolve(d).unwrap();
            assert_relative_eq!(p.x, 38.0, epsilon = 1e-9);
            assert_relative_eq!(p.y, 100.0, epsilon = 1e-9);
            assert_relative_eq!(p.t.as_degrees(), 95.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn actuator_moves_with_power() {
        let mut lift = SimActuator::new(10.0);
        lift.set_power(0.5);
        lift.position().unwrap();
        assert_eq!(lift.position().unwrap(), 10.0);
        lift.set_connected(false);
        assert!(lift.position().is_err());
    }
}
