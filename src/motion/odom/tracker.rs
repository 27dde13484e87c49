//! Odometry tracking controller.
//!
//! [`OdometryTracker`] integrates tracking-wheel and gyro deltas into the
//! shared robot pose. It is stepped from the control thread once per control
//! tick (every motion primitive and every sequencer poll calls
//! [`update`](OdometryTracker::update)).
//!
//! Marker fixes written by the vision thread land in the same
//! [`SharedPose`]. The tracker notices them through the pose's correction
//! counter, re-bases its gyro offset onto the fused heading, and keeps adding
//! its own deltas on top of the fused position.
//!
//! # Example
//!
//! ```
//! use talos::field::{FieldCoordinate, SharedPose};
//! use talos::motion::odom::{devices::OdometryConfig, tracker::OdometryTracker};
//! use talos::sim::SimBot;
//!
//! let bot = SimBot::new();
//! let pose = SharedPose::default();
//! let mut odom = OdometryTracker::new(Box::new(bot.sensors()), OdometryConfig::default(), pose);
//! odom.reset(FieldCoordinate::from_degrees(96.0, 8.5, 90.0));
//! odom.update();
//! assert_eq!(odom.pose().y, 8.5);
//! ```

use log::{debug, warn};

use super::{
    algorithm::{local_displacement, rotate_to_field},
    devices::OdometryConfig,
};
use crate::{
    field::{FieldCoordinate, RunFrame, RunPose, SharedPose},
    math::Angle,
    peripherals::{DriveSensors, OdometryReading},
};

/// Dead-reckoning position tracker.
pub struct OdometryTracker {
    sensors:          Box<dyn DriveSensors>,
    config:           OdometryConfig,
    pose:             SharedPose,
    frame:            RunFrame,
    /// First reading after the last reset.
    origin:           Option<OdometryReading>,
    /// Most recent reading.
    last:             Option<OdometryReading>,
    /// Field heading minus gyro heading.
    heading_offset:   Angle,
    seen_corrections: u64,
}

impl OdometryTracker {
    /// Creates a tracker writing into `pose`.
    ///
    /// Call [`reset`](Self::reset) before the first update of a run.
    pub fn new(sensors: Box<dyn DriveSensors>, config: OdometryConfig, pose: SharedPose) -> Self {
        let origin_pose = pose.snapshot();
        let seen_corrections = pose.corrections();
        Self {
            sensors,
            config,
            pose,
            frame: RunFrame::new(origin_pose),
            origin: None,
            last: None,
            heading_offset: Angle::ZERO,
            seen_corrections,
        }
    }

    /// Places the robot at `start` and zeroes the encoder baselines.
    ///
    /// `start` also becomes the origin of the run frame used by
    /// [`run_pose`](Self::run_pose).
    pub fn reset(&mut self, start: FieldCoordinate) {
        self.pose.reset(start);
        self.frame = RunFrame::new(start);
        self.origin = None;
        self.last = None;
        self.seen_corrections = self.pose.corrections();
        self.update();
    }

    /// Reads the sensors once and integrates the motion since the last read.
    ///
    /// Returns `false` when the sensors could not be read; the pose is then
    /// left alone for this cycle.
    pub fn update(&mut self) -> bool {
        let reading = match self.sensors.read() {
            Ok(r) => r,
            Err(e) => {
                warn!("Odometry Read Error: {}", e);
                return false;
            }
        };

        let Some(prev) = self.last.replace(reading) else {
            // First sample after a reset only establishes the baselines.
            self.origin = Some(reading);
            self.heading_offset = self.frame.origin.t - reading.heading;
            return true;
        };

        let delta_v = self.config.vertical.inches(reading.vertical_ticks - prev.vertical_ticks);
        let delta_h = self
            .config
            .horizontal
            .inches(reading.horizontal_ticks - prev.horizontal_ticks);
        let delta_t = (reading.heading - prev.heading).wrapped();
        let (forward, right) = local_displacement(
            delta_v,
            delta_h,
            delta_t,
            self.config.vertical.offset,
            self.config.horizontal.offset,
        );

        let heading_offset = &mut self.heading_offset;
        let seen = &mut self.seen_corrections;
        self.pose.update(|pose, corrections| {
            if corrections != *seen {
                *heading_offset = pose.t - reading.heading;
                *seen = corrections;
                debug!("Odometry re-based on marker fix at ({:.2}, {:.2})", pose.x, pose.y);
            }
            let avg_t = prev.heading + delta_t / 2.0 + *heading_offset;
            let (dx, dy) = rotate_to_field(forward, right, avg_t);
            pose.x += dx;
            pose.y += dy;
            pose.t = reading.heading + *heading_offset;
        });
        true
    }

    /// Current field pose.
    pub fn pose(&self) -> FieldCoordinate { self.pose.snapshot() }

    /// Current pose relative to the start of the run.
    pub fn run_pose(&self) -> RunPose { self.frame.to_run(self.pose.snapshot()) }

    /// The run frame set by the last reset.
    pub fn frame(&self) -> RunFrame { self.frame }

    /// Handle to the shared pose this tracker writes.
    pub fn shared_pose(&self) -> &SharedPose { &self.pose }

    /// Raw gyro heading since reset, in degrees clockwise positive, wrapped
    /// to `(-180, 180]`. Marker fixes do not affect it.
    pub fn gyro_heading(&self) -> f64 {
        match (self.origin, self.last) {
            (Some(o), Some(l)) => (o.heading - l.heading).wrapped().as_degrees(),
            _ => 0.0,
        }
    }

    /// Raw tracking-wheel travel since reset as `(forward, lateral)` inches.
    pub fn travel(&self) -> (f64, f64) {
        match (self.origin, self.last) {
            (Some(o), Some(l)) => (
                self.config.vertical.inches(l.vertical_ticks - o.vertical_ticks),
                self.config.horizontal.inches(l.horizontal_ticks - o.horizontal_ticks),
            ),
            _ => (0.0, 0.0),
        }
    }
}
