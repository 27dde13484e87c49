//! Field poses and the shared robot pose handle.
//!
//! The field frame has its origin at the bottom-left corner of the field as
//! seen from the blue alliance wall, x to the right, y away from the wall,
//! and headings counter-clockwise from +x. All lengths are inches.
//!
//! # Example
//!
//! ```
//! use talos::field::{FieldCoordinate, SharedPose};
//! use talos::math::Angle;
//!
//! let pose = SharedPose::new(FieldCoordinate::origin());
//! pose.set_location(24.0, 36.0, Angle::from_degrees(90.0));
//!
//! let snap = pose.snapshot();
//! assert_eq!((snap.x, snap.y), (24.0, 36.0));
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::math::Angle;

/// A 2D position with heading.
///
/// Used both for fixed landmarks (marker placements) and for the robot pose.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldCoordinate {
    /// The x-coordinate in inches.
    pub x: f64,
    /// The y-coordinate in inches.
    pub y: f64,
    /// The heading, counter-clockwise from +x.
    pub t: Angle,
}

impl FieldCoordinate {
    pub const fn new(x: f64, y: f64, t: Angle) -> Self { Self { x, y, t } }

    /// Creates a coordinate at the field origin with heading 0.
    pub const fn origin() -> Self { Self::new(0.0, 0.0, Angle::ZERO) }

    /// Creates a coordinate from a heading given in degrees.
    pub fn from_degrees(x: f64, y: f64, degrees: f64) -> Self {
        Self::new(x, y, Angle::from_degrees(degrees))
    }

    /// Overwrites all three components in place.
    pub fn set_location(&mut self, x: f64, y: f64, t: Angle) {
        self.x = x;
        self.y = y;
        self.t = t;
    }

    /// Straight-line distance to another coordinate.
    pub fn distance_to(&self, other: &FieldCoordinate) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// State guarded by [`SharedPose`].
#[derive(Debug, Clone, Copy)]
struct PoseState {
    pose:        FieldCoordinate,
    /// Bumped on every marker fix so that odometry can re-base its heading.
    corrections: u64,
}

/// The one robot pose of a run, shared between the vision producer thread,
/// the odometry tracker and the motion primitives.
///
/// Every read and write of the three components happens under a single lock
/// acquisition, so readers never see a half-applied update.
#[derive(Debug, Clone)]
pub struct SharedPose {
    state: Arc<Mutex<PoseState>>,
}

impl SharedPose {
    pub fn new(pose: FieldCoordinate) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoseState {
                pose,
                corrections: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoseState> {
        self.state.lock().unwrap_or_else(|e| {
            warn!("Pose lock poisoned, recovering last value");
            e.into_inner()
        })
    }

    /// Returns a consistent copy of the current pose.
    pub fn snapshot(&self) -> FieldCoordinate { self.lock().pose }

    /// Returns the current pose together with the marker-correction count.
    pub fn snapshot_with_corrections(&self) -> (FieldCoordinate, u64) {
        let s = self.lock();
        (s.pose, s.corrections)
    }

    /// Number of marker corrections applied so far.
    pub fn corrections(&self) -> u64 { self.lock().corrections }

    /// Applies an absolute marker fix.
    pub fn set_location(&self, x: f64, y: f64, t: Angle) {
        let mut s = self.lock();
        s.pose.set_location(x, y, t);
        s.corrections += 1;
    }

    /// Replaces the pose without counting it as a marker correction.
    ///
    /// Used when a run is reset to its start position.
    pub fn reset(&self, pose: FieldCoordinate) {
        let mut s = self.lock();
        s.pose = pose;
    }

    /// Runs `f` on the pose under the lock and returns its result.
    ///
    /// `f` also receives the correction count observed under the same lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut FieldCoordinate, u64) -> R) -> R {
        let mut s = self.lock();
        let corrections = s.corrections;
        f(&mut s.pose, corrections)
    }
}

impl Default for SharedPose {
    fn default() -> Self { Self::new(FieldCoordinate::origin()) }
}

/// A pose expressed relative to the start of a run.
///
/// `forward` runs along the start heading, `lateral` to the right of it, and
/// `heading_deg` is clockwise from the start heading. Autonomous waypoints are
/// written in this frame so they stay valid for any start tile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPose {
    pub forward:     f64,
    pub lateral:     f64,
    pub heading_deg: f64,
}

impl RunPose {
    pub const fn new(forward: f64, lateral: f64, heading_deg: f64) -> Self {
        Self {
            forward,
            lateral,
            heading_deg,
        }
    }
}

/// Conversion between the field frame and a run frame anchored at `origin`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunFrame {
    pub origin: FieldCoordinate,
}

impl RunFrame {
    pub const fn new(origin: FieldCoordinate) -> Self { Self { origin } }

    /// Converts a run-frame pose to the field frame.
    pub fn to_field(&self, run: RunPose) -> FieldCoordinate {
        let (s, c) = (self.origin.t.sin(), self.origin.t.cos());
        FieldCoordinate {
            x: self.origin.x + run.forward * c + run.lateral * s,
            y: self.origin.y + run.forward * s - run.lateral * c,
            t: self.origin.t - Angle::from_degrees(run.heading_deg),
        }
    }

    /// Converts a field pose into this run frame.
    pub fn to_run(&self, field: FieldCoordinate) -> RunPose {
        let (s, c) = (self.origin.t.sin(), self.origin.t.cos());
        let (dx, dy) = (field.x - self.origin.x, field.y - self.origin.y);
        RunPose {
            forward:     dx * c + dy * s,
            lateral:     dx * s - dy * c,
            heading_deg: (self.origin.t - field.t).as_degrees(),
        }
    }
}
