//! Marker placements and single-detection pose resolution.
//!
//! Every marker is mounted flat on one of the four field walls. The wall
//! decides how the camera-relative `(forward, lateral)` offset maps onto
//! field axes, so the mapping is kept as data on [`Wall`] instead of being
//! branched on marker ids.
//!
//! # Example
//!
//! ```
//! use talos::vision::{Detection, FtcPose};
//! use talos::vision::markers::{MarkerPoseResolver, MarkerReferenceTable};
//!
//! let resolver = MarkerPoseResolver::new(MarkerReferenceTable::centerstage());
//!
//! // Tag 7 on the left wall, 20" away, dead ahead, squared up.
//! let pose = resolver.resolve(&Detection::new(7, FtcPose::new(20.0, 0.0, 0.0))).unwrap();
//! assert!((pose.x - 20.0).abs() < 1e-9);
//! assert!((pose.y - 29.0).abs() < 1e-9);
//!
//! // Too oblique to trust.
//! assert!(resolver.resolve(&Detection::new(7, FtcPose::new(20.0, 0.0, 25.0))).is_none());
//! ```

use std::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};

use super::Detection;
use crate::{field::FieldCoordinate, math::Angle};

/// Detections whose tag plane is turned this far or more from the camera are
/// rejected.
pub const MAX_DETECTION_YAW_DEG: f64 = 20.0;

/// The field wall a marker is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wall {
    /// The far wall (y = 144), markers face -y.
    MaxY,
    /// The near wall (y = 0), markers face +y.
    MinY,
    /// The left wall (x = 0), markers face +x.
    MinX,
    /// The right wall (x = 144), markers face -x.
    MaxX,
}

impl Wall {
    /// Maps a camera-relative offset onto field `(dx, dy)` from the marker to
    /// the robot.
    ///
    /// `forward` is the distance along the camera axis, `lateral` the
    /// distance to the left of it.
    pub fn offsets(self, forward: f64, lateral: f64) -> (f64, f64) {
        match self {
            Wall::MaxY => (lateral, -forward),
            Wall::MinY => (-lateral, forward),
            Wall::MinX => (forward, lateral),
            Wall::MaxX => (-forward, -lateral),
        }
    }

    /// Inverse of [`offsets`](Self::offsets): the `(forward, lateral)` a
    /// camera at field offset `(dx, dy)` from the marker would report.
    pub fn camera_offsets(self, dx: f64, dy: f64) -> (f64, f64) {
        match self {
            Wall::MaxY => (-dy, dx),
            Wall::MinY => (dy, -dx),
            Wall::MinX => (dx, dy),
            Wall::MaxX => (-dx, -dy),
        }
    }
}

/// Where one marker sits on the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerPlacement {
    /// Marker position, with the heading a robot squarely facing it has.
    pub pose: FieldCoordinate,
    pub wall: Wall,
}

impl MarkerPlacement {
    pub fn new(x: f64, y: f64, heading_deg: f64, wall: Wall) -> Self {
        Self {
            pose: FieldCoordinate::from_degrees(x, y, heading_deg),
            wall,
        }
    }
}

/// Immutable marker id to placement map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerReferenceTable {
    markers: BTreeMap<u32, MarkerPlacement>,
}

impl MarkerReferenceTable {
    pub fn new(markers: impl IntoIterator<Item = (u32, MarkerPlacement)>) -> Self {
        Self {
            markers: markers.into_iter().collect(),
        }
    }

    /// The CENTERSTAGE backdrop and audience-wall tags.
    pub fn centerstage() -> Self {
        use Wall::*;
        Self::new([
            (1, MarkerPlacement::new(29.25, 130.25, 90.0, MaxY)),
            (2, MarkerPlacement::new(35.25, 130.25, 90.0, MaxY)),
            (3, MarkerPlacement::new(41.25, 130.25, 90.0, MaxY)),
            (4, MarkerPlacement::new(100.5, 130.25, 90.0, MaxY)),
            (5, MarkerPlacement::new(106.5, 130.25, 90.0, MaxY)),
            (6, MarkerPlacement::new(112.5, 130.25, 90.0, MaxY)),
            (7, MarkerPlacement::new(0.0, 29.0, 180.0, MinX)),
            (8, MarkerPlacement::new(0.0, 34.5, 180.0, MinX)),
            (9, MarkerPlacement::new(34.75, 0.0, 270.0, MinY)),
            (10, MarkerPlacement::new(29.25, 0.0, 270.0, MinY)),
        ])
    }

    pub fn get(&self, id: u32) -> Option<&MarkerPlacement> { self.markers.get(&id) }

    pub fn len(&self) -> usize { self.markers.len() }

    pub fn is_empty(&self) -> bool { self.markers.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &MarkerPlacement)> {
        self.markers.iter().map(|(id, m)| (*id, m))
    }
}

/// Turns one detection into an absolute robot pose.
#[derive(Debug, Clone)]
pub struct MarkerPoseResolver {
    table:   MarkerReferenceTable,
    max_yaw: f64,
}

impl MarkerPoseResolver {
    pub fn new(table: MarkerReferenceTable) -> Self {
        Self {
            table,
            max_yaw: MAX_DETECTION_YAW_DEG,
        }
    }

    /// Overrides the yaw rejection threshold (degrees).
    pub fn with_max_yaw(mut self, degrees: f64) -> Self {
        self.max_yaw = degrees.abs();
        self
    }

    pub fn table(&self) -> &MarkerReferenceTable { &self.table }

    /// Field pose implied by `detection`, or `None` if the detection has no
    /// finite pose, is too oblique, or names a marker that is not in the
    /// table.
    pub fn resolve(&self, detection: &Detection) -> Option<FieldCoordinate> {
        let Some(reading) = detection.ftc_pose else {
            trace!("Tag {} has no pose", detection.id);
            return None;
        };
        if !(reading.range.is_finite() && reading.bearing.is_finite()) {
            trace!("Tag {} rejected, range {} bearing {}", detection.id, reading.range, reading.bearing);
            return None;
        }
        // Written so a NaN yaw fails the check.
        if !(reading.yaw.abs() < self.max_yaw) {
            trace!("Tag {} rejected, yaw {:.1}°", detection.id, reading.yaw);
            return None;
        }
        let Some(marker) = self.table.get(detection.id) else {
            trace!("Tag {} is not on the field map", detection.id);
            return None;
        };

        let bearing = Angle::from_degrees(reading.bearing);
        let forward = reading.range * bearing.cos();
        let lateral = reading.range * bearing.sin();
        let (dx, dy) = marker.wall.offsets(forward, lateral);

        Some(FieldCoordinate::new(
            marker.pose.x + dx,
            marker.pose.y + dy,
            marker.pose.t - Angle::from_degrees(reading.yaw),
        ))
    }
}
