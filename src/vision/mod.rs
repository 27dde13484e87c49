//! Marker-based pose correction.
//!
//! The camera pipeline (an external collaborator) reports each visible
//! AprilTag as a [`Detection`]: the tag id plus the camera-relative range,
//! bearing and yaw. This module turns those into field poses and folds them
//! into the shared robot pose.
//!
//! # Module Structure
//!
//! - **[`markers`]**: the marker reference table and the per-detection
//!   resolver.
//! - **[`fusion`]**: averaging one frame's estimates into the shared pose,
//!   plus the producer thread that pumps frames.
//!
//! # Example
//!
//! ```
//! use talos::field::SharedPose;
//! use talos::vision::{Detection, FtcPose};
//! use talos::vision::fusion::PoseFusionEngine;
//! use talos::vision::markers::{MarkerPoseResolver, MarkerReferenceTable};
//!
//! let pose = SharedPose::default();
//! let engine = PoseFusionEngine::new(
//!     MarkerPoseResolver::new(MarkerReferenceTable::centerstage()),
//!     pose.clone(),
//! );
//!
//! // Tag 2 straight ahead, 30" away.
//! let frame = [Detection::new(2, FtcPose::new(30.0, 0.0, 0.0))];
//! engine.fuse(Some(&frame));
//!
//! let p = pose.snapshot();
//! assert!((p.x - 35.25).abs() < 1e-9);
//! assert!((p.y - 100.25).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Averaging detections into the shared pose.
pub mod fusion;

/// Marker placements and single-detection pose resolution.
pub mod markers;

/// Camera-relative position of a detected marker.
///
/// Lengths are inches, angles degrees, matching what the detector reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FtcPose {
    /// Straight-line distance from the camera to the tag centre.
    pub range:   f64,
    /// Angle the camera would have to turn to face the tag, left positive.
    pub bearing: f64,
    /// Rotation of the tag plane relative to the camera.
    pub yaw:     f64,
}

impl FtcPose {
    pub const fn new(range: f64, bearing: f64, yaw: f64) -> Self { Self { range, bearing, yaw } }
}

/// One tag seen in one camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Tag id from the tag family.
    pub id:       u32,
    /// Geometric reading. `None` when the detector could not solve the tag
    /// pose (tag not in its library, degenerate corners).
    pub ftc_pose: Option<FtcPose>,
}

impl Detection {
    pub const fn new(id: u32, ftc_pose: FtcPose) -> Self {
        Self {
            id,
            ftc_pose: Some(ftc_pose),
        }
    }

    /// A detection without a usable pose.
    pub const fn without_pose(id: u32) -> Self { Self { id, ftc_pose: None } }
}

/// Anything that produces per-frame detection lists.
///
/// Returns `None` when no new frame has arrived since the last call.
pub trait DetectionSource {
    fn fresh_detections(&mut self) -> Option<Vec<Detection>>;
}
