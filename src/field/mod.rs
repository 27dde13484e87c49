//! Field geometry: poses, the shared robot pose, and start positions.
//!
//! # Module Structure
//!
//! - **[`coordinate`]**: [`FieldCoordinate`], [`SharedPose`] and the
//!   start-relative [`RunFrame`].
//!
//! The field is a 144" square. Start positions for the red alliance are the
//! blue ones rotated 180° about the field centre.

/// Poses and the lock-guarded shared robot pose.
pub mod coordinate;

pub use coordinate::{FieldCoordinate, RunFrame, RunPose, SharedPose};
use serde::{Deserialize, Serialize};

use crate::math::Angle;

/// Side length of the field in inches.
pub const FIELD_SIZE: f64 = 144.0;

/// Which alliance the robot plays for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alliance {
    Red,
    #[default]
    Blue,
}

impl Alliance {
    pub fn toggled(self) -> Self {
        match self {
            Alliance::Red => Alliance::Blue,
            Alliance::Blue => Alliance::Red,
        }
    }

    /// Maps a blue-side field pose onto this alliance's half of the field.
    pub fn mirror(self, blue: FieldCoordinate) -> FieldCoordinate {
        match self {
            Alliance::Blue => blue,
            Alliance::Red => FieldCoordinate::new(
                FIELD_SIZE - blue.x,
                FIELD_SIZE - blue.y,
                blue.t + Angle::from_degrees(180.0),
            ),
        }
    }
}

/// Field pose of the left (bucket side) start tile for blue, backed against
/// the alliance wall and facing the submersible.
pub fn left_start(alliance: Alliance) -> FieldCoordinate {
    alliance.mirror(FieldCoordinate::from_degrees(96.0, 8.5, 90.0))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn red_start_is_point_mirror_of_blue() {
        let blue = left_start(Alliance::Blue);
        let red = left_start(Alliance::Red);
        assert_relative_eq!(red.x, FIELD_SIZE - blue.x);
        assert_relative_eq!(red.y, FIELD_SIZE - blue.y);
        assert_relative_eq!(red.t.wrapped().as_degrees(), -90.0, epsilon = 1e-9);
    }
}
