//! Named mechanism positions.
//!
//! Slide positions are inches of extension, tilt positions degrees above
//! horizontal, servo positions fractions of servo travel.

/// Viper slide extension.
pub mod lift {
    pub const ZERO: f64 = 0.0;
    /// Just enough to clear the intake off the floor while driving.
    pub const AUTO_READY: f64 = 2.5;
    pub const GRAB: f64 = 1.5;
    /// Specimen raised above the high bar.
    pub const SPECIMEN_RAISE: f64 = 9.0;
    /// Pulled back to clip the specimen.
    pub const SPECIMEN_CLIP: f64 = 5.5;
    pub const SECURE: f64 = 3.5;
    /// Reaching over a spike-mark sample.
    pub const COLLECT: f64 = 8.0;
    pub const BASKET: f64 = 36.0;
}

/// Arm tilt.
pub mod tilt {
    pub const ZERO: f64 = 0.0;
    pub const DRIVE: f64 = 15.0;
    pub const COLLECT: f64 = 2.0;
    pub const SPECIMEN_RAISE: f64 = 68.0;
    pub const SPECIMEN_CLIP: f64 = 58.0;
    /// Partway up while driving to the basket.
    pub const BASKET_PRE: f64 = 80.0;
    pub const BASKET: f64 = 100.0;
    pub const ASCENT: f64 = 72.0;
}

pub mod elbow {
    pub const INIT: f64 = 0.20;
    pub const GRAB: f64 = 0.50;
    pub const BAR: f64 = 0.38;
    pub const SAFE: f64 = 0.30;
}

pub mod wrist {
    pub const INIT: f64 = 0.15;
    pub const GRAB: f64 = 0.52;
    pub const BAR: f64 = 0.44;
    pub const SAFE: f64 = 0.35;
    pub const SCORE: f64 = 0.60;
}

pub mod claw {
    pub const OPEN: f64 = 0.70;
    pub const CLOSED: f64 = 0.32;
}

/// Gecko-wheel intake power. Negative pulls in.
pub mod intake {
    pub const COLLECT: f64 = -1.0;
    pub const HOLD: f64 = -0.5;
    pub const RELEASE: f64 = 0.25;
    pub const EJECT: f64 = 1.0;
    pub const OFF: f64 = 0.0;
}
