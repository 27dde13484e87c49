//! Odometry tracking for robot position estimation.
//!
//! This module provides dead reckoning using two perpendicular tracking
//! wheels and a gyro to estimate the robot's field position between marker
//! fixes.
//!
//! # Module Structure
//!
//! - **[`devices`]**: Tracking wheel geometry and configuration.
//! - **[`tracker`]**: The odometry tracker that writes the shared pose.
//!
//! # How It Works
//!
//! The wheel encoders measure how far the robot has rolled and the gyro how
//! far it has turned. Each cycle the robot is assumed to have followed a
//! circular arc; the arc's chord is rotated into the field frame using the
//! average heading over the cycle and added to the pose.
//!
//! # Hardware Requirements
//!
//! - **Vertical tracking wheel**: Measures forward/backward movement.
//! - **Horizontal tracking wheel**: Measures sideways (strafing) movement.
//! - **Gyro (IMU)**: Measures heading.

pub(crate) mod algorithm;

/// Tracking wheel configuration.
pub mod devices;

/// Main odometry tracking controller.
pub mod tracker;
