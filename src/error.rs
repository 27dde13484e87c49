//! Error types.
//!
//! Only configuration loading and device access report errors. Everything in
//! the control path degrades instead: a failed read skips one cycle, an
//! invalid detection is dropped, a stop request ends a move normally.

use thiserror::Error;

/// Errors raised while loading or validating a [`RobotConfig`](crate::config::RobotConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the controllers cannot work with.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field:  &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors reported by hardware collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// The device is not connected or not configured.
    #[error("device {0} is disconnected")]
    Disconnected(&'static str),

    /// The device answered but the reading was unusable.
    #[error("device {device} read failed: {reason}")]
    ReadFailed {
        device: &'static str,
        reason: String,
    },
}
