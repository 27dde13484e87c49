//! Filesystem utilities.
//!
//! The robot logs to the console and to a file on the controller's storage,
//! which is often the only record of what happened during a match.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use log::{LevelFilter, info};
//! use talos::fs::logger;
//!
//! // Initialize the logger at program start
//! logger::init(LevelFilter::Info, Some(Path::new("match.log"))).expect("Failed to initialize logger");
//!
//! info!("Robot initialized");
//! ```

/// Console and file logging.
///
/// Provides [`TalosLogger`](logger::TalosLogger) and its installer.
pub mod logger;
