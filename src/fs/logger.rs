//! Console and file logger.
//!
//! This module implements the [`log`] crate's logging facade, writing each
//! record to standard output and, when a path is given, to a log file that is
//! truncated at start-up. Control-loop code only ever uses the `log` macros;
//! the robot binary installs this logger once.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! use log::{LevelFilter, info, warn};
//! use talos::fs::logger;
//!
//! logger::init(LevelFilter::Debug, Some(Path::new("talos.log"))).expect("logger already set");
//!
//! info!("Autonomous start");
//! warn!("Odometry Read Error: device imu is disconnected");
//! ```
//!
//! # Log Output
//!
//! Each line carries the level, the time since the logger was installed, the
//! module path and the message:
//!
//! ```text
//! INFO [12s 340ms] talos::auton::sequencer - Phase: cycle 1 (29 steps)
//! WARN [12s 410ms] talos::motion::odom::tracker - Odometry Read Error: device imu is disconnected
//! ```

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use humantime::format_duration;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Writes log records to the console and an optional file.
pub struct TalosLogger {
    started:     Instant,
    /// `None` when no file was requested or it could not be opened.
    file_writer: Mutex<Option<BufWriter<File>>>,
}

impl TalosLogger {
    /// A logger writing to the console and, if possible, to `path`.
    pub fn new(path: Option<&Path>) -> Self {
        let file_writer = path.and_then(|p| match open_truncated(p) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Log file {} unavailable: {}", p.display(), e);
                None
            }
        });
        Self {
            started:     Instant::now(),
            file_writer: Mutex::new(file_writer),
        }
    }

    /// Whether records also go to a file.
    pub fn has_file(&self) -> bool { self.file_writer.lock().is_ok_and(|w| w.is_some()) }

    fn uptime(&self) -> Duration {
        // Millisecond resolution keeps the stamps short.
        let ms = self.started.elapsed().as_millis();
        Duration::from_millis(u64::try_from(ms).unwrap_or(u64::MAX))
    }

    fn format(&self, record: &Record) -> String {
        format!(
            "{} [{}] {} - {}\n",
            record.level(),
            format_duration(self.uptime()),
            record.target(),
            record.args()
        )
    }
}

fn open_truncated(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).write(true).truncate(true).open(path)
}

impl log::Log for TalosLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        print!("{}", line);

        if let Ok(mut guard) = self.file_writer.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writer.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file_writer.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}

static LOGGER: OnceLock<TalosLogger> = OnceLock::new();

/// Installs the logger.
///
/// Call once, before the first log record.
///
/// # Arguments
///
/// * `level` - The most verbose level to record. Per-frame vision detail is
///   at [`LevelFilter::Trace`], per-move detail at [`LevelFilter::Debug`].
/// * `path` - Optional log file, truncated on open. A file that cannot be
///   opened is reported on stderr and logging continues on the console.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init(level: LevelFilter, path: Option<&Path>) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| TalosLogger::new(path));
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

#[cfg(test)]
mod tests {
    use log::{Level, Log};

    use super::*;

    fn record_line(logger: &TalosLogger) -> String {
        logger.format(
            &Record::builder()
                .level(Level::Warn)
                .target("talos::test")
                .args(format_args!("Tilt Read Error: {}", "unplugged"))
                .build(),
        )
    }

    #[test]
    fn line_layout() {
        let logger = TalosLogger::new(None);
        let line = record_line(&logger);
        assert!(line.starts_with("WARN ["));
        assert!(line.ends_with("] talos::test - Tilt Read Error: unplugged\n"));
        assert!(!logger.has_file());
    }

    #[test]
    fn writes_to_file() {
        let path = std::env::temp_dir().join(format!("talos-log-{}.txt", std::process::id()));
        let logger = TalosLogger::new(Some(&path));
        assert!(logger.has_file());

        log::set_max_level(LevelFilter::Trace);
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .target("talos::test")
                .args(format_args!("lift stalled"))
                .build(),
        );
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("ERROR ["));
        assert!(text.contains("talos::test - lift stalled"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_path_falls_back_to_console() {
        let logger = TalosLogger::new(Some(Path::new("/nonexistent-dir/talos.log")));
        assert!(!logger.has_file());
    }
}
