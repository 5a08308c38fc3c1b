//! Logger setup
//!
//! Every line carries the session time, the level and the thread it came
//! from, since the control loop and the carrier run on different threads.
//! Lines go to stderr and the session log file, stdout is left to the
//! carrier.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;
use std::thread;

use colored::{ColoredString, Colorize};
use log::{self, info};
use thiserror::Error;

use crate::session;

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name shown for threads spawned without one.
const UNNAMED_THREAD: &str = "?";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Minimum log level must be INFO or more verbose, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been installed: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this session.
///
/// `min_level` must let at least `INFO` through so lifecycle messages are
/// never lost. Must only be called once per process.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            let thread = thread::current();
            out.finish(format_args!(
                "{}",
                Line {
                    elapsed_s: session::get_elapsed_seconds(),
                    level: record.level(),
                    thread: thread.name().unwrap_or(UNNAMED_THREAD),
                    target: record.target(),
                    message,
                }
            ))
        })
        .level(min_level)
        .chain(std::io::stderr())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised at {:?}", min_level);
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE ITEMS
// ---------------------------------------------------------------------------

/// One formatted log line.
///
/// The module path is only shown at debug and trace, where it is needed to
/// tell the control modules apart.
struct Line<'a, M> {
    elapsed_s: f64,
    level: log::Level,
    thread: &'a str,
    target: &'a str,
    message: M,
}

impl<'a, M: fmt::Display> fmt::Display for Line<'a, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:10.6} {} {}] ", self.elapsed_s, level_tag(self.level), self.thread)?;

        if self.level > log::Level::Info {
            write!(f, "{}: ", self.target)?;
        }

        write!(f, "{}", self.message)
    }
}

/// Three letter level tag, highlighted by severity.
fn level_tag(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(level: log::Level) -> String {
        colored::control::set_override(false);
        format!(
            "{}",
            Line {
                elapsed_s: 1.5,
                level,
                thread: "ctrl_loop",
                target: "rov_lib::ctrl_loop",
                message: "cycle overrun",
            }
        )
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            line(log::Level::Warn),
            "[  1.500000 WRN ctrl_loop] cycle overrun"
        );
        assert_eq!(
            line(log::Level::Debug),
            "[  1.500000 DBG ctrl_loop] rov_lib::ctrl_loop: cycle overrun"
        );
    }

    #[test]
    fn test_rejects_quiet_level() {
        let session = session::Session {
            session_root: std::env::temp_dir(),
            log_file_path: std::env::temp_dir().join("unused.log"),
        };

        assert!(matches!(
            logger_init(LevelFilter::Warn, &session),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));
    }
}
