//! Logging for the framebuffer translator
//!
//! The translator never writes to stdout directly. Every message goes through
//! the process-wide [`Logger`] installed on [`Shim`](crate::shim::Shim):
//! - `Logger` trait for custom sinks (test capture, file, host-application log)
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default, filtered by a minimum severity
//! - File and line information on ERROR entries

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Sink for translator log entries
///
/// # Example
///
/// ```no_run
/// use framebuffer_translator::fbt::log::{Logger, LogEntry};
///
/// struct HostLogger;
///
/// impl Logger for HostLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Forward to the host application...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Handle one entry
    fn log(&self, entry: &LogEntry);
}

/// One log message with its metadata
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Creation time
    pub timestamp: SystemTime,

    /// Emitting component (e.g. "fbt::FramebufferTranslator", "fbt::cpu::Device")
    pub source: String,

    /// Message text
    pub message: String,

    /// Source file (ERROR entries only)
    pub file: Option<&'static str>,

    /// Source line (ERROR entries only)
    pub line: Option<u32>,
}

/// Log severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-call decisions (emulation path chosen, slot resolved)
    Trace,

    /// Development information
    Debug,

    /// Lifecycle events
    Info,

    /// Recoverable oddities (unknown feature override, skipped attachment)
    Warn,

    /// Errors returned to the caller, with file:line
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by the console logger
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Console logger
///
/// Format: `[timestamp] [SEVERITY] [source] message (file:line)`.
/// Entries below `min_severity` are dropped. Warnings and errors go to stderr.
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl DefaultLogger {
    /// Console logger that prints Info and above
    pub fn new() -> Self {
        Self { min_severity: LogSeverity::Info }
    }

    /// Console logger with a custom threshold
    pub fn with_min_severity(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    /// Current threshold
    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }

    /// Render an entry without colors (also used by tests)
    pub fn format_plain(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");
        match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, entry.severity.label(), entry.source, entry.message, file, line
            ),
            _ => format!(
                "[{}] [{}] [{}] {}",
                timestamp, entry.severity.label(), entry.source, entry.message
            ),
        }
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity < self.min_severity {
            return;
        }

        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity = match entry.severity {
            LogSeverity::Trace => entry.severity.label().bright_black(),
            LogSeverity::Debug => entry.severity.label().cyan(),
            LogSeverity::Info => entry.severity.label().green(),
            LogSeverity::Warn => entry.severity.label().yellow(),
            LogSeverity::Error => entry.severity.label().red().bold(),
        };
        let source = entry.source.bright_blue();

        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        if entry.severity >= LogSeverity::Warn {
            eprintln!("[{}] [{}] [{}] {}{}", timestamp, severity, source, entry.message, location);
        } else {
            println!("[{}] [{}] [{}] {}{}", timestamp, severity, source, entry.message, location);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! shim_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::fbt::Shim::log(
            $crate::fbt::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! shim_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::fbt::Shim::log(
            $crate::fbt::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! shim_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::fbt::Shim::log(
            $crate::fbt::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! shim_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::fbt::Shim::log(
            $crate::fbt::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! shim_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::fbt::Shim::log_detailed(
            $crate::fbt::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an error and evaluate to it
///
/// ```ignore
/// return Err(shim_err!("fbt::FramebufferTranslator",
///     Error::OutOfRange(format!("sample {}", index))));
/// ```
#[macro_export]
macro_rules! shim_err {
    ($source:expr, $error:expr) => {{
        let error: $crate::fbt::Error = $error;
        $crate::shim_error!($source, "{}", error);
        error
    }};
}

/// Log an error and return it from the enclosing function
#[macro_export]
macro_rules! shim_bail {
    ($source:expr, $error:expr) => {
        return Err($crate::shim_err!($source, $error))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
