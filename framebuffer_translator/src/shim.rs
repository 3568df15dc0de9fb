/// Shim - process-wide state of the framebuffer translator
///
/// Holds the two pieces of global state the translator reads: the feature
/// registry (built once at startup, read-only afterwards) and the logger.
/// Both live in thread-safe statics; the registry is never mutated after
/// `initialize()`.

use std::sync::{Arc, OnceLock, RwLock};
use std::time::SystemTime;
use crate::error::{Error, Result};
use crate::features::FeatureRegistry;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

// ===== INTERNAL STATE =====

/// Process-wide feature registry (set exactly once)
static FEATURES: OnceLock<Arc<FeatureRegistry>> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())))
}

// ===== PUBLIC API =====

/// Process-wide entry point
///
/// # Example
///
/// ```no_run
/// use framebuffer_translator::fbt::{Shim, FeatureRegistry, FeatureConfig};
///
/// let registry = FeatureRegistry::builder()
///     .apply_config(&FeatureConfig::from_env())
///     .build();
/// Shim::initialize(registry)?;
///
/// let features = Shim::features()?;
/// # Ok::<(), framebuffer_translator::fbt::Error>(())
/// ```
pub struct Shim;

impl Shim {
    /// Install the process-wide feature registry
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if a registry was already installed.
    pub fn initialize(registry: FeatureRegistry) -> Result<()> {
        let enabled = registry.enabled_features().len();
        FEATURES.set(Arc::new(registry)).map_err(|_| {
            crate::shim_err!("fbt::Shim",
                Error::InitializationFailed("Feature registry already initialized".to_string()))
        })?;

        crate::shim_info!("fbt::Shim", "Feature registry initialized ({} features enabled)", enabled);
        Ok(())
    }

    /// Whether `initialize()` has run
    pub fn is_initialized() -> bool {
        FEATURES.get().is_some()
    }

    /// Get the process-wide feature registry
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if `initialize()` was never called.
    pub fn features() -> Result<Arc<FeatureRegistry>> {
        FEATURES.get().cloned().ok_or_else(|| {
            crate::shim_err!("fbt::Shim",
                Error::InitializationFailed("Feature registry not initialized. Call Shim::initialize() first.".to_string()))
        })
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Restore the default console logger
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger::new());
        }
    }

    /// Log without location (used by shim_trace!..shim_warn!)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line (used by shim_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "shim_tests.rs"]
mod tests;
