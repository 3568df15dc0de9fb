//! Error types for the framebuffer translator
//!
//! Every fallible operation of the translator returns one of these errors to
//! the calling compatibility layer. Nothing is retried internally.

use std::fmt;

/// Result type for translator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Translator errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Attachment identifier that does not name an attachment point
    InvalidAttachment(String),

    /// Requested plane, format or capability is not available and no workaround applies
    UnsupportedOperation(String),

    /// Index outside its valid range (sample index, attachment index, ...)
    OutOfRange(String),

    /// Malformed region that cannot be silently ignored
    InvalidRectangle(String),

    /// The render target resolver could not produce a render target
    ResourceResolutionFailure(String),

    /// Backend call failed (device error, poisoned lock, ...)
    BackendError(String),

    /// Process-wide state initialized twice or used before initialization
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidAttachment(msg) => write!(f, "Invalid attachment: {}", msg),
            Error::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            Error::InvalidRectangle(msg) => write!(f, "Invalid rectangle: {}", msg),
            Error::ResourceResolutionFailure(msg) => write!(f, "Resource resolution failure: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
