//! Error types for Bowser with categorization:
//!
//! - **Validation errors**: input validation and configuration (exit code 1)
//! - **System errors**: IO and filesystem watch failures (exit code 2)
//! - **Execution errors**: backend and remote-store operations (exit code 3 or 4)

use std::fmt;
use std::path::Path;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type that can represent any error in the system.
///
/// Errors are logically separated into three categories:
/// - Validation errors (user input/config issues)
/// - System errors (IO, filesystem watch)
/// - Execution errors (backend uploads, remote store state)
#[derive(Debug, Clone)]
pub enum Error {
    /// Validation error from input or configuration
    Validation(ValidationError),
    /// System error from IO or the filesystem watch
    System(SystemError),
    /// Execution error from a backend or the remote store
    Execution(ExecutionError),
}

/// Validation errors represent incorrect user input or configuration.
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Invalid configuration provided
    InvalidConfig(String),
    /// Parse error when reading configuration or metadata
    ParseError(String),
    /// A link substitution was requested for a string its target does not match.
    ///
    /// This is a programming-contract violation: `substitute` must only be
    /// called after a successful `matches` check.
    LinkMismatch { value: String },
}

/// System errors represent IO or OS-level watch failures.
#[derive(Debug, Clone)]
pub enum SystemError {
    /// IO error from a filesystem operation
    IoError(String),
    /// The OS filesystem watch could not be established or reported an error
    WatchError(String),
}

/// Execution errors represent failures talking to a remote store.
#[derive(Debug, Clone)]
pub enum ExecutionError {
    /// A backend's upload failed for one subtree
    Backend {
        backend: String,
        subtree: String,
        message: String,
    },
    /// Clearing a destination key prefix failed
    PrefixClear { prefix: String, message: String },
    /// A remote store request failed
    Store(String),
}

// Convenience constructors using functional patterns
impl Error {
    /// Create a validation error from an invalid config.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::InvalidConfig(msg.into()))
    }

    /// Create a validation error from a parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::ParseError(msg.into()))
    }

    /// Create a validation error for a link substitution contract violation.
    pub fn link_mismatch(value: impl Into<String>) -> Self {
        Self::Validation(ValidationError::LinkMismatch {
            value: value.into(),
        })
    }

    /// Create a system error from an IO error.
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::System(SystemError::IoError(msg.into()))
    }

    /// Create a system error from a watch failure.
    pub fn watch_error(msg: impl Into<String>) -> Self {
        Self::System(SystemError::WatchError(msg.into()))
    }

    /// Create an execution error from a backend upload failure.
    pub fn backend_error(
        backend: impl Into<String>,
        subtree: &Path,
        msg: impl Into<String>,
    ) -> Self {
        Self::Execution(ExecutionError::Backend {
            backend: backend.into(),
            subtree: subtree.display().to_string(),
            message: msg.into(),
        })
    }

    /// Create an execution error from a prefix-clear failure.
    pub fn prefix_clear(prefix: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Execution(ExecutionError::PrefixClear {
            prefix: prefix.into(),
            message: msg.into(),
        })
    }

    /// Create an execution error from a remote store request failure.
    pub fn store_error(msg: impl Into<String>) -> Self {
        Self::Execution(ExecutionError::Store(msg.into()))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::System(err) => write!(f, "{err}"),
            Self::Execution(err) => write!(f, "{err}"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::LinkMismatch { value } => {
                write!(f, "'{value}' does not match link target")
            }
        }
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::WatchError(msg) => write!(f, "Watch error: {msg}"),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend {
                backend,
                subtree,
                message,
            } => write!(f, "Backend '{backend}' failed for subtree {subtree}: {message}"),
            Self::PrefixClear { prefix, message } => {
                write!(f, "Failed to clear prefix '{prefix}': {message}")
            }
            Self::Store(msg) => write!(f, "Store error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit code scheme:
    /// - 1: User error (validation, invalid input, bad configuration)
    /// - 2: System error (IO, filesystem watch)
    /// - 4: Execution error (backend uploads, remote store state)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 1,
            Self::System(_) => 2,
            Self::Execution(_) => 4,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::parse_error(format!("Failed to parse config: {err}"))
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Self::watch_error(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::store_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_config() {
        let err = Error::invalid_config("test error");
        assert_eq!(err.to_string(), "Invalid configuration: test error");
    }

    #[test]
    fn test_error_display_backend_error() {
        let err = Error::backend_error("AWS-S3", Path::new("/watch/app1"), "timed out");
        let display = err.to_string();
        assert!(display.contains("AWS-S3"));
        assert!(display.contains("/watch/app1"));
        assert!(display.contains("timed out"));
    }

    #[test]
    fn test_error_display_link_mismatch() {
        let err = Error::link_mismatch("some/key");
        assert_eq!(err.to_string(), "'some/key' does not match link target");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::System(_)));
    }

    #[test]
    fn test_exit_code_user_errors() {
        assert_eq!(Error::invalid_config("test").exit_code(), 1);
        assert_eq!(Error::parse_error("test").exit_code(), 1);
        assert_eq!(Error::link_mismatch("test").exit_code(), 1);
    }

    #[test]
    fn test_exit_code_system_errors() {
        assert_eq!(Error::io_error("test").exit_code(), 2);
        assert_eq!(Error::watch_error("test").exit_code(), 2);
    }

    #[test]
    fn test_exit_code_execution_errors() {
        assert_eq!(
            Error::backend_error("b", Path::new("/s"), "e").exit_code(),
            4
        );
        assert_eq!(Error::prefix_clear("p", "e").exit_code(), 4);
        assert_eq!(Error::store_error("e").exit_code(), 4);
    }
}
