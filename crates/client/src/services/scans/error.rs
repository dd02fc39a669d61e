//! Scan submission error types.

use thiserror::Error;

/// Message shown when the remote function failed without saying why.
pub const GENERIC_INVOCATION_MESSAGE: &str = "Failed to perform scan";

/// Message shown when the result could not be recorded.
pub const PERSISTENCE_MESSAGE: &str = "Failed to save scan result";

/// Failures of a scan submission.
///
/// Every variant displays a message intended for direct display to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No active session. Detected locally; nothing was sent.
    #[error("You must be logged in to perform scans")]
    AuthRequired,

    /// The remote function could not be invoked or answered with an error status.
    #[error("{0}")]
    RemoteInvocation(String),

    /// The remote function answered but reported an application-level error.
    #[error("{0}")]
    Classification(String),

    /// A result was obtained but could not be recorded.
    #[error("{0}")]
    Persistence(String),
}
