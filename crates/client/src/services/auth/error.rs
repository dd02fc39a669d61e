//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The account was created but must be confirmed before a session is issued.
    #[error("confirmation pending for {email}")]
    ConfirmationPending {
        /// Email the confirmation was sent to.
        email: String,
    },

    /// The identity service rejected the request.
    #[error("identity service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed.
    #[error("identity request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("identity response error: {0}")]
    Response(String),
}
