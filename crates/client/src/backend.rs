//! Remote boundaries of the client.
//!
//! Each trait is one external service: the identity service, the row-oriented
//! table store and the remote function runtime. The [`crate::supabase`]
//! module implements all three over HTTP; tests substitute in-memory fakes.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cyberguard_core::{ScanRecord, User, UserId};

use crate::models::Session;
use crate::services::auth::AuthError;

/// Errors from the table store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed before a response was received.
    #[error("storage request failed: {0}")]
    Request(String),

    /// Storage answered with an error status.
    #[error("storage error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("storage response error: {0}")]
    Response(String),
}

/// Errors from invoking a remote function.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Request could not be delivered (network failure, DNS, TLS, ...).
    #[error("function request failed: {0}")]
    Request(String),

    /// Function answered with a non-2xx status.
    #[error("function returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Http {
        status: u16,
        /// Message extracted from the error body, if any.
        message: Option<String>,
    },

    /// Response body was not JSON.
    #[error("function response error: {0}")]
    Response(String),
}

impl InvocationError {
    /// Message provided by the remote side, if there was one.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => message.as_deref(),
            Self::Request(_) | Self::Response(_) => None,
        }
    }
}

/// Row of the `admins` registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEntry {
    pub id: UserId,
}

/// Remote identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError>;

    /// Create an account, attaching `full_name` as profile metadata.
    ///
    /// Returns `AuthError::ConfirmationPending` when the account was created
    /// but no session was issued.
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        full_name: &str,
    ) -> Result<Session, AuthError>;

    /// Invalidate the session remotely.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;

    /// Look up the user behind a session. `Ok(None)` means the service no
    /// longer recognises the token.
    async fn get_user(&self, session: &Session) -> Result<Option<User>, AuthError>;
}

/// Row-oriented storage holding the `admins` and `scans` tables.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Single-row lookup of `user_id` in `admins`. `Some` only when exactly
    /// one row matches.
    async fn find_admin(
        &self,
        session: &Session,
        user_id: &UserId,
    ) -> Result<Option<AdminEntry>, StorageError>;

    /// Insert one row into `scans`. All-or-nothing.
    async fn insert_scan(&self, session: &Session, record: &ScanRecord)
    -> Result<(), StorageError>;
}

/// Runtime hosting the named remote functions.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invoke function `name` with a JSON body and return the JSON response.
    async fn invoke(
        &self,
        session: &Session,
        name: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, InvocationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_only_for_http_errors() {
        let err = InvocationError::Http {
            status: 429,
            message: Some("rate limited".to_string()),
        };
        assert_eq!(err.remote_message(), Some("rate limited"));
        assert_eq!(err.to_string(), "function returned 429: rate limited");

        let err = InvocationError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.remote_message(), None);
        assert_eq!(err.to_string(), "function returned 500: no message");

        let err = InvocationError::Request("connection refused".to_string());
        assert_eq!(err.remote_message(), None);
    }
}
