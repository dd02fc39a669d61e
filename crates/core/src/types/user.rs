//! Authenticated user as reported by the identity service.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A user known to the identity service.
///
/// Separate from admin membership, which lives in its own registry and is
/// resolved per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity-service user ID.
    pub id: UserId,
    /// Email address, if the account has one.
    pub email: Option<String>,
    /// Display name from the profile metadata (`full_name`).
    pub full_name: Option<String>,
}

impl User {
    /// Create a user with an email and no profile metadata.
    #[must_use]
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: Some(email.into()),
            full_name: None,
        }
    }

    /// Email address, or an empty string when the account has none.
    #[must_use]
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}
