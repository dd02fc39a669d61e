//! Identity-service user identifier.
//!
//! The identity service issues opaque string identifiers (UUIDs in practice).
//! They are never parsed locally, only compared and forwarded.

use serde::{Deserialize, Serialize};

/// Identifier of a user as issued by the identity service.
///
/// Also used as the key of the `admins` registry and the owner column of
/// persisted scans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let id = UserId::new("8f1c2d9e-0b7a-4e15-9a55-2f6d3c1b7e40");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"8f1c2d9e-0b7a-4e15-9a55-2f6d3c1b7e40\"");

        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId::from("u1").to_string(), "u1");
    }
}
