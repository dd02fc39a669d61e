//! Session held by the session provider.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use cyberguard_core::{User, UserId};

/// An authenticated context tying subsequent calls to one user identity.
///
/// Created on sign-in, destroyed on sign-out or expiry. The access token is
/// redacted from `Debug` output.
#[derive(Clone)]
pub struct Session {
    access_token: SecretString,
    /// User the session belongs to.
    pub user: User,
    /// Instant after which the identity service no longer honours the token.
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Create a session from an issued access token.
    #[must_use]
    pub const fn new(
        access_token: SecretString,
        user: User,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token,
            user,
            expires_at,
        }
    }

    /// Bearer token for calls made on behalf of this user.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// ID of the session's user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user.id
    }

    /// Whether the token has expired at `now`. Sessions without an expiry
    /// never expire locally.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Whether `other` carries the same access token.
    #[must_use]
    pub fn same_token(&self, other: &Self) -> bool {
        self.access_token.expose_secret() == other.access_token.expose_secret()
    }

    /// Same token, with the user record replaced by a fresher one.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn session(expires_at: Option<DateTime<Utc>>) -> Session {
        Session::new(
            SecretString::from("token-abc"),
            User::new("u1", "user@example.com"),
            expires_at,
        )
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", session(None));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("token-abc"));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!session(None).is_expired_at(now));
        assert!(!session(Some(now + Duration::minutes(5))).is_expired_at(now));
        assert!(session(Some(now - Duration::seconds(1))).is_expired_at(now));
        assert!(session(Some(now)).is_expired_at(now));
    }

    #[test]
    fn test_with_user_keeps_token() {
        let refreshed = session(None).with_user(User::new("u1", "new@example.com"));
        assert_eq!(refreshed.user.email.as_deref(), Some("new@example.com"));
        assert_eq!(refreshed.access_token().expose_secret(), "token-abc");
    }

    #[test]
    fn test_same_token() {
        let first = session(None);
        let refreshed = first.clone().with_user(User::new("u1", "new@example.com"));
        assert!(first.same_token(&refreshed));

        let other = Session::new(
            SecretString::from("token-xyz"),
            User::new("u1", "user@example.com"),
            None,
        );
        assert!(!first.same_token(&other));
    }
}
