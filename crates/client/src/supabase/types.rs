//! Auth API wire types.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use cyberguard_core::{User, UserId};

use crate::models::Session;

/// Body of `POST /auth/v1/token?grant_type=password`.
#[derive(Debug, Serialize)]
pub(super) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/v1/signup`.
#[derive(Debug, Serialize)]
pub(super) struct SignUpBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: ProfileMetadata<'a>,
}

/// Profile metadata attached at sign-up.
#[derive(Debug, Serialize)]
pub(super) struct ProfileMetadata<'a> {
    pub full_name: &'a str,
}

/// User object returned by the auth API.
#[derive(Debug, Deserialize)]
pub(super) struct UserResponse {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

impl From<UserResponse> for User {
    fn from(user: UserResponse) -> Self {
        Self {
            id: UserId::new(user.id),
            email: user.email.filter(|email| !email.is_empty()),
            full_name: user.user_metadata.full_name,
        }
    }
}

/// Session object returned by the token and sign-up endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct SessionResponse {
    pub access_token: String,
    /// Absolute expiry, seconds since the epoch.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Relative expiry, seconds from now.
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: UserResponse,
}

impl SessionResponse {
    /// Convert into a [`Session`], resolving the expiry against `now`.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .and_then(Duration::try_seconds)
                    .and_then(|ttl| now.checked_add_signed(ttl))
            });

        Session::new(
            SecretString::from(self.access_token),
            self.user.into(),
            expires_at,
        )
    }
}

/// Response of `POST /auth/v1/signup`: a session when the account is usable
/// immediately, a bare user when email confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponse {
    Session(SessionResponse),
    PendingConfirmation(UserResponse),
}
