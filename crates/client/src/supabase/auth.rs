//! Identity service over the Supabase auth API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use cyberguard_core::User;

use super::SupabaseClient;
use super::error::{error_code, remote_message};
use super::types::{
    PasswordGrant, ProfileMetadata, SessionResponse, SignUpBody, SignUpResponse, UserResponse,
};
use crate::backend::IdentityService;
use crate::models::Session;
use crate::services::auth::AuthError;

/// Error codes the auth API uses for a wrong email/password pair.
const INVALID_CREDENTIAL_CODES: &[&str] = &["invalid_credentials", "invalid_grant"];

/// Error codes the auth API uses for an already registered email.
const USER_EXISTS_CODES: &[&str] = &["user_already_exists", "email_exists"];

#[async_trait]
impl IdentityService for SupabaseClient {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let mut url = self.endpoint("auth/v1/token");
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .anon_request(Method::POST, url)
            .json(&PasswordGrant {
                email,
                password: password.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body, INVALID_CREDENTIAL_CODES, || {
                AuthError::InvalidCredentials
            }));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Response(e.to_string()))?;

        debug!("password sign-in accepted");
        Ok(session.into_session(Utc::now()))
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        full_name: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .anon_request(Method::POST, self.endpoint("auth/v1/signup"))
            .json(&SignUpBody {
                email,
                password: password.expose_secret(),
                data: ProfileMetadata { full_name },
            })
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body, USER_EXISTS_CODES, || {
                AuthError::UserAlreadyExists
            }));
        }

        let outcome: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Response(e.to_string()))?;

        match outcome {
            SignUpResponse::Session(session) => Ok(session.into_session(Utc::now())),
            SignUpResponse::PendingConfirmation(user) => {
                debug!(user_id = %user.id, "account created; confirmation pending");
                Err(AuthError::ConfirmationPending {
                    email: user.email.unwrap_or_else(|| email.to_string()),
                })
            }
        }
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let response = self
            .user_request(
                Method::POST,
                self.endpoint("auth/v1/logout"),
                session.access_token(),
            )
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        // An already-invalid token is as signed out as it gets
        if status.is_success() || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND)
        {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn get_user(&self, session: &Session) -> Result<Option<User>, AuthError> {
        let response = self
            .user_request(
                Method::GET,
                self.endpoint("auth/v1/user"),
                session.access_token(),
            )
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Response(e.to_string()))?;

        Ok(Some(user.into()))
    }
}

/// Map a failed response to a typed error when its code is one of `codes`.
fn classify_failure(
    status: StatusCode,
    body: &str,
    codes: &[&str],
    typed: impl FnOnce() -> AuthError,
) -> AuthError {
    match error_code(body) {
        Some(code) if codes.contains(&code.as_str()) => typed(),
        _ => api_error(status, body),
    }
}

fn api_error(status: StatusCode, body: &str) -> AuthError {
    AuthError::Api {
        status: status.as_u16(),
        message: remote_message(body).unwrap_or_else(|| status.to_string()),
    }
}
