//! Session provider.
//!
//! Wraps the identity service, holds the single session of this client
//! context and derives admin membership from the `admins` registry.
//!
//! Identity and admin status are never cached across calls: every query goes
//! back to the remote side.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use cyberguard_core::User;

use crate::backend::{IdentityService, StorageError, TableStore};
use crate::models::Session;

/// Session provider for one client context.
///
/// Holds at most one session at a time.
pub struct SessionProvider {
    identity: Arc<dyn IdentityService>,
    admins: Arc<dyn TableStore>,
    session: RwLock<Option<Session>>,
}

impl std::fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionProvider").finish_non_exhaustive()
    }
}

impl SessionProvider {
    /// Create a provider with no active session.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityService>, admins: Arc<dyn TableStore>) -> Self {
        Self {
            identity,
            admins,
            session: RwLock::new(None),
        }
    }

    // =========================================================================
    // Sign in / up / out
    // =========================================================================

    /// Sign in with email and password, replacing any current session.
    ///
    /// Credential shape is not validated locally.
    ///
    /// # Errors
    ///
    /// Returns the identity service's failure, e.g. `AuthError::InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        let session = self.identity.sign_in_with_password(email, password).await?;
        debug!(user_id = %session.user_id(), "signed in");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Create an account and keep the session the identity service issues.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfirmationPending` if the account must be
    /// confirmed first, or the identity service's failure.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        full_name: &str,
    ) -> Result<Session, AuthError> {
        let session = self.identity.sign_up(email, password, full_name).await?;
        debug!(user_id = %session.user_id(), "signed up");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Drop the local session. Remote invalidation is best-effort.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        let Some(session) = self.session.write().await.take() else {
            return;
        };

        if let Err(e) = self.identity.sign_out(&session).await {
            warn!(error = %e, "remote sign-out failed; local session dropped");
        }
    }

    // =========================================================================
    // Current user
    // =========================================================================

    /// The live session, verified against the identity service.
    ///
    /// Returns `None` (never an error) when there is no session, when it has
    /// expired locally, when the identity service no longer recognises it,
    /// or when the identity service cannot be reached.
    pub async fn current_session(&self) -> Option<Session> {
        let session = self.session.read().await.clone()?;

        if session.is_expired_at(Utc::now()) {
            debug!(user_id = %session.user_id(), "session expired");
            self.discard(&session).await;
            return None;
        }

        match self.identity.get_user(&session).await {
            Ok(Some(user)) => Some(session.with_user(user)),
            Ok(None) => {
                debug!(user_id = %session.user_id(), "session no longer recognised");
                self.discard(&session).await;
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to resolve current user");
                None
            }
        }
    }

    /// Drop `stale` if it is still the stored session.
    ///
    /// A sign-in that completed while `stale` was being verified has replaced
    /// it and is kept.
    async fn discard(&self, stale: &Session) {
        let mut stored = self.session.write().await;
        if stored.as_ref().is_some_and(|current| current.same_token(stale)) {
            stored.take();
        }
    }

    /// The user of the live session, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.current_session().await.map(|session| session.user)
    }

    /// Whether the current user is listed in the `admins` registry.
    ///
    /// With no current user this returns `false` without a lookup.
    pub async fn is_admin(&self) -> bool {
        let Some(session) = self.current_session().await else {
            return false;
        };

        match self.admins.find_admin(&session, session.user_id()).await {
            Ok(entry) => entry.is_some_and(|entry| &entry.id == session.user_id()),
            Err(e) => least_privilege_on_lookup_failure(&e),
        }
    }
}

/// A failed privilege lookup grants no privilege.
///
/// Transient failures are indistinguishable from "not an admin" to callers;
/// they only show up in the logs.
fn least_privilege_on_lookup_failure(error: &StorageError) -> bool {
    warn!(error = %error, "admin lookup failed; treating user as non-admin");
    false
}
