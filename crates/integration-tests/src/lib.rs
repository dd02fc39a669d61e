//! Integration tests for the CyberGuard client.
//!
//! The services are exercised end to end against in-memory backends that
//! record every call, so the tests can assert both on outcomes and on which
//! remote calls were (or were not) made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cyberguard-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_provider` - Sign-in, sign-out, current user and admin checks
//! - `access_guard` - Page access decisions
//! - `scan_pipeline` - Scan submission and persistence
//! - `supabase_backends` - HTTP backends against a local stub server ([`http`])

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod http;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use cyberguard_client::{
    AdminEntry, AuthError, ClientState, FunctionInvoker, IdentityService, InvocationError,
    Session, StorageError, TableStore,
};
use cyberguard_core::{ScanRecord, User, UserId};

/// Password every fake account accepts.
pub const PASSWORD: &str = "correct horse battery staple";

/// Lock `mutex`, recovering the data if a panicking test poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Identity
// =============================================================================

/// Identity service with a fixed set of accounts.
#[derive(Default)]
pub struct FakeIdentity {
    users: Mutex<Vec<User>>,
    expires_at: Mutex<Option<DateTime<Utc>>>,
    issued: Mutex<Vec<String>>,
    revoked: Mutex<Vec<String>>,
    get_user_delay: Mutex<Option<Duration>>,
    unreachable: Mutex<bool>,
    fail_sign_out: Mutex<bool>,
    pub sign_in_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub get_user_calls: AtomicUsize,
}

impl FakeIdentity {
    /// Identity service knowing `users`.
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let identity = Self::default();
        *lock(&identity.users) = users.into_iter().collect();
        identity
    }

    /// Expiry stamped on sessions issued from now on.
    pub fn issue_sessions_expiring_at(&self, expires_at: DateTime<Utc>) {
        *lock(&self.expires_at) = Some(expires_at);
    }

    /// Stop recognising the sessions issued so far.
    pub fn revoke_sessions(&self) {
        let issued = lock(&self.issued).clone();
        lock(&self.revoked).extend(issued);
    }

    /// Delay every `get_user` answer by `delay`.
    pub fn delay_get_user(&self, delay: Option<Duration>) {
        *lock(&self.get_user_delay) = delay;
    }

    /// Make `get_user` fail with a transport error.
    pub fn set_unreachable(&self, unreachable: bool) {
        *lock(&self.unreachable) = unreachable;
    }

    /// Make remote sign-out fail.
    pub fn fail_sign_out(&self) {
        *lock(&self.fail_sign_out) = true;
    }

    fn issue(&self, user: User) -> Session {
        let mut issued = lock(&self.issued);
        let token = format!("token-{}-{}", user.id, issued.len() + 1);
        issued.push(token.clone());
        drop(issued);

        Session::new(SecretString::from(token), user, *lock(&self.expires_at))
    }

    fn find(&self, email: &str) -> Option<User> {
        lock(&self.users)
            .iter()
            .find(|user| user.email.as_deref() == Some(email))
            .cloned()
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        match self.find(email) {
            Some(user) if password.expose_secret() == PASSWORD => Ok(self.issue(user)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &SecretString,
        full_name: &str,
    ) -> Result<Session, AuthError> {
        if self.find(email).is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let mut users = lock(&self.users);
        let mut user = User::new(format!("u{}", users.len() + 1), email);
        user.full_name = Some(full_name.to_owned());
        users.push(user.clone());
        drop(users);

        Ok(self.issue(user))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if *lock(&self.fail_sign_out) {
            return Err(AuthError::Request("connection reset".to_owned()));
        }
        Ok(())
    }

    async fn get_user(&self, session: &Session) -> Result<Option<User>, AuthError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.get_user_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *lock(&self.unreachable) {
            return Err(AuthError::Request("connection refused".to_owned()));
        }
        let token = session.access_token().expose_secret();
        if lock(&self.revoked).iter().any(|revoked| revoked == token) {
            return Ok(None);
        }
        Ok(lock(&self.users)
            .iter()
            .find(|user| &user.id == session.user_id())
            .cloned())
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Table store holding the `admins` registry and the recorded scans.
#[derive(Default)]
pub struct FakeTables {
    admins: Mutex<Vec<UserId>>,
    scans: Mutex<Vec<ScanRecord>>,
    fail_admin_lookup: Mutex<bool>,
    fail_inserts: Mutex<bool>,
    pub admin_lookups: AtomicUsize,
    pub insert_calls: AtomicUsize,
}

impl FakeTables {
    /// Register `id` in the `admins` registry.
    pub fn add_admin(&self, id: impl Into<UserId>) {
        lock(&self.admins).push(id.into());
    }

    /// Make admin lookups fail.
    pub fn fail_admin_lookup(&self) {
        *lock(&self.fail_admin_lookup) = true;
    }

    /// Make scan inserts fail.
    pub fn fail_inserts(&self) {
        *lock(&self.fail_inserts) = true;
    }

    /// Scan records written so far.
    #[must_use]
    pub fn scans(&self) -> Vec<ScanRecord> {
        lock(&self.scans).clone()
    }
}

#[async_trait]
impl TableStore for FakeTables {
    async fn find_admin(
        &self,
        _session: &Session,
        user_id: &UserId,
    ) -> Result<Option<AdminEntry>, StorageError> {
        self.admin_lookups.fetch_add(1, Ordering::SeqCst);
        if *lock(&self.fail_admin_lookup) {
            return Err(StorageError::Api {
                status: 503,
                message: "service unavailable".to_owned(),
            });
        }
        Ok(lock(&self.admins)
            .iter()
            .find(|id| *id == user_id)
            .map(|id| AdminEntry { id: id.clone() }))
    }

    async fn insert_scan(
        &self,
        _session: &Session,
        record: &ScanRecord,
    ) -> Result<(), StorageError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if *lock(&self.fail_inserts) {
            return Err(StorageError::Api {
                status: 500,
                message: "insert failed".to_owned(),
            });
        }
        lock(&self.scans).push(record.clone());
        Ok(())
    }
}

// =============================================================================
// Functions
// =============================================================================

/// A call received by [`FakeFunctions`].
#[derive(Debug, Clone)]
pub struct Invocation {
    pub name: String,
    pub body: Value,
    pub user_id: UserId,
}

/// Function runtime answering every call with one configured reply.
pub struct FakeFunctions {
    reply: Mutex<Result<Value, InvocationError>>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeFunctions {
    /// Runtime answering with `body`.
    #[must_use]
    pub fn replying(body: Value) -> Self {
        Self {
            reply: Mutex::new(Ok(body)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Runtime failing every call with `error`.
    #[must_use]
    pub fn failing(error: InvocationError) -> Self {
        Self {
            reply: Mutex::new(Err(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        lock(&self.calls).clone()
    }
}

fn clone_invocation_error(error: &InvocationError) -> InvocationError {
    match error {
        InvocationError::Request(message) => InvocationError::Request(message.clone()),
        InvocationError::Http { status, message } => InvocationError::Http {
            status: *status,
            message: message.clone(),
        },
        InvocationError::Response(message) => InvocationError::Response(message.clone()),
    }
}

#[async_trait]
impl FunctionInvoker for FakeFunctions {
    async fn invoke(
        &self,
        session: &Session,
        name: &str,
        body: &Value,
    ) -> Result<Value, InvocationError> {
        lock(&self.calls).push(Invocation {
            name: name.to_owned(),
            body: body.clone(),
            user_id: session.user_id().clone(),
        });
        match &*lock(&self.reply) {
            Ok(reply) => Ok(reply.clone()),
            Err(error) => Err(clone_invocation_error(error)),
        }
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A client context wired to fresh fakes.
pub struct TestContext {
    pub identity: Arc<FakeIdentity>,
    pub tables: Arc<FakeTables>,
    pub functions: Arc<FakeFunctions>,
    pub state: ClientState,
}

impl TestContext {
    /// Context with the given backends.
    #[must_use]
    pub fn new(identity: FakeIdentity, tables: FakeTables, functions: FakeFunctions) -> Self {
        let identity = Arc::new(identity);
        let tables = Arc::new(tables);
        let functions = Arc::new(functions);
        let state = ClientState::new(
            Arc::clone(&identity) as Arc<dyn IdentityService>,
            Arc::clone(&tables) as Arc<dyn TableStore>,
            Arc::clone(&functions) as Arc<dyn FunctionInvoker>,
        );
        Self {
            identity,
            tables,
            functions,
            state,
        }
    }

    /// Context knowing user `u1` (`user@example.com`) and `u2`
    /// (`admin@example.com`, registered admin), with functions answering
    /// `reply`.
    #[must_use]
    pub fn standard(reply: Value) -> Self {
        let identity = FakeIdentity::with_users([
            User::new("u1", "user@example.com"),
            User::new("u2", "admin@example.com"),
        ]);
        let tables = FakeTables::default();
        tables.add_admin("u2");
        Self::new(identity, tables, FakeFunctions::replying(reply))
    }

    /// Sign in as `email` with the shared password.
    ///
    /// # Errors
    ///
    /// Returns the sign-in failure.
    pub async fn sign_in(&self, email: &str) -> Result<Session, AuthError> {
        self.state
            .sessions()
            .sign_in(email, &SecretString::from(PASSWORD))
            .await
    }
}
