//! CLI commands.
//!
//! Every command that signs in also signs out before returning, whether or
//! not the command itself succeeded.

pub mod account;
pub mod scan;

use secrecy::SecretString;
use thiserror::Error;

use cyberguard_client::{AuthError, ClientState, ConfigError, ScanError, Session};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Client configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Signing in or up failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The scan could not be completed.
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Reading an attachment failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering output failed.
    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),

    /// The access check redirected away from the page.
    #[error("Access denied: redirect to {0}")]
    Denied(&'static str),
}

/// Email and password of the account a command acts as.
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Sign in with `credentials`.
async fn sign_in(state: &ClientState, credentials: &Credentials) -> Result<Session, AuthError> {
    tracing::info!("Signing in as {}...", credentials.email);
    state
        .sessions()
        .sign_in(&credentials.email, &credentials.password)
        .await
}

/// Write a line of command output.
#[allow(clippy::print_stdout)]
fn emit(line: &str) {
    println!("{line}");
}
