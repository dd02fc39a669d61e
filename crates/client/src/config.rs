//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CYBERGUARD_SUPABASE_URL` - Base URL of the backend project (e.g. `https://abc.supabase.co`)
//! - `CYBERGUARD_SUPABASE_ANON_KEY` - Public anon API key sent as `apikey`

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "anon-key",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection settings for the backend project.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the backend project
    pub supabase_url: Url,
    /// Public anon API key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl ClientConfig {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// `http(s)` URL.
    pub fn new(supabase_url: &str, anon_key: SecretString) -> Result<Self, ConfigError> {
        Ok(Self {
            supabase_url: parse_base_url("CYBERGUARD_SUPABASE_URL", supabase_url)?,
            anon_key,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the anon key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let supabase_url = get_required_env("CYBERGUARD_SUPABASE_URL")?;
        let anon_key = get_validated_secret("CYBERGUARD_SUPABASE_ANON_KEY")?;

        Self::new(&supabase_url, anon_key)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse a base URL, accepting only `http` and `https`.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq = std::collections::HashMap::<char, usize>::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Key length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy keys.
fn validate_key_strength(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InvalidEnvVar(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = SecretString::from(get_required_env(key)?);
    validate_key_strength(value.expose_secret(), key)?;
    Ok(value)
}
