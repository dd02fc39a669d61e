//! HTTP backends for a Supabase project.
//!
//! [`SupabaseClient`] implements all three remote boundaries:
//!
//! - [`IdentityService`](crate::backend::IdentityService) over the auth API (`/auth/v1`)
//! - [`TableStore`](crate::backend::TableStore) over the REST API (`/rest/v1`)
//! - [`FunctionInvoker`](crate::backend::FunctionInvoker) over edge functions (`/functions/v1`)
//!
//! Every request carries the project's anon key as `apikey`. Requests made on
//! behalf of a user carry the session's access token as the bearer token.
//! No timeouts are set locally.

mod auth;
mod error;
mod functions;
mod rest;
mod types;

use std::sync::Arc;

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::ClientConfig;

pub use error::remote_message;

/// HTTP client for one Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Create a client for the configured project.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                base_url: config.supabase_url.clone(),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    /// URL of `path` below the project base URL.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    /// Request authenticated with the anon key only.
    fn anon_request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        let anon_key = self.inner.anon_key.expose_secret();
        self.inner
            .client
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(anon_key)
    }

    /// Request made on behalf of the holder of `access_token`.
    fn user_request(
        &self,
        method: reqwest::Method,
        url: Url,
        access_token: &SecretString,
    ) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(access_token.expose_secret())
    }
}
