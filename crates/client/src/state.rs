//! Client state for one client context.

use std::sync::Arc;

use crate::backend::{FunctionInvoker, IdentityService, TableStore};
use crate::config::ClientConfig;
use crate::services::access::AccessGuard;
use crate::services::auth::SessionProvider;
use crate::services::scans::ScanPipeline;
use crate::supabase::SupabaseClient;

/// Services for one client context.
///
/// Cheaply cloneable via `Arc`; clones share the same session.
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<ClientStateInner>,
}

struct ClientStateInner {
    sessions: SessionProvider,
    functions: Arc<dyn FunctionInvoker>,
    tables: Arc<dyn TableStore>,
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState").finish_non_exhaustive()
    }
}

impl ClientState {
    /// Wire the services to the Supabase project in `config`.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        let client = SupabaseClient::new(config);
        Self::new(
            Arc::new(client.clone()),
            Arc::new(client.clone()),
            Arc::new(client),
        )
    }

    /// Wire the services to arbitrary backends.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityService>,
        tables: Arc<dyn TableStore>,
        functions: Arc<dyn FunctionInvoker>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientStateInner {
                sessions: SessionProvider::new(identity, Arc::clone(&tables)),
                functions,
                tables,
            }),
        }
    }

    /// Get a reference to the session provider.
    #[must_use]
    pub fn sessions(&self) -> &SessionProvider {
        &self.inner.sessions
    }

    /// Access guard over this context's session.
    #[must_use]
    pub fn guard(&self) -> AccessGuard<'_> {
        AccessGuard::new(&self.inner.sessions)
    }

    /// Scan pipeline over this context's session and backends.
    #[must_use]
    pub fn scans(&self) -> ScanPipeline<'_> {
        ScanPipeline::new(
            &self.inner.sessions,
            self.inner.functions.as_ref(),
            self.inner.tables.as_ref(),
        )
    }
}
