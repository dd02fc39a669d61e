//! CyberGuard client library.
//!
//! Authenticates users against the remote identity service, gates page access
//! on session and admin state, and submits scans to the remote classifiers.
//!
//! # Architecture
//!
//! - [`backend`] - Traits for the three remote boundaries (identity, tables, functions)
//! - [`supabase`] - HTTP implementations of those traits
//! - [`services`] - Session provider, access guard and scan submission pipeline
//! - [`presentation`] - Navigation and theme model consumed by the UI
//! - [`state`] - Wiring of the services for a single client context

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod models;
pub mod presentation;
pub mod services;
pub mod state;
pub mod supabase;

pub use backend::{
    AdminEntry, FunctionInvoker, IdentityService, InvocationError, StorageError, TableStore,
};
pub use config::{ClientConfig, ConfigError};
pub use models::Session;
pub use services::access::{AccessDecision, AccessGuard, RedirectTarget};
pub use services::auth::{AuthError, SessionProvider};
pub use services::scans::{ScanError, ScanPipeline};
pub use state::ClientState;
