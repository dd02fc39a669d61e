//! CyberGuard Core - Shared domain types.
//!
//! This crate provides the types passed between the CyberGuard components:
//! - `client` - Session provider, access guard and scan submission pipeline
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identity types, scan requests/results and the persisted scan record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
