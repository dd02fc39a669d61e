//! Client services.
//!
//! # Services
//!
//! - `auth` - Session provider (sign-in/up/out, current user, admin membership)
//! - `access` - Access guard for page loads
//! - `scans` - Scan submission pipeline

pub mod access;
pub mod auth;
pub mod scans;
