//! Core types for CyberGuard.
//!
//! This module provides type-safe wrappers for the identity and scan domain.

pub mod id;
pub mod scan;
pub mod user;

pub use id::UserId;
pub use scan::{
    FileData, MAX_PERSISTED_INPUT_CHARS, ScanRecord, ScanRequest, ScanResult, ScanType,
    ScanTypeError, truncate_chars,
};
pub use user::User;
