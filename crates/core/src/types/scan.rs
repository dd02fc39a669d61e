//! Scan request, classifier result and persisted scan record types.

use core::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Maximum number of characters of the scanned input kept in a [`ScanRecord`].
pub const MAX_PERSISTED_INPUT_CHARS: usize = 1000;

/// Error returned when parsing an unknown [`ScanType`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scan type: {0} (expected one of url, email, message, file, website, qr)")]
pub struct ScanTypeError(pub String);

/// Category of scan, selecting which remote classifier handles the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Url,
    Email,
    Message,
    File,
    Website,
    Qr,
}

impl ScanType {
    /// All scan types, in sidebar order.
    pub const ALL: [Self; 6] = [
        Self::Url,
        Self::Email,
        Self::Message,
        Self::File,
        Self::Website,
        Self::Qr,
    ];

    /// Wire name of the scan type (`url`, `email`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Email => "email",
            Self::Message => "message",
            Self::File => "file",
            Self::Website => "website",
            Self::Qr => "qr",
        }
    }

    /// Name of the remote function handling this scan type (`scan-<type>`).
    #[must_use]
    pub fn function_name(self) -> String {
        format!("scan-{}", self.as_str())
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScanType {
    type Err = ScanTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ScanTypeError(s.to_owned()))
    }
}

/// File payload attached to a scan.
///
/// Opaque to this crate: the encoding and size limits belong to the remote
/// function. [`FileData::from_bytes`] produces the standard base64 encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileData(String);

impl FileData {
    /// Wrap an already-encoded payload.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encode raw file bytes as standard base64.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// The encoded payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single scan submission. Exists only for the duration of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub scan_type: ScanType,
    pub input_value: String,
    pub file_data: Option<FileData>,
}

impl ScanRequest {
    /// Create a request without file data.
    #[must_use]
    pub fn new(scan_type: ScanType, input_value: impl Into<String>) -> Self {
        Self {
            scan_type,
            input_value: input_value.into(),
            file_data: None,
        }
    }

    /// Attach file data to the request.
    #[must_use]
    pub fn with_file(mut self, file_data: FileData) -> Self {
        self.file_data = Some(file_data);
        self
    }
}

/// Result produced by a remote classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Classifier verdict (e.g. `benign`, `phishing`).
    pub classification: String,
    /// Confidence of the verdict, conceptually in `[0, 1]`.
    pub confidence_score: f64,
    /// Risk level reported by the classifier (e.g. `low`, `high`).
    pub risk_level: String,
    /// Classifier-specific structured details.
    #[serde(default)]
    pub analysis_details: serde_json::Value,
}

/// Row written to the `scans` table after a successful classification.
///
/// `created_at` is assigned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub user_id: UserId,
    pub scan_type: ScanType,
    /// First [`MAX_PERSISTED_INPUT_CHARS`] characters of the scanned input.
    pub input_value: String,
    pub classification: String,
    pub confidence_score: f64,
    pub risk_level: String,
    pub analysis_details: serde_json::Value,
}

impl ScanRecord {
    /// Build the record for `owner`, truncating the input and copying the
    /// result fields verbatim.
    #[must_use]
    pub fn new(owner: UserId, request: &ScanRequest, result: &ScanResult) -> Self {
        Self {
            user_id: owner,
            scan_type: request.scan_type,
            input_value: truncate_chars(&request.input_value, MAX_PERSISTED_INPUT_CHARS)
                .to_owned(),
            classification: result.classification.clone(),
            confidence_score: result.confidence_score,
            risk_level: result.risk_level.clone(),
            analysis_details: result.analysis_details.clone(),
        }
    }
}

/// Returns the first `max` characters of `s`.
///
/// Never splits a character; returns `s` unchanged when it is short enough.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s.get(..byte_idx).unwrap_or(s),
        None => s,
    }
}
