//! Request body and response decoding for the remote classifiers.

use serde::Serialize;
use serde_json::Value;

use cyberguard_core::{FileData, ScanRequest, ScanResult};

/// Body sent to a `scan-<type>` function.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload<'a> {
    pub input_value: &'a str,
    /// Serialized as `null` when absent.
    pub file_data: Option<&'a FileData>,
}

impl<'a> From<&'a ScanRequest> for ScanPayload<'a> {
    fn from(request: &'a ScanRequest) -> Self {
        Self {
            input_value: &request.input_value,
            file_data: request.file_data.as_ref(),
        }
    }
}

/// Decoded classifier response.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierResponse {
    /// The classifier produced a result.
    Completed(ScanResult),
    /// The classifier answered with an embedded `error` marker.
    Rejected(String),
}

impl ClassifierResponse {
    /// Decode a response body.
    ///
    /// An `error` field that is present and set (not `null`, `false`, `0` or `""`)
    /// makes the response a rejection, whatever else the body carries.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body is neither a rejection nor a
    /// well-formed result.
    pub fn decode(body: Value) -> Result<Self, serde_json::Error> {
        if let Some(marker) = body.get("error").filter(|marker| is_set(marker)) {
            return Ok(Self::Rejected(error_message(marker)));
        }

        serde_json::from_value(body).map(Self::Completed)
    }
}

fn is_set(marker: &Value) -> bool {
    match marker {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => true,
    }
}

fn error_message(marker: &Value) -> String {
    match marker {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| marker.to_string(), str::to_owned),
        other => other.to_string(),
    }
}
