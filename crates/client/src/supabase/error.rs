//! Error body handling shared by the Supabase APIs.

use serde_json::Value;

/// Fields that carry a human-readable message, in order of preference.
///
/// The auth API uses `msg` / `error_description`, the REST API `message`,
/// edge functions whatever the function author chose (usually `error`).
const MESSAGE_FIELDS: &[&str] = &["msg", "message", "error_description", "error"];

/// Extract a human-readable message from an error response body.
///
/// Returns `None` when the body is not JSON or carries no non-empty message.
#[must_use]
pub fn remote_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    MESSAGE_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find(|message| !message.trim().is_empty())
        .map(str::to_owned)
}

/// Machine-readable error code of an auth API error body.
pub(super) fn error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    ["error_code", "code", "error"]
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .next()
        .map(str::to_owned)
}
