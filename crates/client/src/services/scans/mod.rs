//! Scan submission pipeline.
//!
//! One submission is a strict sequence of remote calls:
//!
//! 1. Resolve the live session (no session: fail before anything is sent)
//! 2. Invoke the `scan-<type>` function with `{inputValue, fileData}`
//! 3. Decode the body, rejecting embedded `error` markers
//! 4. Persist a [`ScanRecord`] owned by the session's user
//! 5. Return the classifier's [`ScanResult`]
//!
//! A record is written only when a clean result was obtained under a valid
//! session. Nothing is retried.

mod error;
pub mod wire;

pub use error::{GENERIC_INVOCATION_MESSAGE, PERSISTENCE_MESSAGE, ScanError};
pub use wire::{ClassifierResponse, ScanPayload};

use tracing::{debug, error, instrument};

use cyberguard_core::{FileData, ScanRecord, ScanRequest, ScanResult, ScanType};

use super::auth::SessionProvider;
use crate::backend::{FunctionInvoker, TableStore};

/// Scan submission pipeline.
pub struct ScanPipeline<'a> {
    sessions: &'a SessionProvider,
    functions: &'a dyn FunctionInvoker,
    scans: &'a dyn TableStore,
}

impl<'a> ScanPipeline<'a> {
    /// Create a pipeline over the given session provider and backends.
    #[must_use]
    pub const fn new(
        sessions: &'a SessionProvider,
        functions: &'a dyn FunctionInvoker,
        scans: &'a dyn TableStore,
    ) -> Self {
        Self {
            sessions,
            functions,
            scans,
        }
    }

    /// Submit a scan of `input_value`, optionally with file data.
    ///
    /// # Errors
    ///
    /// See [`ScanPipeline::submit_scan`].
    pub async fn submit(
        &self,
        scan_type: ScanType,
        input_value: impl Into<String>,
        file_data: Option<FileData>,
    ) -> Result<ScanResult, ScanError> {
        let request = ScanRequest {
            scan_type,
            input_value: input_value.into(),
            file_data,
        };
        self.submit_scan(&request).await
    }

    /// Classify `request` remotely and record the result for the current user.
    ///
    /// # Errors
    ///
    /// - `ScanError::AuthRequired` if there is no live session
    /// - `ScanError::RemoteInvocation` if the function call failed
    /// - `ScanError::Classification` if the function reported an error
    /// - `ScanError::Persistence` if the result could not be recorded
    #[instrument(skip(self, request), fields(scan_type = %request.scan_type))]
    pub async fn submit_scan(&self, request: &ScanRequest) -> Result<ScanResult, ScanError> {
        let session = self
            .sessions
            .current_session()
            .await
            .ok_or(ScanError::AuthRequired)?;

        let function = request.scan_type.function_name();
        let payload = serde_json::to_value(ScanPayload::from(request)).map_err(|e| {
            error!(error = %e, "failed to encode scan payload");
            ScanError::RemoteInvocation(GENERIC_INVOCATION_MESSAGE.to_owned())
        })?;

        let body = self
            .functions
            .invoke(&session, &function, &payload)
            .await
            .map_err(|e| {
                error!(error = %e, function = %function, "scan function invocation failed");
                ScanError::RemoteInvocation(
                    e.remote_message()
                        .unwrap_or(GENERIC_INVOCATION_MESSAGE)
                        .to_owned(),
                )
            })?;

        let result = match ClassifierResponse::decode(body) {
            Ok(ClassifierResponse::Completed(result)) => result,
            Ok(ClassifierResponse::Rejected(message)) => {
                error!(function = %function, message = %message, "classifier reported an error");
                return Err(ScanError::Classification(message));
            }
            Err(e) => {
                error!(error = %e, function = %function, "malformed classifier response");
                return Err(ScanError::Classification(format!(
                    "malformed classifier response: {e}"
                )));
            }
        };

        let record = ScanRecord::new(session.user_id().clone(), request, &result);
        self.scans
            .insert_scan(&session, &record)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to save scan result");
                ScanError::Persistence(PERSISTENCE_MESSAGE.to_owned())
            })?;

        debug!(
            user_id = %session.user_id(),
            classification = %result.classification,
            risk_level = %result.risk_level,
            "scan recorded"
        );

        Ok(result)
    }
}
