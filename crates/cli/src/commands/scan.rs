//! Scan command.

use std::path::Path;

use cyberguard_client::ClientState;
use cyberguard_core::{FileData, ScanType};

use super::{CommandError, Credentials, emit, sign_in};

/// Sign in, submit one scan and print its result as JSON.
pub async fn run(
    state: &ClientState,
    credentials: &Credentials,
    scan_type: ScanType,
    input: String,
    file: Option<&Path>,
) -> Result<(), CommandError> {
    let file_data = match file {
        Some(path) => Some(FileData::from_bytes(&tokio::fs::read(path).await?)),
        None => None,
    };

    sign_in(state, credentials).await?;

    tracing::info!("Submitting {} scan...", scan_type);
    let outcome = state.scans().submit(scan_type, input, file_data).await;
    state.sessions().sign_out().await;

    let result = outcome?;
    emit(&serde_json::to_string_pretty(&result)?);
    Ok(())
}
