//! Table store over the Supabase REST API.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

use cyberguard_core::{ScanRecord, UserId};

use super::SupabaseClient;
use super::error::remote_message;
use crate::backend::{AdminEntry, StorageError, TableStore};
use crate::models::Session;

/// Media type asking the REST API for exactly one row as a bare object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[async_trait]
impl TableStore for SupabaseClient {
    #[instrument(skip(self, session))]
    async fn find_admin(
        &self,
        session: &Session,
        user_id: &UserId,
    ) -> Result<Option<AdminEntry>, StorageError> {
        let mut url = self.endpoint("rest/v1/admins");
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("id", &format!("eq.{user_id}"));

        let response = self
            .user_request(Method::GET, url, session.access_token())
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        // Zero or several matching rows
        if status == StatusCode::NOT_ACCEPTABLE {
            debug!("no single admins row");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let entry: AdminEntry = response
            .json()
            .await
            .map_err(|e| StorageError::Response(e.to_string()))?;

        Ok(Some(entry))
    }

    #[instrument(skip(self, session, record), fields(user_id = %record.user_id, scan_type = %record.scan_type))]
    async fn insert_scan(&self, session: &Session, record: &ScanRecord) -> Result<(), StorageError> {
        let response = self
            .user_request(
                Method::POST,
                self.endpoint("rest/v1/scans"),
                session.access_token(),
            )
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        debug!("scan row inserted");
        Ok(())
    }
}

fn api_error(status: StatusCode, body: &str) -> StorageError {
    StorageError::Api {
        status: status.as_u16(),
        message: remote_message(body).unwrap_or_else(|| status.to_string()),
    }
}
