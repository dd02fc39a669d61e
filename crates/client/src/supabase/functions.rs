//! Remote function invocation over Supabase edge functions.

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument};

use super::SupabaseClient;
use super::error::remote_message;
use crate::backend::{FunctionInvoker, InvocationError};
use crate::models::Session;

#[async_trait]
impl FunctionInvoker for SupabaseClient {
    #[instrument(skip(self, session, body), fields(user_id = %session.user_id()))]
    async fn invoke(
        &self,
        session: &Session,
        name: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, InvocationError> {
        let url = self.endpoint(&format!("functions/v1/{name}"));

        let response = self
            .user_request(Method::POST, url, session.access_token())
            .json(body)
            .send()
            .await
            .map_err(|e| InvocationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InvocationError::Http {
                status: status.as_u16(),
                message: remote_message(&text),
            });
        }

        let value = response
            .json()
            .await
            .map_err(|e| InvocationError::Response(e.to_string()))?;

        debug!(status = status.as_u16(), "function returned");
        Ok(value)
    }
}
