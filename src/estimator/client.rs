use super::request::VolatilityRequest;
use super::types::Estimate;
use crate::errors::{AppError, AppResult};
use reqwest::Client;
use std::time::Duration;

/// Estimation service client. One attempt per call, no retry.
#[derive(Clone)]
pub struct EstimationClient {
    client: Client,
    base_url: String,
}

impl EstimationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the request to its endpoint and decode the estimate.
    /// A non-success status carries the response body verbatim as the message.
    pub async fn estimate(&self, request: &VolatilityRequest) -> AppResult<Estimate> {
        let path = request.endpoint();
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(url = %url, mode = %request.mode(), n = request.len(), "posting estimation request");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(AppError::Service {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<Estimate>()
            .await
            .map_err(|e| AppError::Transport(format!("POST {path}: {e}")))
    }
}
