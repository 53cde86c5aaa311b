//! Gemini proxy backend
//!
//! The proxy owns the API key and the model choice; this client only posts the
//! conversation and reads back the answer as plain text.

use super::types::ChatRequest;
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

/// Longest slice of an error body carried into the error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client for the Gemini proxy endpoint
pub struct GeminiProxyService {
    client: Client,
    endpoint: Url,
}

impl GeminiProxyService {
    /// No request timeout is configured; the call runs until the transport
    /// gives up.
    pub fn new(endpoint: Url) -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl LlmService for GeminiProxyService {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| LlmError::request(format!("Failed to encode request: {e}")))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            history_len = request.history.len(),
            payload_bytes = body.len(),
            "Posting conversation"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(LlmError::status(
                status.as_u16(),
                format!("HTTP {status}: {excerpt}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| LlmError::body(format!("Failed to read response: {e}")))
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}
