//! Backend abstraction
//!
//! The session talks to the language model through [`LlmService`]; the only
//! production implementation posts to the Gemini proxy.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiProxyService;
pub use types::{ChatRequest, Role, Turn};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for answer backends
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Send the conversation and return the complete answer text
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Where requests go, for logs
    fn endpoint(&self) -> &str;
}

/// Logging wrapper for backends
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    endpoint: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(answer) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    history_len = request.history.len(),
                    answer_bytes = answer.len(),
                    "Backend request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Backend request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
