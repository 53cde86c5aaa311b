//! ask-gemini - terminal question-answering client
//!
//! A conversation state machine in front of a Gemini proxy endpoint, driven
//! from a line console.

mod config;
mod console;
mod llm;
mod runtime;
mod state_machine;
mod suggestions;

use config::{AppConfig, LogFormat};
use llm::{GeminiProxyService, LlmService, LoggingService};
use runtime::SessionHandle;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_logging(config.log_format);

    let backend = GeminiProxyService::new(config.backend_url.clone())?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(backend)));
    tracing::info!(backend = %config.backend_url, "Backend configured");

    let handle = SessionHandle::spawn(llm);
    console::run(handle).await?;

    Ok(())
}

/// Logs go to stderr so the transcript on stdout stays readable
fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ask_gemini=warn".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
