//! Startup configuration from the environment

use reqwest::Url;
use thiserror::Error;

/// The endpoint the original web client talked to
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/gemini";

pub const BACKEND_URL_VAR: &str = "ASK_GEMINI_BACKEND_URL";
pub const LOG_FORMAT_VAR: &str = "ASK_GEMINI_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ASK_GEMINI_BACKEND_URL={url:?} is not a usable backend URL: {reason}")]
    InvalidBackendUrl { url: String, reason: String },
    #[error("ASK_GEMINI_LOG_FORMAT={0:?} is not a log format (expected json or pretty)")]
    UnknownLogFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: Url,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get(BACKEND_URL_VAR).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = parse_backend_url(raw_url.trim())?;

        let log_format = match get(LOG_FORMAT_VAR) {
            None => LogFormat::default(),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                _ => return Err(ConfigError::UnknownLogFormat(raw)),
            },
        };

        Ok(Self {
            backend_url,
            log_format,
        })
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBackendUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}
