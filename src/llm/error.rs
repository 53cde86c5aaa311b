//! Backend error types

use thiserror::Error;

/// Backend error with classification
///
/// The session treats every kind the same way; the classification only
/// feeds the logs.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// HTTP status for [`LlmErrorKind::Status`] failures
    pub status: Option<u16>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(LlmErrorKind::Status, message)
        }
    }

    pub fn body(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Body, message)
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Request, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection refused, DNS, TLS, reset
    Network,
    /// Backend answered with a non-2xx status
    Status,
    /// Response body could not be read
    Body,
    /// Request could not be built or encoded
    Request,
}

impl LlmErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Status => "status",
            Self::Body => "body",
            Self::Request => "request",
        }
    }
}
