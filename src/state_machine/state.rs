//! Session state types

use crate::llm::Turn;
use serde::Serialize;

/// Shown when the backend call fails, whatever the cause
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Whether the session accepts new submissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepting input
    #[default]
    Idle,

    /// One backend call in flight; its outcome must carry `request_id`
    Pending { request_id: u64 },

    /// Last call failed; only a reset leaves this state
    Error { message: String },
}

impl SessionStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionStatus::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SessionStatus::Pending { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Pending { .. } => "pending",
            SessionStatus::Error { .. } => "error",
        }
    }
}

/// Everything the presentation layer can see about a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SessionState {
    /// Turns in conversation order; replayed verbatim to the backend
    pub conversation: Vec<Turn>,
    pub status: SessionStatus,
    /// Text being composed
    pub draft: String,
    /// Inline validation message from the last rejected submission
    pub notice: Option<String>,
    /// Id the next backend call will carry. Survives resets so a late
    /// outcome from an abandoned call never matches a newer one.
    #[serde(skip)]
    pub(crate) next_request_id: u64,
    /// The pending call was abandoned by a reset. It keeps the request slot
    /// until it resolves, and its outcome is dropped.
    #[serde(skip)]
    pub(crate) abandoned: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff idle and the draft has something to send
    pub fn can_submit(&self) -> bool {
        self.status.is_idle() && !self.draft.trim().is_empty()
    }

    /// The state a reset produces from this one
    ///
    /// A call in flight cannot be cancelled, so the session stays pending on
    /// it until its outcome arrives.
    pub(crate) fn cleared(&self) -> Self {
        let (status, abandoned) = match self.status {
            SessionStatus::Pending { request_id } => (SessionStatus::Pending { request_id }, true),
            _ => (SessionStatus::Idle, false),
        };
        Self {
            status,
            abandoned,
            next_request_id: self.next_request_id,
            ..Self::default()
        }
    }
}
