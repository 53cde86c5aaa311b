//! Effects produced by state transitions

use crate::llm::ChatRequest;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Make the backend call (spawns as background task)
    RequestBackend {
        request_id: u64,
        request: ChatRequest,
    },

    /// The transcript changed
    NotifyTranscript,

    /// The session status changed
    NotifyStatus,

    /// The draft changed
    NotifyDraft,

    /// The validation notice was set or cleared
    NotifyNotice,
}

impl Effect {
    pub fn request_backend(request_id: u64, request: ChatRequest) -> Self {
        Effect::RequestBackend {
            request_id,
            request,
        }
    }
}
