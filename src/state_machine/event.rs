//! Events that drive a session

use crate::llm::LlmErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    DraftChanged {
        text: String,
    },
    Submit,
    Suggest {
        question: String,
    },
    Reset,

    // Backend events
    BackendResponse {
        request_id: u64,
        text: String,
    },
    BackendError {
        request_id: u64,
        message: String,
        kind: LlmErrorKind,
    },
}
