//! Pure state transition function
//!
//! Given the same state and event it always produces the same result, with no
//! I/O. The runtime executes the returned effects.

use super::state::GENERIC_ERROR_MESSAGE;
use super::validate::validate;
use super::{Effect, Event, SessionState, SessionStatus};
use crate::llm::{ChatRequest, Turn};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition. The state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Still waiting for the previous answer")]
    Busy,
    #[error("The last request failed; reset the conversation to continue")]
    ErrorUnresolved,
    #[error("Outcome of request {0} no longer matches the session")]
    StaleOutcome(u64),
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&state.status, event) {
        // ============================================================
        // Draft editing and suggestions
        // ============================================================

        // Input is disabled while a call is in flight
        (SessionStatus::Pending { .. }, Event::DraftChanged { .. } | Event::Suggest { .. }) => {
            Err(TransitionError::Busy)
        }

        (_, Event::DraftChanged { text } | Event::Suggest { question: text }) => {
            let new_state = SessionState {
                draft: text,
                notice: None,
                ..state.clone()
            };
            Ok(announce(state, new_state))
        }

        // ============================================================
        // Submission
        // ============================================================
        (SessionStatus::Pending { .. }, Event::Submit) => Err(TransitionError::Busy),

        (SessionStatus::Error { .. }, Event::Submit) => Err(TransitionError::ErrorUnresolved),

        (SessionStatus::Idle, Event::Submit) => match validate(&state.draft) {
            // Announced even when the notice was already showing
            Err(e) => {
                let new_state = SessionState {
                    notice: Some(e.to_string()),
                    ..state.clone()
                };
                Ok(TransitionResult::new(new_state).with_effect(Effect::NotifyNotice))
            }
            Ok(text) => {
                let request_id = state.next_request_id;
                let mut conversation = state.conversation.clone();
                conversation.push(Turn::user(text.clone()));
                let request = ChatRequest::new(conversation.clone(), text);

                let new_state = SessionState {
                    conversation,
                    status: SessionStatus::Pending { request_id },
                    draft: String::new(),
                    notice: None,
                    next_request_id: request_id.wrapping_add(1),
                    abandoned: false,
                };
                Ok(announce(state, new_state)
                    .with_effect(Effect::request_backend(request_id, request)))
            }
        },

        // ============================================================
        // Backend outcomes
        // ============================================================

        // The call outlived a reset; free the slot and drop what it returned
        (
            SessionStatus::Pending { request_id },
            Event::BackendResponse { request_id: id, .. }
            | Event::BackendError { request_id: id, .. },
        ) if *request_id == id && state.abandoned => {
            let new_state = SessionState {
                status: SessionStatus::Idle,
                abandoned: false,
                ..state.clone()
            };
            Ok(announce(state, new_state))
        }

        (SessionStatus::Pending { request_id }, Event::BackendResponse { request_id: id, text })
            if *request_id == id =>
        {
            let mut conversation = state.conversation.clone();
            conversation.push(Turn::model(text));
            let new_state = SessionState {
                conversation,
                status: SessionStatus::Idle,
                ..state.clone()
            };
            Ok(announce(state, new_state))
        }

        (SessionStatus::Pending { request_id }, Event::BackendError { request_id: id, .. })
            if *request_id == id =>
        {
            let new_state = SessionState {
                status: SessionStatus::Error {
                    message: GENERIC_ERROR_MESSAGE.to_string(),
                },
                ..state.clone()
            };
            Ok(announce(state, new_state))
        }

        // No call with this id is outstanding
        (
            _,
            Event::BackendResponse { request_id, .. } | Event::BackendError { request_id, .. },
        ) => Err(TransitionError::StaleOutcome(request_id)),

        // ============================================================
        // Reset, valid from any status
        // ============================================================
        (_, Event::Reset) => Ok(announce(state, state.cleared())),
    }
}

/// Wrap `new_state` with a notification for each visible part that differs
/// from `old`
fn announce(old: &SessionState, new_state: SessionState) -> TransitionResult {
    let mut effects = Vec::new();
    if new_state.conversation != old.conversation {
        effects.push(Effect::NotifyTranscript);
    }
    if new_state.draft != old.draft {
        effects.push(Effect::NotifyDraft);
    }
    if new_state.notice != old.notice {
        effects.push(Effect::NotifyNotice);
    }
    if new_state.status != old.status {
        effects.push(Effect::NotifyStatus);
    }
    TransitionResult::new(new_state).with_effects(effects)
}
