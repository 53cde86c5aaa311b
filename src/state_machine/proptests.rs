//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::llm::{LlmErrorKind, Role, Turn};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z?,. ]{1,30}",
        // Blank drafts
        "[ \t\n]{0,5}",
    ]
}

fn arb_question() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z?,. ]{0,29}"
}

fn arb_turn() -> impl Strategy<Value = Turn> {
    prop_oneof![
        arb_question().prop_map(Turn::user),
        "[a-zA-Z0-9*#`. \n]{0,40}".prop_map(Turn::model),
    ]
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::Status),
        Just(LlmErrorKind::Body),
        Just(LlmErrorKind::Request),
    ]
}

fn arb_status() -> impl Strategy<Value = SessionStatus> {
    prop_oneof![
        Just(SessionStatus::Idle),
        (0u64..10).prop_map(|request_id| SessionStatus::Pending { request_id }),
        Just(SessionStatus::Error {
            message: GENERIC_ERROR_MESSAGE.to_string()
        }),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    (
        proptest::collection::vec(arb_turn(), 0..6),
        arb_status(),
        arb_text(),
        proptest::option::of(Just("Error! Please ask a question.".to_string())),
        0u64..10,
        any::<bool>(),
    )
        .prop_map(
            |(conversation, status, draft, notice, next_request_id, abandoned)| {
                // Only a call in flight can be abandoned
                let abandoned = abandoned && status.is_pending();
                SessionState {
                    conversation,
                    status,
                    draft,
                    notice,
                    next_request_id,
                    abandoned,
                }
            },
        )
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::DraftChanged { text }),
        Just(Event::Submit),
        arb_question().prop_map(|question| Event::Suggest { question }),
        Just(Event::Reset),
        (0u64..10, "[a-zA-Z. ]{0,30}")
            .prop_map(|(request_id, text)| Event::BackendResponse { request_id, text }),
        (0u64..10, arb_error_kind()).prop_map(|(request_id, kind)| Event::BackendError {
            request_id,
            message: "boom".to_string(),
            kind,
        }),
    ]
}

/// User-level actions; backend outcomes are aimed at whatever call is pending
#[derive(Debug, Clone)]
enum Op {
    Type(String),
    Submit,
    Suggest(String),
    Reset,
    Answer(String),
    Fail,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_text().prop_map(Op::Type),
        Just(Op::Submit),
        arb_question().prop_map(Op::Suggest),
        Just(Op::Reset),
        "[a-zA-Z. ]{1,30}".prop_map(Op::Answer),
        Just(Op::Fail),
    ]
}

fn op_to_event(state: &SessionState, op: Op) -> Event {
    let pending_id = match state.status {
        SessionStatus::Pending { request_id } => request_id,
        _ => state.next_request_id,
    };
    match op {
        Op::Type(text) => Event::DraftChanged { text },
        Op::Submit => Event::Submit,
        Op::Suggest(question) => Event::Suggest { question },
        Op::Reset => Event::Reset,
        Op::Answer(text) => Event::BackendResponse {
            request_id: pending_id,
            text,
        },
        Op::Fail => Event::BackendError {
            request_id: pending_id,
            message: "connection refused".to_string(),
            kind: LlmErrorKind::Network,
        },
    }
}

fn backend_requests(effects: &[Effect]) -> Vec<u64> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::RequestBackend { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: a backend call is only issued from idle, and the session
    // then waits on exactly that call
    #[test]
    fn prop_single_flight(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            let requests = backend_requests(&result.effects);
            prop_assert!(requests.len() <= 1, "More than one call: {:?}", requests);
            if let Some(id) = requests.first() {
                prop_assert!(state.status.is_idle(), "Call issued from {:?}", state.status);
                prop_assert!(!state.abandoned);
                prop_assert_eq!(
                    &result.new_state.status,
                    &SessionStatus::Pending { request_id: *id }
                );
            }
        }
    }

    // Invariant 2: nothing the user does while pending is accepted, except reset
    #[test]
    fn prop_pending_refuses_input(
        mut state in arb_state(),
        request_id in 0u64..10,
        event in arb_event()
    ) {
        state.status = SessionStatus::Pending { request_id };
        let is_reset = matches!(event, Event::Reset);
        let is_user = !matches!(
            event,
            Event::BackendResponse { .. } | Event::BackendError { .. }
        );
        let result = transition(&state, event);
        if is_user && !is_reset {
            prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
        }
    }

    // Invariant 3: turns are only ever appended, one at a time, except by reset
    #[test]
    fn prop_conversation_append_only(state in arb_state(), event in arb_event()) {
        let is_reset = matches!(event, Event::Reset);
        if let Ok(result) = transition(&state, event) {
            let before = &state.conversation;
            let after = &result.new_state.conversation;
            if is_reset {
                prop_assert!(after.is_empty());
            } else {
                prop_assert!(after.len() == before.len() || after.len() == before.len() + 1);
                prop_assert_eq!(&after[..before.len()], &before[..]);
            }
        }
    }

    // Invariant 4: every visible change is announced
    #[test]
    fn prop_changes_are_notified(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            let new_state = &result.new_state;
            if new_state.conversation != state.conversation {
                prop_assert!(result.effects.contains(&Effect::NotifyTranscript));
            }
            if new_state.status != state.status {
                prop_assert!(result.effects.contains(&Effect::NotifyStatus));
            }
            if new_state.draft != state.draft {
                prop_assert!(result.effects.contains(&Effect::NotifyDraft));
            }
            if new_state.notice != state.notice {
                prop_assert!(result.effects.contains(&Effect::NotifyNotice));
            }
        }
    }

    // Invariant 5: reset is idempotent, and a call in flight keeps the session
    // pending on it
    #[test]
    fn prop_reset_idempotent(state in arb_state()) {
        let once = transition(&state, Event::Reset).unwrap().new_state;
        let twice = transition(&once, Event::Reset).unwrap();
        prop_assert_eq!(&twice.new_state, &once);
        prop_assert!(twice.effects.is_empty());
        prop_assert!(once.conversation.is_empty());
        prop_assert!(once.draft.is_empty());
        prop_assert!(once.notice.is_none());
        match state.status {
            SessionStatus::Pending { .. } => {
                prop_assert_eq!(&once.status, &state.status);
                prop_assert!(once.abandoned);
            }
            _ => {
                prop_assert!(once.status.is_idle());
                prop_assert!(!once.abandoned);
            }
        }
    }

    // Invariant 6: blank submissions change nothing but the notice
    #[test]
    fn prop_blank_submission_rejected(mut state in arb_state(), blank in "[ \t\n]{0,5}") {
        state.status = SessionStatus::Idle;
        state.draft = blank;
        let result = transition(&state, Event::Submit).unwrap();
        prop_assert_eq!(&result.new_state.conversation, &state.conversation);
        prop_assert_eq!(&result.new_state.status, &state.status);
        prop_assert_eq!(&result.new_state.draft, &state.draft);
        prop_assert!(result.new_state.notice.is_some());
        prop_assert!(backend_requests(&result.effects).is_empty());
    }

    // Invariant 7: a successful round adds exactly user then model
    #[test]
    fn prop_success_adds_two_turns(
        history in proptest::collection::vec(arb_turn(), 0..6),
        question in arb_question(),
        answer in "[a-zA-Z. ]{1,30}"
    ) {
        let state = SessionState {
            conversation: history.clone(),
            draft: question.clone(),
            ..SessionState::new()
        };
        let pending = transition(&state, Event::Submit).unwrap().new_state;
        let SessionStatus::Pending { request_id } = pending.status else {
            return Err(TestCaseError::fail("submission did not go pending"));
        };
        let done = transition(&pending, Event::BackendResponse { request_id, text: answer.clone() })
            .unwrap()
            .new_state;

        prop_assert_eq!(done.conversation.len(), history.len() + 2);
        prop_assert_eq!(&done.conversation[history.len()], &Turn::user(question.trim()));
        prop_assert_eq!(&done.conversation[history.len() + 1], &Turn::model(answer));
        prop_assert!(done.status.is_idle());
        prop_assert!(done.draft.is_empty());
    }

    // Invariant 8: a failed round adds only the user turn
    #[test]
    fn prop_failure_adds_one_turn(
        history in proptest::collection::vec(arb_turn(), 0..6),
        question in arb_question(),
        kind in arb_error_kind()
    ) {
        let state = SessionState {
            conversation: history.clone(),
            draft: question.clone(),
            ..SessionState::new()
        };
        let pending = transition(&state, Event::Submit).unwrap().new_state;
        let SessionStatus::Pending { request_id } = pending.status else {
            return Err(TestCaseError::fail("submission did not go pending"));
        };
        let failed = transition(
            &pending,
            Event::BackendError { request_id, message: "down".to_string(), kind },
        )
        .unwrap()
        .new_state;

        prop_assert_eq!(failed.conversation.len(), history.len() + 1);
        prop_assert_eq!(failed.conversation.last().map(|t| t.role), Some(Role::User));
        prop_assert_eq!(failed.status.error_message(), Some(GENERIC_ERROR_MESSAGE));
        prop_assert!(failed.draft.is_empty());
    }

    // Invariant 9: along any session, at most one call is unresolved and the
    // session is pending on exactly that call; pending on a live call always
    // waits on the newest user turn; request ids never repeat
    #[test]
    fn prop_session_sequences(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut state = SessionState::new();
        let mut issued: Vec<u64> = Vec::new();
        let mut unresolved: Vec<u64> = Vec::new();

        for op in ops {
            let event = op_to_event(&state, op);
            let outcome_for = match &event {
                Event::BackendResponse { request_id, .. }
                | Event::BackendError { request_id, .. } => Some(*request_id),
                _ => None,
            };
            if let Ok(result) = transition(&state, event) {
                if let Some(id) = outcome_for {
                    unresolved.retain(|pending| *pending != id);
                }
                let requests = backend_requests(&result.effects);
                unresolved.extend(&requests);
                issued.extend(requests);
                state = result.new_state;
            }

            prop_assert!(unresolved.len() <= 1, "Calls in flight: {:?}", unresolved);
            match state.status {
                SessionStatus::Pending { request_id } => {
                    prop_assert_eq!(&unresolved, &vec![request_id]);
                }
                _ => {
                    prop_assert!(unresolved.is_empty(), "Unowned calls: {:?}", unresolved);
                }
            }

            if state.status.is_pending() && !state.abandoned {
                prop_assert_eq!(state.conversation.last().map(|t| t.role), Some(Role::User));
            }
            for turn in state.conversation.iter().filter(|t| t.role == Role::User) {
                prop_assert!(!turn.content.trim().is_empty());
            }
        }

        prop_assert!(issued.windows(2).all(|w| w[0] < w[1]), "Ids reused: {:?}", issued);
    }
}
