//! Session runtime executor

use super::SessionUpdate;
use crate::llm::{ChatRequest, LlmService};
use crate::state_machine::{transition, Effect, Event, SessionState, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns one session's state and applies events to it one at a time
pub struct SessionRuntime<L>
where
    L: LlmService + ?Sized + 'static,
{
    session_id: String,
    state: SessionState,
    llm: Arc<L>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the loop ends once every handle is gone and no call is in flight
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
    snapshot_tx: watch::Sender<SessionState>,
}

impl<L> SessionRuntime<L>
where
    L: LlmService + ?Sized + 'static,
{
    pub fn new(
        session_id: impl Into<String>,
        llm: Arc<L>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::WeakSender<Event>,
        broadcast_tx: broadcast::Sender<SessionUpdate>,
        snapshot_tx: watch::Sender<SessionState>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            state: SessionState::new(),
            llm,
            event_rx,
            event_tx,
            broadcast_tx,
            snapshot_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        if let Event::BackendError { message, kind, .. } = &event {
            tracing::warn!(
                session_id = %self.session_id,
                kind = kind.as_str(),
                error = %message,
                "Backend call failed"
            );
        }

        match transition(&self.state, event) {
            Ok(result) => {
                let previous = self.state.status.name();
                if self.state.abandoned && !result.new_state.abandoned {
                    tracing::info!(
                        session_id = %self.session_id,
                        "Dropped outcome of a call abandoned by reset"
                    );
                }
                self.state = result.new_state;
                tracing::debug!(
                    session_id = %self.session_id,
                    from = previous,
                    to = self.state.status.name(),
                    turns = self.state.conversation.len(),
                    "Applied event"
                );

                self.snapshot_tx.send_replace(self.state.clone());
                for effect in result.effects {
                    self.execute_effect(effect);
                }
            }
            Err(e @ TransitionError::StaleOutcome(_)) => {
                tracing::debug!(session_id = %self.session_id, reason = %e, "Discarding backend outcome");
            }
            Err(e) => {
                tracing::info!(session_id = %self.session_id, reason = %e, "Command refused");
                let _ = self.broadcast_tx.send(SessionUpdate::Rejected {
                    message: e.to_string(),
                });
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestBackend {
                request_id,
                request,
            } => self.spawn_request(request_id, request),

            Effect::NotifyTranscript => {
                let _ = self.broadcast_tx.send(SessionUpdate::TranscriptChanged {
                    turns: self.state.conversation.clone(),
                });
            }

            Effect::NotifyStatus => {
                let _ = self.broadcast_tx.send(SessionUpdate::StatusChanged {
                    status: self.state.status.clone(),
                });
            }

            Effect::NotifyDraft => {
                let _ = self.broadcast_tx.send(SessionUpdate::DraftChanged {
                    draft: self.state.draft.clone(),
                });
            }

            Effect::NotifyNotice => {
                let _ = self.broadcast_tx.send(SessionUpdate::NoticeChanged {
                    notice: self.state.notice.clone(),
                });
            }
        }
    }

    /// Run the backend call as a background task; its outcome comes back
    /// through the event channel
    fn spawn_request(&self, request_id: u64, request: ChatRequest) {
        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::warn!(session_id = %self.session_id, "Session closing, backend call skipped");
            return;
        };
        let llm = self.llm.clone();
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            tracing::info!(
                session_id = %session_id,
                request_id,
                history_len = request.history.len(),
                "Making backend request (background)"
            );

            let event = match llm.complete(&request).await {
                Ok(text) => Event::BackendResponse { request_id, text },
                Err(e) => Event::BackendError {
                    request_id,
                    message: e.message,
                    kind: e.kind,
                },
            };
            let _ = event_tx.send(event).await;
        });
    }
}
