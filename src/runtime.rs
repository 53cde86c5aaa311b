//! Runtime for executing a session
//!
//! The presentation layer drives a session through [`SessionHandle`] and
//! watches it through snapshots and [`SessionUpdate`] notifications.

mod executor;


pub use executor::SessionRuntime;

use crate::llm::{LlmService, Turn};
use crate::state_machine::{Event, SessionState, SessionStatus};
use crate::suggestions;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

/// Notifications sent to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// The transcript changed; carries the full transcript
    TranscriptChanged { turns: Vec<Turn> },
    StatusChanged { status: SessionStatus },
    DraftChanged { draft: String },
    /// The inline validation notice was shown or hidden
    NoticeChanged { notice: Option<String> },
    /// A command was refused in the current status
    Rejected { message: String },
}

#[derive(Debug, Error)]
#[error("Session runtime has stopped")]
pub struct SessionClosed;

/// Handle to interact with a running session
pub struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
    snapshot_rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Start a session runtime on the current tokio runtime
    pub fn spawn<L>(llm: Arc<L>) -> Self
    where
        L: LlmService + ?Sized + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionState::new());

        let runtime = SessionRuntime::new(
            uuid::Uuid::new_v4().to_string(),
            llm,
            event_rx,
            event_tx.downgrade(),
            broadcast_tx.clone(),
            snapshot_tx,
        );
        tokio::spawn(runtime.run());

        Self {
            event_tx,
            broadcast_tx,
            snapshot_rx,
        }
    }

    /// Replace the draft
    pub async fn set_draft(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Event::DraftChanged { text: text.into() }).await
    }

    /// Submit the current draft
    pub async fn submit(&self) -> Result<(), SessionClosed> {
        self.send(Event::Submit).await
    }

    /// Clear the conversation and recover from errors
    pub async fn reset(&self) -> Result<(), SessionClosed> {
        self.send(Event::Reset).await
    }

    /// Put a random example question in the draft and return it
    pub async fn suggest(&self) -> Result<String, SessionClosed> {
        let question = suggestions::pick(&mut rand::thread_rng()).to_string();
        self.send(Event::Suggest {
            question: question.clone(),
        })
        .await?;
        Ok(question)
    }

    /// Latest state, read-only
    pub fn snapshot(&self) -> SessionState {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.broadcast_tx.subscribe()
    }

    async fn send(&self, event: Event) -> Result<(), SessionClosed> {
        self.event_tx.send(event).await.map_err(|_| SessionClosed)
    }
}
