//! Transcript bookkeeping for the line console

use super::render::render_markdown;
use crate::llm::{Role, Turn};

/// What a "transcript changed" notification means for a printed log
#[derive(Debug, PartialEq, Eq)]
pub enum TranscriptChange<'a> {
    /// Turns after the ones already printed
    Appended(&'a [Turn]),
    /// The transcript was reset; carries whatever it holds now
    Cleared(&'a [Turn]),
    Unchanged,
}

/// Remembers how much of the transcript has been printed
#[derive(Debug, Default)]
pub struct TranscriptView {
    printed: usize,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply<'a>(&mut self, turns: &'a [Turn]) -> TranscriptChange<'a> {
        if turns.len() < self.printed {
            self.printed = turns.len();
            return TranscriptChange::Cleared(turns);
        }
        let fresh = turns.get(self.printed..).unwrap_or_default();
        self.printed = turns.len();
        if fresh.is_empty() {
            TranscriptChange::Unchanged
        } else {
            TranscriptChange::Appended(fresh)
        }
    }
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Model => "Gemini",
    }
}

/// Body text of a turn as it should appear on the terminal.
/// The user's own words are shown literally.
pub fn turn_body(turn: &Turn) -> String {
    match turn.role {
        Role::User => turn.content.clone(),
        Role::Model => render_markdown(&turn.content),
    }
}
