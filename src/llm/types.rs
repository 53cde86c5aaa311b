//! Conversation turns and the backend wire format

use serde::Serialize;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One message in the conversation
///
/// On the wire a turn is `{ "role": "user"|"model", "parts": [{ "text": ... }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "WireTurn")]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireTurn {
    role: Role,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

impl From<Turn> for WireTurn {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role,
            parts: vec![Part { text: turn.content }],
        }
    }
}

/// Body of the outbound call
///
/// `history` already ends with the new user turn; `message` repeats its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub history: Vec<Turn>,
    pub message: String,
}

impl ChatRequest {
    pub fn new(history: Vec<Turn>, message: impl Into<String>) -> Self {
        Self {
            history,
            message: message.into(),
        }
    }
}
