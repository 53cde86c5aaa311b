//! Line-oriented terminal front end
//!
//! Reads questions from stdin and prints the transcript as the session
//! announces changes.

mod render;
mod view;

use crate::llm::{Role, Turn};
use crate::runtime::{SessionHandle, SessionUpdate};
use crate::state_machine::{SessionState, SessionStatus};
use crossterm::style::Stylize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use view::{role_label, turn_body, TranscriptChange, TranscriptView};

const HELP: &str = "\
Ask anything and press Enter.
  /suggest   put an example question in the draft (Enter sends it)
  /reset     clear the conversation (also /clear)
  /help      show this help
  /quit      leave";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the draft with this text and submit it
    Ask(String),
    /// Submit whatever is in the draft
    SendDraft,
    Suggest,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::SendDraft;
    }
    match trimmed {
        "/suggest" => Command::Suggest,
        "/reset" | "/clear" => Command::Reset,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other if other.starts_with('/') && !other.contains(char::is_whitespace) => {
            Command::Unknown(other.to_string())
        }
        // Sent as typed; the session does its own trimming
        _ => Command::Ask(line.to_string()),
    }
}

/// Run the console until `/quit` or end of input
pub async fn run(handle: SessionHandle) -> Result<(), Box<dyn std::error::Error>> {
    let printer = tokio::spawn(print_updates(handle.subscribe()));

    println!("{}", "What would you like to know?".bold());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Command::Ask(text) => {
                if let Some(hint) = blocked_hint(&handle.snapshot()) {
                    println!("{}", hint.dim());
                    continue;
                }
                let state = stage_draft(&handle, text).await?;
                if state.can_submit() {
                    handle.submit().await?;
                } else if let Some(hint) = blocked_hint(&state) {
                    println!("{}", hint.dim());
                }
            }
            // A blank draft still goes through so the session can reject it
            Command::SendDraft => match blocked_hint(&handle.snapshot()) {
                Some(hint) => println!("{}", hint.dim()),
                None => handle.submit().await?,
            },
            Command::Suggest => {
                if handle.snapshot().status.is_pending() {
                    continue;
                }
                let question = handle.suggest().await?;
                println!(
                    "{} {question} {}",
                    "Suggested:".bold(),
                    "(press Enter to ask it)".dim()
                );
            }
            Command::Reset => {
                handle.reset().await?;
                tracing::debug!("Reset requested from console");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(cmd) => {
                println!("Unknown command {cmd}. Type /help for the list.");
            }
        }
    }

    printer.abort();
    Ok(())
}

/// Why nothing can be sent right now, if that is the case
fn blocked_hint(state: &SessionState) -> Option<&'static str> {
    match state.status {
        SessionStatus::Idle => None,
        SessionStatus::Pending { .. } => Some("Still thinking about the last question..."),
        SessionStatus::Error { .. } => Some("Type /reset to start over."),
    }
}

/// Put `text` in the draft and return the state once the session has taken it
async fn stage_draft(
    handle: &SessionHandle,
    text: String,
) -> Result<SessionState, Box<dyn std::error::Error>> {
    let mut states = handle.watch();
    handle.set_draft(text.clone()).await?;
    let state = states
        .wait_for(|s| s.draft == text || !s.status.is_idle())
        .await?
        .clone();
    Ok(state)
}

async fn print_updates(mut updates: broadcast::Receiver<SessionUpdate>) {
    let mut view = TranscriptView::new();

    loop {
        let update = match updates.recv().await {
            Ok(update) => update,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Console fell behind session updates");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match update {
            SessionUpdate::TranscriptChanged { turns } => match view.apply(&turns) {
                TranscriptChange::Appended(fresh) => fresh.iter().for_each(print_turn),
                TranscriptChange::Cleared(rest) => {
                    println!("{}", "Conversation cleared.".dim());
                    rest.iter().for_each(print_turn);
                }
                TranscriptChange::Unchanged => {}
            },
            SessionUpdate::StatusChanged { status } => {
                if status.is_pending() {
                    println!("{} {}", "Gemini:".bold().green(), "Typing...".dim());
                } else if let Some(message) = status.error_message() {
                    println!(
                        "{} {}",
                        message.red(),
                        "(type /reset to start over)".dim()
                    );
                }
            }
            SessionUpdate::NoticeChanged {
                notice: Some(message),
            }
            | SessionUpdate::Rejected { message } => {
                println!("{}", message.yellow());
            }
            SessionUpdate::NoticeChanged { notice: None } => {}
            SessionUpdate::DraftChanged { draft } => {
                tracing::trace!(draft_len = draft.len(), "Draft updated");
            }
        }
    }
}

fn print_turn(turn: &Turn) {
    let label = format!("{}:", role_label(turn.role));
    let label = match turn.role {
        Role::User => label.bold().cyan(),
        Role::Model => label.bold().green(),
    };
    println!("{label}\n{}\n", turn_body(turn));
}
