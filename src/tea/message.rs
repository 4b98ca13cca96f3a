//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from the keyboard,
//! the workflow thread, or background command completions.

use crossterm::event::KeyEvent;

use crate::gate::InstallPrompt;
use crate::workflow::{Progress, RunReport};

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    // From the workflow thread
    Progress(Progress),
    /// A tool is missing; the workflow thread waits for the answer.
    InstallPrompt(InstallPrompt),
    /// The run ended. `Err` carries an internal failure, not a workflow outcome.
    RunFinished(Result<RunReport, String>),

    // Command completion callbacks
    CacheCleared { success: bool, detail: String },

    /// Periodic wake-up, drives the delayed close.
    Tick,
}

impl From<Progress> for Message {
    fn from(progress: Progress) -> Self {
        Message::Progress(progress)
    }
}

impl From<InstallPrompt> for Message {
    fn from(prompt: InstallPrompt) -> Self {
        Message::InstallPrompt(prompt)
    }
}
