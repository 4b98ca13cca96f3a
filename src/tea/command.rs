//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

use crate::gate::{Decision, Responder};

/// Output commands from the update function.
#[derive(Debug)]
pub enum Command {
    /// Spawn the workflow thread for a new run.
    StartRun,

    /// Answer the pending install prompt, unblocking the workflow thread.
    Respond {
        responder: Responder,
        decision: Decision,
    },

    // Desktop integrations
    CopyToClipboard(String),
    OpenUrl(String),

    /// Run the configured clear-cache command in the background.
    ClearCache,

    // App lifecycle
    Quit,
}
