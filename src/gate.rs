//! Install confirmation gate.
//!
//! When a required tool is missing the workflow thread stops here until the
//! user decides. The decision travels back over a `tokio::sync::oneshot`
//! channel: the presentation layer gets an [`InstallPrompt`] holding the
//! sending half, the workflow thread blocks on the receiving half.
//!
//! Dropping a prompt without answering it (dialog closed, UI gone) resolves
//! the gate as a decline.

use crossbeam_channel::Sender;
use tokio::sync::oneshot;

use crate::tool::{Environment, ToolSpec};
use crate::{splog, splog_debug, splog_warn};

/// The user's answer to an install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Install,
    Decline,
}

/// Blocking user-decision point for a missing tool.
pub trait InstallGate: Send + Sync {
    /// Ask whether `tool` should be installed.
    ///
    /// Returns the install command to execute, resolved against `env` at call
    /// time, or `None` if the user declined.
    fn request_install(&self, tool: &ToolSpec, env: &dyn Environment) -> Option<String>;
}

/// Answering half of a pending prompt.
pub struct Responder {
    tx: oneshot::Sender<Decision>,
}

impl Responder {
    pub fn respond(self, decision: Decision) {
        // Receiver gone means the workflow thread no longer waits; nothing to do
        let _ = self.tx.send(decision);
    }

    pub fn approve(self) {
        self.respond(Decision::Install);
    }

    pub fn decline(self) {
        self.respond(Decision::Decline);
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Everything the dialog shows, plus the way to answer it.
#[derive(Debug)]
pub struct InstallPrompt {
    pub tool_id: String,
    pub name: String,
    pub description: String,
    pub homepage: Option<String>,
    pub command: String,
    pub responder: Responder,
}

impl InstallPrompt {
    /// Build a prompt for `tool` and the receiver the caller should wait on.
    pub fn new(tool: &ToolSpec, command: String) -> (Self, oneshot::Receiver<Decision>) {
        let (tx, rx) = oneshot::channel();
        let prompt = Self {
            tool_id: tool.id.clone(),
            name: tool.name.clone(),
            description: tool.description.clone(),
            homepage: tool.homepage.clone(),
            command,
            responder: Responder { tx },
        };
        (prompt, rx)
    }
}

/// Block until the prompt is answered; an abandoned prompt is a decline.
fn wait(rx: oneshot::Receiver<Decision>) -> Decision {
    rx.blocking_recv().unwrap_or(Decision::Decline)
}

/// Gate that forwards prompts to the UI thread over a channel.
///
/// Any message type that can be built from an [`InstallPrompt`] works, so the
/// UI can multiplex prompts with its other inputs.
pub struct ChannelGate<M> {
    tx: Sender<M>,
}

impl<M> ChannelGate<M> {
    pub fn new(tx: Sender<M>) -> Self {
        Self { tx }
    }
}

impl<M> InstallGate for ChannelGate<M>
where
    M: From<InstallPrompt> + Send,
{
    fn request_install(&self, tool: &ToolSpec, env: &dyn Environment) -> Option<String> {
        let command = tool.install_command(env);
        splog_debug!("Install prompt for '{}': {}", tool.id, command);

        let (prompt, rx) = InstallPrompt::new(tool, command.clone());
        if self.tx.send(M::from(prompt)).is_err() {
            splog_warn!("Install prompt for '{}' not delivered, UI is gone", tool.id);
            return None;
        }

        match wait(rx) {
            Decision::Install => {
                splog!("User approved install of '{}'", tool.id);
                Some(command)
            }
            Decision::Decline => {
                splog!("User declined install of '{}'", tool.id);
                None
            }
        }
    }
}

/// Gate that approves every prompt without asking (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApproveGate;

impl InstallGate for AutoApproveGate {
    fn request_install(&self, tool: &ToolSpec, env: &dyn Environment) -> Option<String> {
        let command = tool.install_command(env);
        splog!("Auto-approving install of '{}': {}", tool.id, command);
        Some(command)
    }
}
