//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no threads. The one
//! exception is the pending install prompt, which owns the responder the
//! workflow thread is waiting on.

use std::time::Instant;

use crate::config::{Contact, LauncherConfig};
use crate::gate::InstallPrompt;
use crate::render::{next_version, DialogView, RenderState};
use crate::workflow::{Note, Step, WorkflowResult};

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Displayed in red with "Error:" prefix
    Error,
    /// Displayed in green
    Info,
}

/// A transient message on the bottom line, cleared by the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Where the splash is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the user to start a run.
    #[default]
    Idle,
    Running,
    Finished(WorkflowResult),
    /// The run stopped on an internal error.
    Failed,
}

impl Phase {
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Running)
    }
}

pub struct Model {
    // Immutable after init
    pub app_name: String,
    pub contact: Contact,
    pub step_labels: Vec<String>,
    pub close_on_success: bool,
    pub can_clear_cache: bool,

    // Workflow state (mirrored from the workflow thread)
    pub phase: Phase,
    pub steps: Vec<Step>,
    pub note: Option<Note>,
    pub prompt: Option<InstallPrompt>,

    // UI state
    pub notification: Option<Notification>,
    pub clearing_cache: bool,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
    /// When set, the app quits once this instant has passed.
    pub close_at: Option<Instant>,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,
}

impl Model {
    pub fn new(config: &LauncherConfig) -> Self {
        let step_labels = config.step_labels();
        Self {
            app_name: config.app_name.clone(),
            contact: config.contact.clone(),
            steps: step_labels.iter().map(Step::new).collect(),
            step_labels,
            close_on_success: config.close_on_success,
            can_clear_cache: config.launch.clear_cache_command.is_some(),
            phase: Phase::Idle,
            note: None,
            prompt: None,
            notification: None,
            clearing_cache: false,
            show_keymap: false,
            close_at: None,
            dirty: true,
        }
    }

    /// Put every step back to pending for a new run.
    pub fn reset_steps(&mut self) {
        self.steps = self.step_labels.iter().map(Step::new).collect();
        self.note = None;
    }

    /// A new run may start: nothing running, no dialog, no cache action.
    pub fn can_start(&self) -> bool {
        !self.phase.is_running() && self.prompt.is_none() && !self.clearing_cache
    }

    pub fn can_clear_cache_now(&self) -> bool {
        self.can_clear_cache && self.can_start()
    }

    /// Create an immutable snapshot for the render thread.
    pub fn snapshot(&self) -> RenderState {
        RenderState {
            version: next_version(),
            app_name: self.app_name.clone(),
            contact: self.contact.to_string(),
            phase: self.phase,
            steps: self.steps.clone(),
            note: self.note.clone(),
            dialog: self.prompt.as_ref().map(|p| DialogView {
                name: p.name.clone(),
                description: p.description.clone(),
                command: p.command.clone(),
                has_homepage: p.homepage.is_some(),
            }),
            notification: self.notification.clone(),
            show_keymap: self.show_keymap,
            can_start: self.can_start(),
            can_clear_cache: self.can_clear_cache_now(),
        }
    }
}
