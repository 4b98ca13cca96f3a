use crate::tea::{Notification, Phase};
use crate::workflow::{Note, Step, StepStatus};
use std::sync::atomic::{AtomicU64, Ordering};

/// What the install dialog shows. The responder stays with the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub name: String,
    pub description: String,
    pub command: String,
    /// Whether 'o' can open a homepage for this tool.
    pub has_homepage: bool,
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub version: u64,
    pub app_name: String,
    /// Contact line, "name <email>".
    pub contact: String,
    pub phase: Phase,
    pub steps: Vec<Step>,
    pub note: Option<Note>,
    pub dialog: Option<DialogView>,
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
    pub can_start: bool,
    pub can_clear_cache: bool,
}

impl RenderState {
    /// Whether a spinner is on screen and frames must keep coming.
    pub fn is_animating(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.status == StepStatus::Running && !s.is_awaiting_install())
    }
}
