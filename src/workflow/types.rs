//! Core workflow type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one run of the bootstrap workflow.
///
/// Runs are never persisted; the id only ties log lines and the headless
/// summary to the run that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a single step.
///
/// `Warning` is the advisory outcome: the step finished but something was off
/// (only the repository check produces it). It counts as complete for the
/// purpose of starting the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Done,
    Warning,
    Error,
}

impl StepStatus {
    /// Whether the next step may start after this one.
    pub fn is_complete(&self) -> bool {
        matches!(self, StepStatus::Done | StepStatus::Warning)
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            StepStatus::Done | StepStatus::Warning | StepStatus::Error
        )
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Running => write!(f, "running"),
            StepStatus::Done => write!(f, "done"),
            StepStatus::Warning => write!(f, "warning"),
            StepStatus::Error => write!(f, "error"),
        }
    }
}

/// Detail of a tool step whose tool was not found.
pub const MISSING_DETAIL: &str = "missing";

/// One row of the splash screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub label: String,
    pub status: StepStatus,
    /// Short suffix such as "missing" or "unreachable".
    pub detail: Option<String>,
}

impl Step {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: StepStatus::Pending,
            detail: None,
        }
    }

    /// Running but parked on the missing-tool install offer. Nothing is in
    /// flight, so no spinner.
    pub fn is_awaiting_install(&self) -> bool {
        self.status == StepStatus::Running && self.detail.as_deref() == Some(MISSING_DETAIL)
    }

    /// Text shown next to the status icon, e.g. "1. Check uv ... missing - ✗ ERROR".
    pub fn display_text(&self) -> String {
        let mut text = match &self.detail {
            Some(detail) => format!("{} ... {}", self.label, detail),
            None => format!("{} ...", self.label),
        };
        match self.status {
            StepStatus::Done => text.push_str(" - ✓ OK"),
            StepStatus::Error => text.push_str(" - ✗ ERROR"),
            _ => {}
        }
        text
    }
}

/// Which pre-configured launch invocation was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchVariant {
    /// Repository reachable: refresh from the remote before starting.
    Fresh,
    /// Repository unreachable: start whatever is already cached locally.
    Fallback,
}

impl std::fmt::Display for LaunchVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchVariant::Fresh => write!(f, "fresh"),
            LaunchVariant::Fallback => write!(f, "fallback"),
        }
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WorkflowResult {
    Launched { variant: LaunchVariant },
    Aborted { step: usize },
}

impl WorkflowResult {
    pub fn is_launched(&self) -> bool {
        matches!(self, WorkflowResult::Launched { .. })
    }
}

/// Severity of the free-text note under the step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteLevel {
    /// Something is in progress (installing, updating).
    Progress,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub level: NoteLevel,
    pub message: String,
}

impl Note {
    pub fn new(level: NoteLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Snapshot pushed to the presentation layer after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub run_id: RunId,
    pub steps: Vec<Step>,
    pub note: Option<Note>,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub result: WorkflowResult,
    pub steps: Vec<Step>,
    /// Advisory messages surfaced during the run.
    pub warnings: Vec<String>,
    pub note: Option<Note>,
}

impl RunReport {
    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(|s| s.status).collect()
    }
}
