//! Bootstrap workflow: step model, ordering rules and the runner.

pub mod runner;
pub mod state;
pub mod types;

pub use runner::{Bootstrap, NullObserver, Observer};
pub use state::{StepBoard, TransitionEntry};
pub use types::{
    LaunchVariant, Note, NoteLevel, Progress, RunId, RunReport, Step, StepStatus, WorkflowResult,
    MISSING_DETAIL,
};
