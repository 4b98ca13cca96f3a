use thiserror::Error;

use crate::workflow::StepStatus;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid step transition for step {index} from {from} to {to}")]
    InvalidStepTransition {
        index: usize,
        from: StepStatus,
        to: StepStatus,
    },

    #[error("Step {index} out of range (steps: {len})")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, Error>;
