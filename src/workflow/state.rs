//! Step board with transition validation.
//!
//! `StepBoard` owns the ordered step rows of one run and enforces the
//! sequential ordering: a step may only start once every step before it is
//! complete, and only a running step may finish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{Step, StepStatus};

/// A record of one status change with timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub index: usize,
    pub status: StepStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StepBoard {
    steps: Vec<Step>,
    history: Vec<TransitionEntry>,
}

impl StepBoard {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: labels.into_iter().map(Step::new).collect(),
            history: Vec::new(),
        }
    }

    /// Check whether step `index` may move to `target`.
    ///
    /// - Pending -> Running, only if every earlier step is complete
    /// - Running -> Done | Warning | Error
    pub fn can_transition(&self, index: usize, target: StepStatus) -> bool {
        let Some(step) = self.steps.get(index) else {
            return false;
        };
        match (step.status, target) {
            (StepStatus::Pending, StepStatus::Running) => {
                self.steps[..index].iter().all(|s| s.status.is_complete())
            }
            (StepStatus::Running, StepStatus::Done)
            | (StepStatus::Running, StepStatus::Warning)
            | (StepStatus::Running, StepStatus::Error) => true,
            _ => false,
        }
    }

    pub fn transition(&mut self, index: usize, target: StepStatus) -> Result<()> {
        let len = self.steps.len();
        let current = self
            .steps
            .get(index)
            .map(|s| s.status)
            .ok_or(Error::StepOutOfRange { index, len })?;

        if !self.can_transition(index, target) {
            return Err(Error::InvalidStepTransition {
                index,
                from: current,
                to: target,
            });
        }

        self.steps[index].status = target;
        self.history.push(TransitionEntry {
            index,
            status: target,
            at: Utc::now(),
        });
        Ok(())
    }

    pub fn start(&mut self, index: usize) -> Result<()> {
        self.transition(index, StepStatus::Running)
    }

    pub fn set_detail(&mut self, index: usize, detail: impl Into<String>) -> Result<()> {
        let len = self.steps.len();
        let step = self
            .steps
            .get_mut(index)
            .ok_or(Error::StepOutOfRange { index, len })?;
        step.detail = Some(detail.into());
        Ok(())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(|s| s.status).collect()
    }

    /// Every status change, in order.
    pub fn history(&self) -> &[TransitionEntry] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
