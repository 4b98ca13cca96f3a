//! The bootstrap-and-launch workflow.
//!
//! Steps run strictly in order on the calling thread:
//!
//! 1. one `--version` check per required tool, with an install offer through the
//!    [`InstallGate`] when a tool is missing (fatal if it stays missing)
//! 2. repository reachability (advisory, only picks the launch variant)
//! 3. launch of the target app (fire-and-forget)
//!
//! Every transition is pushed to the [`Observer`] as a full [`Progress`]
//! snapshot.

use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::config::LauncherConfig;
use crate::gate::InstallGate;
use crate::shell::{succeeds, Shell};
use crate::tool::ToolSpec;
use crate::{splog, splog_debug, splog_error, splog_warn, Result};

use super::state::StepBoard;
use super::{
    LaunchVariant, Note, NoteLevel, Progress, RunId, RunReport, StepStatus, WorkflowResult,
    MISSING_DETAIL,
};

/// How many characters of failing command output end up in a note.
const NOTE_EXCERPT_LEN: usize = 50;

/// Receives a snapshot after every state change of a run.
pub trait Observer: Send + Sync {
    fn on_progress(&self, progress: Progress);
}

impl<M> Observer for Sender<M>
where
    M: From<Progress> + Send,
{
    fn on_progress(&self, progress: Progress) {
        // A closed UI only means nobody is watching anymore
        let _ = self.send(M::from(progress));
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_progress(&self, _progress: Progress) {}
}

/// Mutable state of one run, owned by `Bootstrap::run`.
struct RunState {
    run_id: RunId,
    board: StepBoard,
    note: Option<Note>,
    warnings: Vec<String>,
}

impl RunState {
    fn snapshot(&self) -> Progress {
        Progress {
            run_id: self.run_id,
            steps: self.board.steps().to_vec(),
            note: self.note.clone(),
        }
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        splog_warn!("[{}] {}", self.run_id.short(), message);
        self.warnings.push(message.clone());
        self.note = Some(Note::new(NoteLevel::Warning, message));
    }

    fn into_report(self, result: WorkflowResult) -> RunReport {
        RunReport {
            run_id: self.run_id,
            result,
            steps: self.board.steps().to_vec(),
            warnings: self.warnings,
            note: self.note,
        }
    }
}

pub struct Bootstrap {
    config: LauncherConfig,
    shell: Arc<dyn Shell>,
    gate: Arc<dyn InstallGate>,
    observer: Arc<dyn Observer>,
}

impl Bootstrap {
    pub fn new(
        config: LauncherConfig,
        shell: Arc<dyn Shell>,
        gate: Arc<dyn InstallGate>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            config,
            shell,
            gate,
            observer,
        }
    }

    /// Run every step to completion or to the first fatal error.
    ///
    /// Workflow failures are reported in the returned [`RunReport`]; `Err` is
    /// reserved for broken invariants of the step board itself.
    pub fn run(&self) -> Result<RunReport> {
        let mut run = RunState {
            run_id: RunId::new(),
            board: StepBoard::new(self.config.step_labels()),
            note: None,
            warnings: Vec::new(),
        };
        splog!(
            "[{}] Bootstrap run started for '{}'",
            run.run_id.short(),
            self.config.app_name
        );
        self.publish(&run);

        for (index, tool) in self.config.tools.iter().enumerate() {
            if !self.ensure_tool(&mut run, index, tool)? {
                splog_error!(
                    "[{}] Aborted at step {} ('{}' unavailable)",
                    run.run_id.short(),
                    index,
                    tool.id
                );
                return Ok(run.into_report(WorkflowResult::Aborted { step: index }));
            }
        }

        let variant = if self.check_repository(&mut run)? {
            LaunchVariant::Fresh
        } else {
            LaunchVariant::Fallback
        };

        let result = self.launch(&mut run, variant)?;
        splog!("[{}] Bootstrap run finished: {:?}", run.run_id.short(), result);
        Ok(run.into_report(result))
    }

    fn publish(&self, run: &RunState) {
        self.observer.on_progress(run.snapshot());
    }

    fn check_tool(&self, tool: &ToolSpec) -> bool {
        let present = succeeds(self.shell.as_ref(), &tool.version_command());
        splog_debug!("Check '{}': present={}", tool.id, present);
        present
    }

    /// Make sure `tool` is present, offering an install once.
    ///
    /// Returns `false` when the step ended in `Error`.
    fn ensure_tool(&self, run: &mut RunState, index: usize, tool: &ToolSpec) -> Result<bool> {
        run.board.start(index)?;
        self.publish(run);

        if self.check_tool(tool) {
            run.board.transition(index, StepStatus::Done)?;
            self.publish(run);
            return Ok(true);
        }

        splog_warn!("[{}] '{}' is missing", run.run_id.short(), tool.id);
        run.board.set_detail(index, MISSING_DETAIL)?;
        self.publish(run);

        let installed = match self.gate.request_install(tool, self.shell.as_ref()) {
            Some(command) => {
                self.install(run, tool, &command);
                self.check_tool(tool)
            }
            None => false,
        };

        let status = if installed {
            StepStatus::Done
        } else {
            StepStatus::Error
        };
        run.board.transition(index, status)?;
        if !installed {
            run.note = Some(Note::new(
                NoteLevel::Error,
                format!(
                    "{} is required. Restart the launcher after installing it.",
                    tool.name
                ),
            ));
        }
        self.publish(run);
        Ok(installed)
    }

    /// Execute an approved install command once. Its exit status is not
    /// trusted; the caller checks the tool again.
    fn install(&self, run: &mut RunState, tool: &ToolSpec, command: &str) {
        splog!("[{}] Installing '{}': {}", run.run_id.short(), tool.id, command);
        run.note = Some(Note::new(
            NoteLevel::Progress,
            format!("Installing {}...", tool.name),
        ));
        self.publish(run);

        match self.shell.run(command) {
            Ok(out) => splog_debug!("Install of '{}' exited success={}", tool.id, out.success),
            Err(e) => splog_warn!("Install of '{}' could not run: {}", tool.id, e),
        }

        run.note = Some(Note::new(
            NoteLevel::Success,
            format!("{} installation completed.", tool.name),
        ));
        self.publish(run);
    }

    /// Ask the remote for its refs. Never fatal.
    fn check_repository(&self, run: &mut RunState) -> Result<bool> {
        let index = self.config.repository_step();
        run.board.start(index)?;
        self.publish(run);

        let reachable = succeeds(self.shell.as_ref(), &self.config.repo_check_command());
        splog!(
            "[{}] Repository {} reachable={}",
            run.run_id.short(),
            self.config.repo_url,
            reachable
        );

        if reachable {
            run.board.transition(index, StepStatus::Done)?;
        } else {
            run.board.set_detail(index, "unreachable")?;
            run.board.transition(index, StepStatus::Warning)?;
            run.warn("No repository access - running cached version");
        }
        self.publish(run);
        Ok(reachable)
    }

    fn launch(&self, run: &mut RunState, variant: LaunchVariant) -> Result<WorkflowResult> {
        let index = self.config.launch_step();
        let launch = &self.config.launch;
        run.board.start(index)?;
        self.publish(run);

        let command = match variant {
            LaunchVariant::Fresh => {
                if let Some(update) = &launch.update_command {
                    self.update_before_launch(run, update);
                }
                &launch.fresh_command
            }
            LaunchVariant::Fallback => {
                run.board.set_detail(index, "trying cached version")?;
                self.publish(run);
                &launch.fallback_command
            }
        };

        splog!(
            "[{}] Launching ({}) console={}: {}",
            run.run_id.short(),
            variant,
            launch.show_console,
            command
        );
        if let Err(e) = self.shell.spawn_detached(command, launch.show_console) {
            splog_error!("[{}] Launch failed to spawn: {}", run.run_id.short(), e);
            run.board.transition(index, StepStatus::Error)?;
            run.note = Some(Note::new(
                NoteLevel::Error,
                format!(
                    "Could not start the app ({e}). Please contact: {}",
                    self.config.contact
                ),
            ));
            self.publish(run);
            return Ok(WorkflowResult::Aborted { step: index });
        }

        if variant == LaunchVariant::Fallback {
            run.board.set_detail(index, "using cached version")?;
            run.warn(format!(
                "If the app didn't start, please contact: {}",
                self.config.contact
            ));
        }
        run.board.transition(index, StepStatus::Done)?;

        if run.warnings.is_empty() {
            let message = if launch.show_console {
                "App launched in terminal window. You can close this launcher."
            } else {
                "App launched successfully. You can close this launcher."
            };
            run.note = Some(Note::new(NoteLevel::Success, message));
        }
        self.publish(run);
        Ok(WorkflowResult::Launched { variant })
    }

    /// Install or update the app before a fresh launch. Failure is advisory.
    fn update_before_launch(&self, run: &mut RunState, command: &str) {
        run.note = Some(Note::new(
            NoteLevel::Progress,
            "Installing/updating from repository...",
        ));
        self.publish(run);

        match self.shell.run(command) {
            Ok(out) if out.success => {
                run.note = Some(Note::new(
                    NoteLevel::Success,
                    "Install/update completed successfully!",
                ));
            }
            Ok(out) => {
                run.warn(format!(
                    "Install/update had issues: {}...",
                    out.excerpt(NOTE_EXCERPT_LEN)
                ));
            }
            Err(e) => {
                let excerpt: String = e.to_string().chars().take(NOTE_EXCERPT_LEN).collect();
                run.warn(format!("Install/update had issues: {excerpt}..."));
            }
        }
        self.publish(run);
    }
}
