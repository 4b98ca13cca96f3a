//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - A scripted shell that simulates version checks, installs and launches
//! - An observer that records every progress snapshot
//! - A gate that answers install prompts from a script

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use splash::config::LauncherConfig;
use splash::gate::{Decision, InstallGate};
use splash::shell::{CommandOutput, Shell};
use splash::tool::{Environment, ToolSpec};
use splash::workflow::{Bootstrap, Observer, Progress, RunReport, StepStatus};
use splash::{Error, Result};

/// Shell whose world is a set of installed tools and a reachability flag.
///
/// - `<id> --version` succeeds when `id` is installed
/// - `git ls-remote ...` succeeds when git is installed and the repo is reachable
/// - a registered install command installs its tool (or not, see `broken_installs`)
/// - anything else succeeds, unless listed in `failing`
#[derive(Default)]
pub struct FakeShell {
    installed: Mutex<HashSet<String>>,
    install_targets: Mutex<HashMap<String, String>>,
    broken_installs: HashSet<String>,
    unspawnable: HashSet<String>,
    failing: HashSet<String>,
    repo_reachable: bool,
    launch_fails: bool,
    calls: Mutex<Vec<String>>,
    launches: Mutex<Vec<(String, bool)>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self {
            repo_reachable: true,
            ..Default::default()
        }
    }

    pub fn with_tools(self, ids: &[&str]) -> Self {
        self.installed
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn repo_unreachable(mut self) -> Self {
        self.repo_reachable = false;
        self
    }

    /// Running `tool`'s install command installs it.
    pub fn installable(self, tool: &ToolSpec) -> Self {
        let command = tool.install_command(&self);
        self.install_targets
            .lock()
            .unwrap()
            .insert(command, tool.id.clone());
        self
    }

    /// `tool`'s install command runs but leaves the tool missing.
    pub fn install_has_no_effect(mut self, tool: &ToolSpec) -> Self {
        self.broken_installs.insert(tool.id.clone());
        self.installable(tool)
    }

    /// `command` cannot even be started.
    pub fn unspawnable(mut self, command: &str) -> Self {
        self.unspawnable.insert(command.to_string());
        self
    }

    /// `command` runs and exits non-zero.
    pub fn failing(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    pub fn launch_fails(mut self) -> Self {
        self.launch_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn launches(&self) -> Vec<(String, bool)> {
        self.launches.lock().unwrap().clone()
    }

    /// Commands that were run for `tool`'s install.
    pub fn install_runs(&self, tool: &ToolSpec) -> usize {
        let command = tool.install_command(self);
        self.calls().iter().filter(|c| **c == command).count()
    }
}

impl Environment for FakeShell {
    fn has_program(&self, _program: &str) -> bool {
        false
    }
}

impl Shell for FakeShell {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.to_string());

        if self.unspawnable.contains(command) {
            return Err(Error::Platform(format!("cannot spawn '{command}'")));
        }
        if self.failing.contains(command) {
            return Ok(CommandOutput {
                success: false,
                output: format!("error: {command} failed with a long diagnostic message"),
            });
        }

        let mut installed = self.installed.lock().unwrap();
        let success = if let Some(id) = command.strip_suffix(" --version") {
            installed.contains(id)
        } else if command.starts_with("git ls-remote ") {
            installed.contains("git") && self.repo_reachable
        } else if let Some(id) = self.install_targets.lock().unwrap().get(command) {
            if !self.broken_installs.contains(id) {
                installed.insert(id.clone());
            }
            true
        } else {
            true
        };

        Ok(CommandOutput {
            success,
            output: String::new(),
        })
    }

    fn spawn_detached(&self, command: &str, console: bool) -> Result<()> {
        if self.launch_fails {
            return Err(Error::Platform("no terminal".to_string()));
        }
        self.launches
            .lock()
            .unwrap()
            .push((command.to_string(), console));
        Ok(())
    }
}

/// Records every snapshot in order.
#[derive(Default)]
pub struct RecordingObserver {
    snapshots: Mutex<Vec<Progress>>,
}

impl RecordingObserver {
    pub fn snapshots(&self) -> Vec<Progress> {
        self.snapshots.lock().unwrap().clone()
    }

    /// Panics if any snapshot shows a step running or finished while an
    /// earlier step is not complete.
    pub fn assert_sequential(&self) {
        for (n, snapshot) in self.snapshots().iter().enumerate() {
            for (i, step) in snapshot.steps.iter().enumerate() {
                if step.status == StepStatus::Pending {
                    continue;
                }
                for earlier in &snapshot.steps[..i] {
                    assert!(
                        earlier.status.is_complete(),
                        "snapshot {n}: step {i} is {} while '{}' is {}",
                        step.status,
                        earlier.label,
                        earlier.status
                    );
                }
            }
        }
    }
}

impl Observer for RecordingObserver {
    fn on_progress(&self, progress: Progress) {
        self.snapshots.lock().unwrap().push(progress);
    }
}

/// Answers prompts from a queue; an empty queue declines.
#[derive(Default)]
pub struct ScriptedGate {
    answers: Mutex<VecDeque<Decision>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedGate {
    pub fn answering(answers: &[Decision]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Tool ids the gate was asked about, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl InstallGate for ScriptedGate {
    fn request_install(&self, tool: &ToolSpec, env: &dyn Environment) -> Option<String> {
        self.asked.lock().unwrap().push(tool.id.clone());
        match self.answers.lock().unwrap().pop_front() {
            Some(Decision::Install) => Some(tool.install_command(env)),
            _ => None,
        }
    }
}

/// Everything a test needs to run and inspect one workflow.
pub struct Harness {
    pub config: LauncherConfig,
    pub shell: Arc<FakeShell>,
    pub gate: Arc<ScriptedGate>,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new(shell: FakeShell, gate: ScriptedGate) -> Self {
        Self::with_config(LauncherConfig::default(), shell, gate)
    }

    pub fn with_config(config: LauncherConfig, shell: FakeShell, gate: ScriptedGate) -> Self {
        Self {
            config,
            shell: Arc::new(shell),
            gate: Arc::new(gate),
            observer: Arc::new(RecordingObserver::default()),
        }
    }

    pub fn run(&self) -> RunReport {
        Bootstrap::new(
            self.config.clone(),
            self.shell.clone(),
            self.gate.clone(),
            self.observer.clone(),
        )
        .run()
        .expect("step board invariants hold")
    }
}
