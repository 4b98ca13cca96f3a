//! End-to-end workflow integration tests.
//!
//! Each test builds a scripted machine, runs the whole workflow, and checks
//! the step statuses, the chosen launch and the commands that were run.

use splash::gate::Decision;
use splash::tool::ToolSpec;
use splash::workflow::StepStatus::{Done, Error, Pending, Warning};
use splash::workflow::{LaunchVariant, StepStatus, WorkflowResult};

use crate::fixtures::{FakeShell, Harness, ScriptedGate};

/// Given uv and git installed and the repository reachable
/// When the workflow runs
/// Then every step is done and the fresh command is launched
#[test]
fn test_all_present_launches_fresh() {
    let harness = Harness::new(
        FakeShell::new().with_tools(&["uv", "git"]),
        ScriptedGate::default(),
    );

    let report = harness.run();

    assert_eq!(report.statuses(), [Done, Done, Done, Done]);
    assert_eq!(
        report.result,
        WorkflowResult::Launched {
            variant: LaunchVariant::Fresh
        }
    );
    assert!(report.warnings.is_empty());
    assert!(harness.gate.asked().is_empty());
    // The default fresh path installs the app from the repository first
    assert_eq!(
        harness.shell.calls().last(),
        harness.config.launch.update_command.as_ref()
    );
    assert_eq!(
        harness.shell.launches(),
        [(harness.config.launch.fresh_command.clone(), true)]
    );
    assert_eq!(
        report.note.map(|n| n.message),
        Some("App launched in terminal window. You can close this launcher.".to_string())
    );
    harness.observer.assert_sequential();
}

/// Given uv missing but installable, git present, repository unreachable
/// When the user approves the install
/// Then uv is installed, the repository step warns and the cached app starts
#[test]
fn test_install_then_fallback_launch() {
    let uv = ToolSpec::uv();
    let harness = Harness::new(
        FakeShell::new()
            .with_tools(&["git"])
            .installable(&uv)
            .repo_unreachable(),
        ScriptedGate::answering(&[Decision::Install]),
    );

    let report = harness.run();

    assert_eq!(report.statuses(), [Done, Done, Warning, Done]);
    assert_eq!(
        report.result,
        WorkflowResult::Launched {
            variant: LaunchVariant::Fallback
        }
    );
    assert_eq!(harness.gate.asked(), ["uv"]);
    assert_eq!(harness.shell.install_runs(&uv), 1);
    assert_eq!(
        report.warnings[0],
        "No repository access - running cached version"
    );
    assert!(report.warnings[1].starts_with("If the app didn't start, please contact: "));
    assert_eq!(report.steps[2].detail.as_deref(), Some("unreachable"));
    assert_eq!(report.steps[3].detail.as_deref(), Some("using cached version"));
    assert_eq!(
        harness.shell.launches(),
        [(harness.config.launch.fallback_command.clone(), true)]
    );
    harness.observer.assert_sequential();
}

/// Given uv missing
/// When the user declines the install
/// Then the run aborts at the first step without installing or launching
#[test]
fn test_declined_install_aborts() {
    let uv = ToolSpec::uv();
    let harness = Harness::new(
        FakeShell::new().with_tools(&["git"]).installable(&uv),
        ScriptedGate::answering(&[Decision::Decline]),
    );

    let report = harness.run();

    assert_eq!(report.statuses(), [Error, Pending, Pending, Pending]);
    assert_eq!(report.result, WorkflowResult::Aborted { step: 0 });
    assert_eq!(harness.shell.install_runs(&uv), 0);
    assert!(harness.shell.launches().is_empty());
    assert_eq!(report.steps[0].detail.as_deref(), Some("missing"));
    // Only the uv version check ran
    assert_eq!(harness.shell.calls(), ["uv --version"]);
    harness.observer.assert_sequential();
}

/// Given git missing after uv is fine
/// When the user declines
/// Then the abort points at the git step
#[test]
fn test_declined_second_tool_aborts_there() {
    let harness = Harness::new(
        FakeShell::new().with_tools(&["uv"]),
        ScriptedGate::answering(&[Decision::Decline]),
    );

    let report = harness.run();

    assert_eq!(report.statuses(), [Done, Error, Pending, Pending]);
    assert_eq!(report.result, WorkflowResult::Aborted { step: 1 });
    assert_eq!(harness.gate.asked(), ["git"]);
}

/// An install that "succeeds" but leaves the tool missing is fatal, and the
/// install is not retried.
#[test]
fn test_install_without_effect_is_fatal() {
    let git = ToolSpec::git();
    let harness = Harness::new(
        FakeShell::new().with_tools(&["uv"]).install_has_no_effect(&git),
        ScriptedGate::answering(&[Decision::Install, Decision::Install]),
    );

    let report = harness.run();

    assert_eq!(report.statuses(), [Done, Error, Pending, Pending]);
    assert_eq!(harness.shell.install_runs(&git), 1);
    assert_eq!(harness.gate.asked(), ["git"]);
    assert!(harness.shell.launches().is_empty());
    assert_eq!(
        report.note.map(|n| n.message),
        Some("Git is required. Restart the launcher after installing it.".to_string())
    );
}

/// A version check that exits non-zero and one that cannot even start are both
/// "tool absent".
#[test]
fn test_failing_version_check_counts_as_absent() {
    for shell in [
        FakeShell::new()
            .with_tools(&["uv", "git"])
            .failing("uv --version"),
        FakeShell::new()
            .with_tools(&["uv", "git"])
            .unspawnable("uv --version"),
    ] {
        let harness = Harness::new(shell, ScriptedGate::answering(&[Decision::Decline]));
        let report = harness.run();
        assert_eq!(harness.gate.asked(), ["uv"]);
        assert_eq!(report.statuses(), [Error, Pending, Pending, Pending]);
    }
}

/// Two runs on a machine that already has everything give the same outcome
/// and never offer an install.
#[test]
fn test_rerun_is_idempotent() {
    let harness = Harness::new(
        FakeShell::new().with_tools(&["uv", "git"]).repo_unreachable(),
        ScriptedGate::default(),
    );

    let first = harness.run();
    let second = harness.run();

    assert_eq!(first.statuses(), second.statuses());
    assert_eq!(first.result, second.result);
    assert_eq!(first.warnings, second.warnings);
    assert!(harness.gate.asked().is_empty());
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(harness.shell.launches().len(), 2);
}

/// The install recipe sees the machine: without brew or winget, git's offer
/// is the manual-download fallback.
#[test]
fn test_install_command_follows_environment() {
    let git = ToolSpec::git();
    let harness = Harness::new(
        FakeShell::new().with_tools(&["uv"]).installable(&git),
        ScriptedGate::answering(&[Decision::Install]),
    );

    harness.run();

    let calls = harness.shell.calls();
    assert!(
        calls.iter().any(|c| c.starts_with("echo Install git manually")),
        "calls: {calls:?}"
    );
}

/// A launch that cannot be spawned fails the launch step.
#[test]
fn test_launch_spawn_failure_aborts_at_launch() {
    let harness = Harness::new(
        FakeShell::new().with_tools(&["uv", "git"]).launch_fails(),
        ScriptedGate::default(),
    );

    let report = harness.run();

    assert_eq!(report.statuses(), [Done, Done, Done, Error]);
    assert_eq!(
        report.result,
        WorkflowResult::Aborted {
            step: harness.config.launch_step()
        }
    );
    harness.observer.assert_sequential();
}

/// A failing update before a fresh launch is only a warning.
#[test]
fn test_failed_update_still_launches_fresh() {
    let mut config = splash::config::LauncherConfig::default();
    config.launch.update_command = Some("uv tool install demo".to_string());
    config.launch.show_console = false;
    let harness = Harness::with_config(
        config,
        FakeShell::new()
            .with_tools(&["uv", "git"])
            .failing("uv tool install demo"),
        ScriptedGate::default(),
    );

    let report = harness.run();

    assert_eq!(report.statuses(), [Done, Done, Done, Done]);
    assert_eq!(
        report.result,
        WorkflowResult::Launched {
            variant: LaunchVariant::Fresh
        }
    );
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("Install/update had issues: error: uv tool install"));
    let launches = harness.shell.launches();
    assert_eq!(launches.len(), 1);
    assert!(!launches[0].1, "detached launch expected");
}

/// The update command only runs on the fresh path.
#[test]
fn test_update_skipped_on_fallback() {
    let mut config = splash::config::LauncherConfig::default();
    config.launch.update_command = Some("uv tool install demo".to_string());
    let harness = Harness::with_config(
        config,
        FakeShell::new().with_tools(&["uv", "git"]).repo_unreachable(),
        ScriptedGate::default(),
    );

    harness.run();

    assert!(!harness
        .shell
        .calls()
        .contains(&"uv tool install demo".to_string()));
}

/// Observers see each step go pending → running → finished, in order.
#[test]
fn test_progress_snapshots_walk_the_steps() {
    let harness = Harness::new(
        FakeShell::new().with_tools(&["uv", "git"]),
        ScriptedGate::default(),
    );
    let report = harness.run();

    let snapshots = harness.observer.snapshots();
    assert!(snapshots.iter().all(|s| s.run_id == report.run_id));
    assert!(snapshots[0].steps.iter().all(|s| s.status == Pending));

    for index in 0..report.steps.len() {
        let first_running = snapshots
            .iter()
            .position(|s| s.steps[index].status == StepStatus::Running)
            .expect("every step runs");
        let first_done = snapshots
            .iter()
            .position(|s| s.steps[index].status == Done)
            .expect("every step finishes");
        assert!(first_running < first_done);
    }
    assert_eq!(snapshots.last().map(|s| s.steps.clone()), Some(report.steps));
}
