//! Configuration files feeding complete runs.

use std::io::Write;

use tempfile::NamedTempFile;

use splash::config::LauncherConfig;
use splash::gate::Decision;
use splash::workflow::StepStatus::{Done, Warning};
use splash::workflow::{LaunchVariant, WorkflowResult};
use splash::Error;

use crate::fixtures::{FakeShell, Harness, ScriptedGate};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const SINGLE_TOOL: &str = r#"
app_name = "Demo Launcher"
repo_url = "https://example.com/demo.git"
close_on_success = false

[[tools]]
id = "node"
name = "Node.js"
description = "JavaScript runtime."
install = { kind = "command", command = "echo install node" }

[launch]
fresh_command = "demo --fresh"
fallback_command = "demo --offline"
show_console = false

[contact]
name = "Demo Team"
email = "demo@example.com"
"#;

#[test]
fn test_single_tool_config_drives_run() {
    let file = write_config(SINGLE_TOOL);
    let config = LauncherConfig::load(Some(file.path())).unwrap();
    assert_eq!(
        config.step_labels(),
        ["1. Check node", "2. Check repository", "3. Launch app"]
    );

    let harness = Harness::with_config(
        config,
        FakeShell::new().with_tools(&["node", "git"]).repo_unreachable(),
        ScriptedGate::default(),
    );
    let report = harness.run();

    assert_eq!(report.statuses(), [Done, Warning, Done]);
    assert_eq!(
        report.result,
        WorkflowResult::Launched {
            variant: LaunchVariant::Fallback
        }
    );
    assert_eq!(harness.shell.launches(), [("demo --offline".to_string(), false)]);
    assert!(harness
        .shell
        .calls()
        .contains(&"git ls-remote https://example.com/demo.git".to_string()));
    assert_eq!(
        report.warnings[1],
        "If the app didn't start, please contact: Demo Team <demo@example.com>"
    );
}

#[test]
fn test_configured_install_command_is_offered() {
    let file = write_config(SINGLE_TOOL);
    let config = LauncherConfig::load(Some(file.path())).unwrap();
    let node = config.tools[0].clone();

    let harness = Harness::with_config(
        config,
        FakeShell::new().with_tools(&["git"]).installable(&node),
        ScriptedGate::answering(&[Decision::Install]),
    );
    let report = harness.run();

    assert!(report.result.is_launched());
    assert_eq!(harness.shell.install_runs(&node), 1);
    assert!(harness.shell.calls().contains(&"echo install node".to_string()));
}

#[test]
fn test_show_config_round_trips_through_load() {
    let config = LauncherConfig::default();
    let file = write_config(&config.to_toml().unwrap());
    assert_eq!(LauncherConfig::load(Some(file.path())).unwrap(), config);
}

#[test]
fn test_empty_tool_list_rejected() {
    let file = write_config("tools = []\n");
    assert!(matches!(
        LauncherConfig::load(Some(file.path())),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_malformed_toml_rejected() {
    let file = write_config("app_name = \n");
    assert!(matches!(
        LauncherConfig::load(Some(file.path())),
        Err(Error::TomlParse(_))
    ));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(LauncherConfig::load(Some(&missing)).is_err());
}
