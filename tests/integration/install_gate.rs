//! The install dialog as a rendezvous between the workflow thread and the UI.
//!
//! The workflow runs on its own thread with a `ChannelGate`; the test thread
//! plays the UI by feeding messages and key presses through the TEA update.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use splash::config::LauncherConfig;
use splash::gate::ChannelGate;
use splash::tea::{update, Command, Message, Model, Phase};
use splash::tool::ToolSpec;
use splash::workflow::StepStatus::{Done, Error, Pending};
use splash::workflow::{Bootstrap, LaunchVariant, RunReport, WorkflowResult};

use crate::fixtures::FakeShell;

const TIMEOUT: Duration = Duration::from_secs(10);

fn spawn_run(shell: Arc<FakeShell>, tx: Sender<Message>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let bootstrap = Bootstrap::new(
            LauncherConfig::default(),
            shell,
            Arc::new(ChannelGate::new(tx.clone())),
            Arc::new(tx.clone()),
        );
        let result = bootstrap.run().map_err(|e| e.to_string());
        let _ = tx.send(Message::RunFinished(result));
    })
}

/// Play the UI until the run finishes, pressing `key` whenever the dialog is
/// open.
fn drive_ui(rx: &Receiver<Message>, key: KeyCode) -> (Model, RunReport) {
    let mut model = Model::new(&LauncherConfig::default());
    model.phase = Phase::Running;
    let mut report = None;

    while report.is_none() {
        let msg = rx.recv_timeout(TIMEOUT).expect("workflow stalled");
        if let Message::RunFinished(Ok(r)) = &msg {
            report = Some(r.clone());
        }
        execute(update(&mut model, msg));

        if model.prompt.is_some() {
            let press = Message::Key(KeyEvent::new(key, KeyModifiers::NONE));
            execute(update(&mut model, press));
        }
    }
    (model, report.expect("loop exits with a report"))
}

fn execute(cmds: Vec<Command>) {
    for cmd in cmds {
        if let Command::Respond {
            responder,
            decision,
        } = cmd
        {
            responder.respond(decision);
        }
    }
}

#[test]
fn test_enter_installs_and_run_continues() {
    let uv = ToolSpec::uv();
    let shell = Arc::new(FakeShell::new().with_tools(&["git"]).installable(&uv));
    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = spawn_run(shell.clone(), tx);

    let (model, report) = drive_ui(&rx, KeyCode::Enter);
    handle.join().unwrap();

    assert_eq!(report.statuses(), [Done, Done, Done, Done]);
    assert_eq!(
        model.phase,
        Phase::Finished(WorkflowResult::Launched {
            variant: LaunchVariant::Fresh
        })
    );
    assert_eq!(shell.install_runs(&uv), 1);
    assert!(model.prompt.is_none());
    // Fresh launch with no warnings schedules the auto close
    assert!(model.close_at.is_some());
}

#[test]
fn test_escape_declines() {
    let uv = ToolSpec::uv();
    let shell = Arc::new(FakeShell::new().with_tools(&["git"]).installable(&uv));
    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = spawn_run(shell.clone(), tx);

    let (model, report) = drive_ui(&rx, KeyCode::Esc);
    handle.join().unwrap();

    assert_eq!(report.statuses(), [Error, Pending, Pending, Pending]);
    assert_eq!(shell.install_runs(&uv), 0);
    assert!(model.can_start(), "an aborted run can be started again");
}

#[test]
fn test_dropped_prompt_is_a_decline() {
    let uv = ToolSpec::uv();
    let shell = Arc::new(FakeShell::new().with_tools(&["git"]).installable(&uv));
    let (tx, rx) = crossbeam_channel::unbounded::<Message>();
    let handle = spawn_run(shell.clone(), tx);

    let report = loop {
        match rx.recv_timeout(TIMEOUT).expect("workflow stalled") {
            // Dismiss the dialog without answering
            Message::InstallPrompt(prompt) => drop(prompt),
            Message::RunFinished(result) => break result.unwrap(),
            _ => {}
        }
    };
    handle.join().unwrap();

    assert_eq!(report.result, WorkflowResult::Aborted { step: 0 });
    assert_eq!(shell.install_runs(&uv), 0);
}

#[test]
fn test_closed_ui_declines() {
    let uv = ToolSpec::uv();
    let shell = Arc::new(FakeShell::new().with_tools(&["git"]).installable(&uv));
    let (tx, rx) = crossbeam_channel::unbounded::<Message>();
    drop(rx);

    let bootstrap = Bootstrap::new(
        LauncherConfig::default(),
        shell.clone(),
        Arc::new(ChannelGate::new(tx.clone())),
        Arc::new(tx),
    );
    let report = bootstrap.run().unwrap();

    assert_eq!(report.result, WorkflowResult::Aborted { step: 0 });
    assert_eq!(shell.install_runs(&uv), 0);
}

#[test]
fn test_workflow_blocks_until_answered() {
    let uv = ToolSpec::uv();
    let shell = Arc::new(FakeShell::new().with_tools(&["git"]).installable(&uv));
    let (tx, rx) = crossbeam_channel::unbounded::<Message>();
    let handle = spawn_run(shell.clone(), tx);

    let prompt = loop {
        if let Message::InstallPrompt(prompt) = rx.recv_timeout(TIMEOUT).expect("no prompt") {
            break prompt;
        }
    };
    thread::sleep(Duration::from_millis(100));

    // Still parked on the dialog: nothing past the uv version check has run
    assert_eq!(shell.calls(), ["uv --version"]);
    assert!(!handle.is_finished());

    prompt.responder.approve();
    handle.join().unwrap();
    assert_eq!(shell.install_runs(&uv), 1);
}
