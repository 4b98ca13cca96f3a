//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::gate::Decision;
use crate::workflow::{LaunchVariant, Note, NoteLevel, WorkflowResult};
use crate::{splog, splog_debug, splog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Model, Notification, Phase};

/// How long a clean launch stays on screen before the splash closes.
pub const CLOSE_DELAY: Duration = Duration::from_secs(1);

const NOTE_EXCERPT_LEN: usize = 50;

/// Pure update function: Model + Message → Commands
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return cmds;
            }
            model.notification = None;
            model.dirty = true;
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                cmds.push(Command::Quit);
            } else if model.prompt.is_some() {
                update_dialog(model, key, &mut cmds);
            } else {
                update_splash(model, key, &mut cmds);
            }
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::Progress(progress) => {
            model.steps = progress.steps;
            model.note = progress.note;
            model.dirty = true;
        }

        Message::InstallPrompt(prompt) => {
            splog_debug!("Install dialog opened for '{}'", prompt.tool_id);
            // A stale prompt would be a second waiter; dropping it declines it
            model.prompt = Some(prompt);
            model.dirty = true;
        }

        Message::RunFinished(Ok(report)) => {
            splog!("Run {} finished: {:?}", report.run_id.short(), report.result);
            model.phase = Phase::Finished(report.result);
            model.steps = report.steps;
            model.note = report.note;
            model.prompt = None;

            let clean_fresh_launch = report.result
                == WorkflowResult::Launched {
                    variant: LaunchVariant::Fresh,
                }
                && report.warnings.is_empty();
            if model.close_on_success && clean_fresh_launch {
                model.close_at = Some(Instant::now() + CLOSE_DELAY);
            }
            model.dirty = true;
        }

        Message::RunFinished(Err(error)) => {
            splog_warn!("Run failed internally: {}", error);
            model.phase = Phase::Failed;
            model.prompt = None;
            model.notification = Some(Notification::error(error));
            model.dirty = true;
        }

        Message::CacheCleared { success, detail } => {
            model.clearing_cache = false;
            model.note = Some(if success {
                Note::new(NoteLevel::Success, "Cache cleared successfully!")
            } else {
                let excerpt: String = detail.trim().chars().take(NOTE_EXCERPT_LEN).collect();
                Note::new(
                    NoteLevel::Warning,
                    format!("Cache clear had issues: {excerpt}..."),
                )
            });
            model.dirty = true;
        }

        Message::Tick => {
            if model.close_at.is_some_and(|at| Instant::now() >= at) {
                splog!("Closing after successful launch");
                model.close_at = None;
                cmds.push(Command::Quit);
            }
        }
    }

    cmds
}

/// Keys while the install dialog is open.
fn update_dialog(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => answer_prompt(model, Decision::Install, cmds),
        KeyCode::Esc | KeyCode::Char('n') => answer_prompt(model, Decision::Decline, cmds),
        KeyCode::Char('c') => {
            if let Some(prompt) = &model.prompt {
                cmds.push(Command::CopyToClipboard(prompt.command.clone()));
            }
        }
        KeyCode::Char('o') => {
            if let Some(homepage) = model.prompt.as_ref().and_then(|p| p.homepage.clone()) {
                cmds.push(Command::OpenUrl(homepage));
            }
        }
        KeyCode::Char('q') => cmds.push(Command::Quit),
        _ => {}
    }
}

fn answer_prompt(model: &mut Model, decision: Decision, cmds: &mut Vec<Command>) {
    if let Some(prompt) = model.prompt.take() {
        splog_debug!("Install dialog for '{}' answered: {:?}", prompt.tool_id, decision);
        cmds.push(Command::Respond {
            responder: prompt.responder,
            decision,
        });
    }
}

/// Keys on the plain splash screen.
fn update_splash(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => cmds.push(Command::Quit),
        KeyCode::Char('r') | KeyCode::Enter => {
            if model.can_start() {
                start_run(model, cmds);
            }
        }
        KeyCode::Char('x') => {
            if model.can_clear_cache_now() {
                model.clearing_cache = true;
                model.note = Some(Note::new(NoteLevel::Progress, "Clearing cache..."));
                cmds.push(Command::ClearCache);
            }
        }
        KeyCode::Char('m') => cmds.push(Command::OpenUrl(model.contact.mailto())),
        KeyCode::Char('?') => model.show_keymap = !model.show_keymap,
        _ => {}
    }
}

/// Reset the rows and ask the runtime for a new workflow thread.
pub fn start_run(model: &mut Model, cmds: &mut Vec<Command>) {
    model.reset_steps();
    model.phase = Phase::Running;
    model.close_at = None;
    model.dirty = true;
    cmds.push(Command::StartRun);
}
