use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use crossterm::event::{self, Event};

use crate::config::LauncherConfig;
use crate::desktop;
use crate::gate::ChannelGate;
use crate::render::RenderState;
use crate::shell::Shell;
use crate::tea::update::start_run;
use crate::tea::{update, Command, Message, Model, Notification};
use crate::workflow::Bootstrap;
use crate::{splog, splog_debug, splog_error, splog_warn, Result};

const MAX_BG_MESSAGES: usize = 50;
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// What commands need to reach outside the model.
struct Services {
    config: LauncherConfig,
    shell: Arc<dyn Shell>,
    msg_tx: Sender<Message>,
}

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: LauncherConfig,
        shell: Arc<dyn Shell>,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        splog_debug!(
            "LogicThread::run app={} auto_start={}",
            config.app_name,
            config.auto_start
        );
        let mut model = Model::new(&config);
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Message>();
        let services = Services {
            config,
            shell,
            msg_tx,
        };

        if services.config.auto_start {
            let mut cmds = Vec::new();
            start_run(&mut model, &mut cmds);
            if dispatch(&mut model, cmds, &services) {
                return Ok(());
            }
        }

        send_state(&state_tx, &mut model);
        let mut last_tick = Instant::now();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    Event::Key(key) => Message::Key(key),
                    Event::Resize(w, h) => Message::Resize(w, h),
                    _ => continue,
                };
                let cmds = update(&mut model, msg);
                if dispatch(&mut model, cmds, &services) {
                    shutdown.store(true, Ordering::Relaxed);
                    return Ok(());
                }
                send_state(&state_tx, &mut model);
            }

            // Background messages (bounded)
            if drain_background(&mut model, &msg_rx, &services) {
                shutdown.store(true, Ordering::Relaxed);
                return Ok(());
            }

            if last_tick.elapsed() >= TICK_INTERVAL {
                last_tick = Instant::now();
                let cmds = update(&mut model, Message::Tick);
                if dispatch(&mut model, cmds, &services) {
                    shutdown.store(true, Ordering::Relaxed);
                    return Ok(());
                }
            }

            send_state(&state_tx, &mut model);
            thread::sleep(Duration::from_micros(500));
        }

        Ok(())
    }
}

/// Feed up to [`MAX_BG_MESSAGES`] pending messages through `update`.
/// Returns true when a command asked to quit.
fn drain_background(model: &mut Model, msg_rx: &Receiver<Message>, services: &Services) -> bool {
    for _ in 0..MAX_BG_MESSAGES {
        let Ok(msg) = msg_rx.try_recv() else { break };
        let cmds = update(model, msg);
        if dispatch(model, cmds, services) {
            return true;
        }
    }
    false
}

/// Execute `cmds` in order. Returns true when one of them was `Quit`.
fn dispatch(model: &mut Model, cmds: Vec<Command>, services: &Services) -> bool {
    for cmd in cmds {
        if execute_command(model, cmd, services) {
            return true;
        }
    }
    false
}

fn execute_command(model: &mut Model, cmd: Command, services: &Services) -> bool {
    match cmd {
        Command::StartRun => {
            splog_debug!("Command::StartRun");
            let bootstrap = Bootstrap::new(
                services.config.clone(),
                services.shell.clone(),
                Arc::new(ChannelGate::new(services.msg_tx.clone())),
                Arc::new(services.msg_tx.clone()),
            );
            let tx = services.msg_tx.clone();
            let spawned = thread::Builder::new()
                .name("workflow".to_string())
                .spawn(move || {
                    let result = bootstrap.run().map_err(|e| {
                        splog_error!("Workflow run failed: {}", e);
                        e.to_string()
                    });
                    let _ = tx.send(Message::RunFinished(result));
                });
            if let Err(e) = spawned {
                splog_error!("Failed to spawn workflow thread: {}", e);
                let _ = services
                    .msg_tx
                    .send(Message::RunFinished(Err(format!("could not start: {e}"))));
            }
        }

        Command::Respond {
            responder,
            decision,
        } => {
            splog_debug!("Command::Respond decision={:?}", decision);
            responder.respond(decision);
        }

        Command::CopyToClipboard(text) => {
            splog_debug!("Command::CopyToClipboard");
            model.notification = Some(match desktop::copy_to_clipboard(&text) {
                Ok(()) => Notification::info("Install command copied to clipboard"),
                Err(e) => {
                    splog_warn!("Clipboard copy failed: {}", e);
                    Notification::error(format!("Could not copy: {e}"))
                }
            });
            model.dirty = true;
        }

        Command::OpenUrl(url) => {
            splog_debug!("Command::OpenUrl url={}", url);
            if let Err(e) = desktop::open_url(&url) {
                splog_warn!("Opening {} failed: {}", url, e);
                model.notification = Some(Notification::error(format!("Could not open link: {e}")));
                model.dirty = true;
            }
        }

        Command::ClearCache => {
            let Some(command) = services.config.launch.clear_cache_command.clone() else {
                return false;
            };
            splog!("Clearing cache: {}", command);
            let shell = services.shell.clone();
            let tx = services.msg_tx.clone();
            let spawned = thread::Builder::new()
                .name("clear-cache".to_string())
                .spawn(move || {
                    let msg = match shell.run(&command) {
                        Ok(out) => Message::CacheCleared {
                            success: out.success,
                            detail: out.output,
                        },
                        Err(e) => Message::CacheCleared {
                            success: false,
                            detail: e.to_string(),
                        },
                    };
                    let _ = tx.send(msg);
                });
            if let Err(e) = spawned {
                let _ = services.msg_tx.send(Message::CacheCleared {
                    success: false,
                    detail: e.to_string(),
                });
            }
        }

        Command::Quit => {
            splog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

/// Push a snapshot if anything changed. A full channel keeps the model dirty
/// so the next iteration retries with fresher state.
fn send_state(state_tx: &Sender<RenderState>, model: &mut Model) {
    if !model.dirty {
        return;
    }
    match state_tx.try_send(model.snapshot()) {
        Ok(()) | Err(TrySendError::Disconnected(_)) => model.dirty = false,
        Err(TrySendError::Full(_)) => {}
    }
}
