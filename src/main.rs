use std::io::{self, stdout, Stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use splash::app::LogicThread;
use splash::config::LauncherConfig;
use splash::render::RenderState;
use splash::shell::{Shell, SystemShell};
use splash::{headless, splog, splog_error, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps
/// Spinner speed while a step is running.
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// Splash - checks prerequisites, offers installs, then launches the app
#[derive(Parser, Debug)]
#[command(name = "splash")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    SPLASH_DEBUG=1     Enable debug logging (alternative to --debug)"
)]
pub struct Cli {
    /// Enable debug logging (writes to ~/.splash/splash.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Config file (default: ~/.splash/splash.toml)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run without the TUI, printing progress lines and a JSON result
    #[arg(long)]
    pub headless: bool,

    /// Approve every install prompt (headless only)
    #[arg(short = 'y', long, requires = "headless")]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the configured clear-cache command and exit
    ClearCache,

    /// Print the effective configuration as TOML
    ShowConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    splash::log::init_with_debug(cli.debug);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            splog_error!("Fatal: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = LauncherConfig::load(cli.config.as_deref())?;
    let shell: Arc<dyn Shell> = Arc::new(SystemShell);

    match cli.command {
        Some(Command::ShowConfig) => {
            print!("{}", config.to_toml()?);
            return Ok(ExitCode::SUCCESS);
        }
        Some(Command::ClearCache) => return run_clear_cache(&config, shell.as_ref()),
        None => {}
    }

    if cli.headless {
        splog!("Splash starting headless (yes={})", cli.yes);
        let report = headless::run(config, shell, cli.yes)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if report.result.is_launched() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    if cli.debug {
        splog!("Splash starting (debug mode enabled)");
    } else {
        splog!("Splash starting");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle = thread::Builder::new()
        .name("logic".to_string())
        .spawn(move || LogicThread::run(config, shell, state_tx, shutdown_clone))?;

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = match logic_handle.join() {
        Ok(r) => r,
        Err(_) => {
            splog_error!("Logic thread panicked");
            Ok(())
        }
    };
    restore_terminal(&mut terminal)?;
    result?;
    logic_result?;
    Ok(ExitCode::SUCCESS)
}

fn run_clear_cache(config: &LauncherConfig, shell: &dyn Shell) -> Result<ExitCode> {
    let Some(command) = &config.launch.clear_cache_command else {
        println!("No clear_cache_command configured.");
        return Ok(ExitCode::FAILURE);
    };
    println!("Clearing cache...");
    let out = shell.run(command)?;
    if out.success {
        println!("Cache cleared successfully!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Cache clear had issues: {}...", out.excerpt(50));
        Ok(ExitCode::FAILURE)
    }
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut last_spin = Instant::now();
    let mut spinner_frame: usize = 0;
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if state.is_animating() && last_spin.elapsed() >= SPINNER_INTERVAL {
            last_spin = Instant::now();
            spinner_frame = spinner_frame.wrapping_add(1);
            dirty = true;
        }

        if dirty {
            terminal.draw(|f| ui::draw(f, &state, spinner_frame))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
