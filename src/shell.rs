//! Running opaque shell command strings through the platform shell.
//!
//! Everything the workflow executes (version checks, installs and the launch) is a
//! verbatim string handed to `cmd /C` on Windows or `sh -c` elsewhere. Only
//! the exit status is ever interpreted.

use std::process::{Command, Stdio};

use crate::tool::Environment;
use crate::{splog_debug, splog_trace, splog_warn, Result};

/// Exit status and combined stdout/stderr of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub output: String,
}

impl CommandOutput {
    /// First `max` characters of the output, for notes.
    pub fn excerpt(&self, max: usize) -> String {
        self.output.trim().chars().take(max).collect()
    }
}

/// The seam between the workflow and the operating system.
pub trait Shell: Environment + Send + Sync {
    /// Run `command` to completion. Blocks for as long as the command does.
    fn run(&self, command: &str) -> Result<CommandOutput>;

    /// Start `command` without waiting for it, either in a new visible
    /// console window or fully detached.
    fn spawn_detached(&self, command: &str, console: bool) -> Result<()>;
}

/// Run `command` and report only whether it exited with status zero.
///
/// A command that cannot even be started counts as a failure, same as a
/// non-zero exit.
pub fn succeeds(shell: &dyn Shell, command: &str) -> bool {
    match shell.run(command) {
        Ok(out) => out.success,
        Err(e) => {
            splog_warn!("Could not run '{}': {}", command, e);
            false
        }
    }
}

/// The real thing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl Environment for SystemShell {
    fn has_program(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

impl Shell for SystemShell {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        splog_debug!("SystemShell::run {}", command);
        let output = shell_command(command).stdin(Stdio::null()).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        splog_trace!(
            "'{}' exited with {:?}: {} bytes of output",
            command,
            output.status.code(),
            combined.len()
        );

        Ok(CommandOutput {
            success: output.status.success(),
            output: combined,
        })
    }

    fn spawn_detached(&self, command: &str, console: bool) -> Result<()> {
        splog_debug!(
            "SystemShell::spawn_detached console={} {}",
            console,
            command
        );
        let mut cmd = if console {
            console_command(command, self)
        } else {
            background_command(command)
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut cmd = Command::new("cmd");
    // raw_arg keeps cmd.exe quoting intact
    cmd.arg("/C").raw_arg(command).creation_flags(CREATE_NO_WINDOW);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

#[cfg(windows)]
fn background_command(command: &str) -> Command {
    shell_command(command)
}

#[cfg(not(windows))]
fn background_command(command: &str) -> Command {
    detach(shell_command(command))
}

/// Put the child in its own process group so closing the splash (or the
/// terminal hosting it) does not take the app with it.
#[cfg(not(windows))]
fn detach(mut cmd: Command) -> Command {
    use std::os::unix::process::CommandExt;

    cmd.process_group(0);
    cmd
}

#[cfg(windows)]
fn console_command(command: &str, _env: &dyn Environment) -> Command {
    use std::os::windows::process::CommandExt;

    let mut cmd = Command::new("cmd");
    cmd.arg("/C").raw_arg(format!("start \"\" cmd /k {command}"));
    cmd
}

#[cfg(not(windows))]
fn console_command(command: &str, env: &dyn Environment) -> Command {
    match terminal_invocation(command, env) {
        Some((program, args)) => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            detach(cmd)
        }
        None => {
            splog_warn!("No terminal emulator found, launching without a console");
            background_command(command)
        }
    }
}

/// Program and arguments that open `command` in a new terminal window.
#[cfg(not(windows))]
fn terminal_invocation(command: &str, env: &dyn Environment) -> Option<(String, Vec<String>)> {
    if cfg!(target_os = "macos") {
        let script = format!(
            "tell application \"Terminal\" to do script \"{}\"",
            command.replace('\\', "\\\\").replace('"', "\\\"")
        );
        return Some(("osascript".to_string(), vec!["-e".to_string(), script]));
    }

    // Keep the window open after the app exits, like `cmd /k`
    let keep_open = format!("{command}; exec \"${{SHELL:-sh}}\"");
    let candidates: [(&str, &[&str]); 4] = [
        ("x-terminal-emulator", &["-e", "sh", "-c"]),
        ("gnome-terminal", &["--", "sh", "-c"]),
        ("konsole", &["-e", "sh", "-c"]),
        ("xterm", &["-e", "sh", "-c"]),
    ];
    candidates
        .iter()
        .find(|(program, _)| env.has_program(program))
        .map(|(program, prefix)| {
            let mut args: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
            args.push(keep_open.clone());
            (program.to_string(), args)
        })
}
