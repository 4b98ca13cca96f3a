//! Headless mode: the same workflow with line output on stdout and a y/N
//! question on the terminal instead of the install dialog.

use std::io::{BufRead, BufReader, Write};
use std::sync::{Arc, Mutex};

use crate::config::LauncherConfig;
use crate::gate::{AutoApproveGate, InstallGate};
use crate::shell::Shell;
use crate::tool::{Environment, ToolSpec};
use crate::workflow::{Bootstrap, Note, Observer, Progress, RunReport, Step};
use crate::{splog, Result};

/// Prints each step change and each new note as one line.
pub struct LineObserver<W> {
    out: Mutex<W>,
    last: Mutex<(Vec<Step>, Option<Note>)>,
}

impl<W: Write> LineObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            last: Mutex::new((Vec::new(), None)),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> Observer for LineObserver<W> {
    fn on_progress(&self, progress: Progress) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());

        for (i, step) in progress.steps.iter().enumerate() {
            if last.0.get(i) != Some(step) && !last.0.is_empty() {
                let _ = writeln!(out, "[{}] {}", step.status, step.display_text());
            }
        }
        if let Some(note) = &progress.note {
            if last.1.as_ref() != Some(note) {
                let _ = writeln!(out, "    {}", note.message);
            }
        }
        let _ = out.flush();
        *last = (progress.steps, progress.note);
    }
}

/// Asks on the terminal before installing anything.
pub struct PromptGate<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl<R, W> PromptGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }
}

impl<R, W> InstallGate for PromptGate<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn request_install(&self, tool: &ToolSpec, env: &dyn Environment) -> Option<String> {
        let command = tool.install_command(env);
        {
            let mut out = self.output.lock().unwrap_or_else(|e| e.into_inner());
            let _ = writeln!(out, "{} is not installed. {}", tool.name, tool.description);
            let _ = writeln!(out, "Install command: {command}");
            let _ = write!(out, "Install {} now? [y/N] ", tool.name);
            let _ = out.flush();
        }

        let mut answer = String::new();
        let read = self
            .input
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .read_line(&mut answer);
        let approved = matches!(read, Ok(n) if n > 0)
            && matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");

        splog!(
            "Terminal answer for '{}': {}",
            tool.id,
            if approved { "install" } else { "decline" }
        );
        approved.then_some(command)
    }
}

/// Run the workflow without a TUI. `assume_yes` approves every install.
pub fn run(config: LauncherConfig, shell: Arc<dyn Shell>, assume_yes: bool) -> Result<RunReport> {
    let gate: Arc<dyn InstallGate> = if assume_yes {
        Arc::new(AutoApproveGate)
    } else {
        Arc::new(PromptGate::new(
            BufReader::new(std::io::stdin()),
            std::io::stderr(),
        ))
    };
    let observer = Arc::new(LineObserver::new(std::io::stdout()));

    println!("{}", config.app_name);
    Bootstrap::new(config, shell, gate, observer).run()
}
