//! Small desktop integrations used by the splash UI: opening links and
//! writing to the clipboard.

use std::io::Write;
use std::process::{Command, Stdio};

use url::Url;

use crate::{splog_debug, Error, Result};

/// Parse `raw` and accept only schemes the splash links to.
pub fn parse_openable_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("missing URL".to_string()));
    }
    let parsed =
        Url::parse(trimmed).map_err(|e| Error::Validation(format!("invalid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" | "mailto" => Ok(parsed),
        scheme => Err(Error::Validation(format!(
            "unsupported URL scheme '{scheme}'"
        ))),
    }
}

/// Open `raw` with the system handler (browser, mail client).
pub fn open_url(raw: &str) -> Result<()> {
    let url = parse_openable_url(raw)?;
    splog_debug!("Opening {}", url);
    open_with_system(url.as_str())
}

#[cfg(target_os = "macos")]
fn open_with_system(url: &str) -> Result<()> {
    spawn_quiet(Command::new("open").arg(url), "open")
}

#[cfg(target_os = "windows")]
fn open_with_system(url: &str) -> Result<()> {
    spawn_quiet(
        Command::new("rundll32").args(["url.dll,FileProtocolHandler", url]),
        "rundll32",
    )
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_with_system(url: &str) -> Result<()> {
    spawn_quiet(Command::new("xdg-open").arg(url), "xdg-open")
}

#[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
fn open_with_system(_url: &str) -> Result<()> {
    Err(Error::Platform(
        "opening URLs is not supported on this platform".to_string(),
    ))
}

fn spawn_quiet(cmd: &mut Command, program: &str) -> Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| Error::Platform(format!("failed to run '{program}': {e}")))
}

/// Clipboard programs to try, in order, as (program, args).
#[cfg(target_os = "windows")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Put `text` on the system clipboard by piping it to the platform's copy tool.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let (program, args) = CLIPBOARD_TOOLS
        .iter()
        .find(|(program, _)| which::which(program).is_ok())
        .ok_or_else(|| Error::Platform("no clipboard tool found".to_string()))?;
    splog_debug!("Copying {} bytes with {}", text.len(), program);

    let mut child = Command::new(program)
        .args(*args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Platform(format!("failed to spawn {program}: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(Error::Platform(format!("{program} exited with {status}")));
    }
    Ok(())
}
