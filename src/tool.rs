//! Required tools and how to install them.

use serde::{Deserialize, Serialize};

/// What the launcher can ask about the machine it runs on.
pub trait Environment {
    /// Whether `program` can be found on `PATH`.
    fn has_program(&self, program: &str) -> bool;
}

/// How to produce the install command for a tool.
///
/// Resolution is a pure function of the environment and happens every time an
/// install is offered, so a package manager installed in the meantime is
/// picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstallRecipe {
    /// Always the same command.
    Command { command: String },
    /// Use `command` when `manager` is on `PATH`, otherwise `fallback`.
    PackageManager {
        manager: String,
        command: String,
        fallback: String,
    },
}

impl InstallRecipe {
    pub fn resolve(&self, env: &dyn Environment) -> String {
        match self {
            InstallRecipe::Command { command } => command.clone(),
            InstallRecipe::PackageManager {
                manager,
                command,
                fallback,
            } => {
                if env.has_program(manager) {
                    command.clone()
                } else {
                    fallback.clone()
                }
            }
        }
    }

    fn commands(&self) -> Vec<&str> {
        match self {
            InstallRecipe::Command { command } => vec![command.as_str()],
            InstallRecipe::PackageManager {
                command, fallback, ..
            } => vec![command.as_str(), fallback.as_str()],
        }
    }
}

/// A tool the launched application needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Program name, also used for the `--version` check.
    pub id: String,
    pub name: String,
    pub description: String,
    pub homepage: Option<String>,
    pub install: InstallRecipe,
}

impl ToolSpec {
    pub fn version_command(&self) -> String {
        format!("{} --version", self.id)
    }

    pub fn install_command(&self, env: &dyn Environment) -> String {
        self.install.resolve(env)
    }

    /// Python tool runner.
    pub fn uv() -> Self {
        let command = if cfg!(windows) {
            r#"powershell -ExecutionPolicy Bypass -Command "irm https://astral.sh/uv/install.ps1 | iex""#
        } else {
            "curl -LsSf https://astral.sh/uv/install.sh | sh"
        };
        Self {
            id: "uv".to_string(),
            name: "uv".to_string(),
            description: "Tool for managing Python code, installing and running Python, \
                          executing scripts, and more."
                .to_string(),
            homepage: Some("https://docs.astral.sh/uv/".to_string()),
            install: InstallRecipe::Command {
                command: command.to_string(),
            },
        }
    }

    /// Version-control client.
    pub fn git() -> Self {
        let install = if cfg!(windows) {
            InstallRecipe::PackageManager {
                manager: "winget".to_string(),
                command: "winget install --id Git.Git -e --source winget".to_string(),
                fallback: "echo Install git manually from https://git-scm.com/download/win"
                    .to_string(),
            }
        } else {
            InstallRecipe::PackageManager {
                manager: "brew".to_string(),
                command: "brew install git".to_string(),
                fallback: "echo Install git manually from https://git-scm.com/downloads"
                    .to_string(),
            }
        };
        Self {
            id: "git".to_string(),
            name: "Git".to_string(),
            description: "Tool for version control, enabling downloading and updating code."
                .to_string(),
            homepage: Some("https://git-scm.com/".to_string()),
            install,
        }
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() || self.id.contains(char::is_whitespace) {
            return Err(format!("invalid tool id '{}'", self.id));
        }
        if self.install.commands().iter().any(|c| c.trim().is_empty()) {
            return Err(format!("tool '{}' has an empty install command", self.id));
        }
        Ok(())
    }
}
