use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::tool::ToolSpec;
use crate::{splog_debug, Error, Result};

const DEFAULT_REPO_URL: &str = "https://github.com/flol3622/Flupke-launcher";
const DEFAULT_APP_COMMAND: &str = "uvx --from flauncher test";

/// Commands used by the launch step and the cache action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Started when the repository is reachable.
    pub fresh_command: String,
    /// Started when the repository is unreachable; should work from cache.
    pub fallback_command: String,
    /// Run before a fresh launch to install or update the app.
    pub update_command: Option<String>,
    /// Removes the locally cached app.
    pub clear_cache_command: Option<String>,
    /// Open the app in a visible console window instead of detached.
    pub show_console: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            fresh_command: DEFAULT_APP_COMMAND.to_string(),
            // uvx falls back to its cached environment when offline
            fallback_command: DEFAULT_APP_COMMAND.to_string(),
            update_command: Some(format!("uv tool install git+{DEFAULT_REPO_URL}")),
            clear_cache_command: Some("uv tool uninstall flauncher".to_string()),
            show_console: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl Contact {
    pub fn mailto(&self) -> String {
        format!("mailto:{}", self.email)
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            name: "Flol3622".to_string(),
            email: "flupke@example.com".to_string(),
        }
    }
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Immutable launcher configuration, handed to the workflow at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub app_name: String,
    pub repo_url: String,
    /// Start the workflow as soon as the splash opens.
    pub auto_start: bool,
    /// Close the splash one second after a clean fresh launch.
    pub close_on_success: bool,
    // Tables last so the TOML output stays valid
    /// Checked in order, one step each.
    pub tools: Vec<ToolSpec>,
    pub launch: LaunchConfig,
    pub contact: Contact,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            app_name: "UVX Splash".to_string(),
            repo_url: DEFAULT_REPO_URL.to_string(),
            auto_start: true,
            close_on_success: true,
            tools: vec![ToolSpec::uv(), ToolSpec::git()],
            launch: LaunchConfig::default(),
            contact: Contact::default(),
        }
    }
}

impl LauncherConfig {
    pub fn splash_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".splash"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::splash_dir()?.join("splash.toml"))
    }

    /// Load from `path`, or from `~/.splash/splash.toml` when `path` is `None`.
    ///
    /// A missing default file means built-in defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                splog_debug!("LauncherConfig::load explicit path={}", path.display());
                if !path.exists() {
                    return Err(Error::Validation(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => {
                let path = Self::config_path()?;
                splog_debug!("LauncherConfig::load path={}", path.display());
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    splog_debug!("Config file not found, using defaults");
                    Self::default()
                }
            }
        };
        config.validate()?;
        splog_debug!(
            "Config loaded: app={} repo={} tools={:?} show_console={}",
            config.app_name,
            config.repo_url,
            config.tools.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            config.launch.show_console
        );
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tools.is_empty() {
            return Err(Error::Validation("at least one tool is required".to_string()));
        }
        for tool in &self.tools {
            tool.validate().map_err(Error::Validation)?;
        }
        for (i, tool) in self.tools.iter().enumerate() {
            if self.tools[..i].iter().any(|t| t.id == tool.id) {
                return Err(Error::Validation(format!("duplicate tool '{}'", tool.id)));
            }
        }

        let url = Url::parse(&self.repo_url)
            .map_err(|e| Error::Validation(format!("invalid repo_url '{}': {e}", self.repo_url)))?;
        if !matches!(url.scheme(), "http" | "https" | "ssh" | "git" | "file") {
            return Err(Error::Validation(format!(
                "unsupported repo_url scheme '{}'",
                url.scheme()
            )));
        }

        if self.launch.fresh_command.trim().is_empty()
            || self.launch.fallback_command.trim().is_empty()
        {
            return Err(Error::Validation("launch commands must not be empty".to_string()));
        }
        Ok(())
    }

    /// Labels of all steps: one per tool, then repository and launch.
    pub fn step_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .tools
            .iter()
            .enumerate()
            .map(|(i, tool)| format!("{}. Check {}", i + 1, tool.id))
            .collect();
        labels.push(format!("{}. Check repository", self.tools.len() + 1));
        labels.push(format!("{}. Launch app", self.tools.len() + 2));
        labels
    }

    pub fn repository_step(&self) -> usize {
        self.tools.len()
    }

    pub fn launch_step(&self) -> usize {
        self.tools.len() + 1
    }

    /// Command probing whether the repository can be reached.
    pub fn repo_check_command(&self) -> String {
        format!("git ls-remote {}", self.repo_url)
    }
}
