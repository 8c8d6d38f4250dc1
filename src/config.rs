// Stored preferences loaded from config.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Renderer invoked when the config does not name one
pub const DEFAULT_EXECUTABLE: &str = "silicon";

/// Background used when the config does not set one
pub const DEFAULT_BACKGROUND: &str = "#aaaaff";

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Renderer name (looked up on PATH) or path
    #[serde(default = "default_executable")]
    pub executable: String,
    /// Directory images are saved into; falls back to the source file's directory
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
    #[serde(default)]
    pub defaults: StoredDefaults,
}

/// Default values for every option that has a stored fallback
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StoredDefaults {
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default = "default_true")]
    pub window_controls: bool,
    #[serde(default = "default_true")]
    pub round_corners: bool,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub shadow: ShadowDefaults,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ShadowDefaults {
    pub blur_radius: Option<i64>,
    pub color: Option<String>,
    pub offset_x: Option<i64>,
    pub offset_y: Option<i64>,
}

fn default_executable() -> String {
    DEFAULT_EXECUTABLE.to_string()
}
fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            save_dir: None,
            defaults: StoredDefaults::default(),
        }
    }
}

impl Default for StoredDefaults {
    fn default() -> Self {
        Self {
            line_numbers: true,
            window_controls: true,
            round_corners: true,
            background: default_background(),
            theme: None,
            shadow: ShadowDefaults::default(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text).context("Invalid config")?;
        config.save_dir = config.save_dir.map(|dir| expand_home(&dir));
        Ok(config)
    }

    /// Load the config at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))
    }

    /// Load an explicit config, or the default location if present, or built-in defaults.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            _ => {
                tracing::debug!("no config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `$XDG_CONFIG_HOME/codeshot/config.toml` (platform equivalent elsewhere)
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("codeshot").join("config.toml"))
}

/// Expand a leading `~/` against the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
