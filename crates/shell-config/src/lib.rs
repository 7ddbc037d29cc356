//! Configuration loading and parsing for `kiosk.toml`.
//!
//! Every field has a default so a missing file is not an error; unknown
//! fields are ignored (TOML deserialization tolerance) to allow forward
//! evolution without warnings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct PromptConfig {
    #[serde(default = "PromptConfig::default_user")]
    pub user: String,
    #[serde(default = "PromptConfig::default_host")]
    pub host: String,
    #[serde(default = "PromptConfig::default_symbol")]
    pub symbol: String,
}

impl PromptConfig {
    fn default_user() -> String {
        "guest".to_string()
    }
    fn default_host() -> String {
        "kiosk".to_string()
    }
    fn default_symbol() -> String {
        "$".to_string()
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            user: Self::default_user(),
            host: Self::default_host(),
            symbol: Self::default_symbol(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShellConfig {
    /// Maximum retained history entries; oldest are dropped past this.
    #[serde(default = "ShellConfig::default_history_cap")]
    pub history_cap: usize,
    /// Quiet period after the last resize event before the input reflows.
    #[serde(default = "ShellConfig::default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
}

impl ShellConfig {
    fn default_history_cap() -> usize {
        500
    }
    fn default_resize_debounce_ms() -> u64 {
        150
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_cap: Self::default_history_cap(),
            resize_debounce_ms: Self::default_resize_debounce_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SurfaceConfig {
    /// Attach retries before reporting a loading failure.
    #[serde(default = "SurfaceConfig::default_attach_retries")]
    pub attach_retries: u32,
    #[serde(default = "SurfaceConfig::default_attach_interval_ms")]
    pub attach_interval_ms: u64,
}

impl SurfaceConfig {
    fn default_attach_retries() -> u32 {
        5
    }
    fn default_attach_interval_ms() -> u64 {
        200
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            attach_retries: Self::default_attach_retries(),
            attach_interval_ms: Self::default_attach_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

impl Config {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.shell.resize_debounce_ms)
    }

    pub fn attach_interval(&self) -> Duration {
        Duration::from_millis(self.surface.attach_interval_ms)
    }
}

/// Load configuration from an explicit path, or from `kiosk.toml` in the
/// working directory when none is given. A missing file yields defaults; a
/// present-but-invalid file is an error the caller surfaces at startup.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p, true),
        None => (PathBuf::from("kiosk.toml"), false),
    };
    if !path.exists() {
        if explicit {
            anyhow::bail!("config file not found: {}", path.display());
        }
        info!(target: "config", "no_config_file_defaults_used");
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config =
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    info!(target: "config", file = %path.display(), "config_loaded");
    Ok(config)
}
