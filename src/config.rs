use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::sampler::memory::LEVEL_COUNT;
use crate::sink::default_level_labels;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_rate_ms: u64,
    /// Whether sampling starts at all when the process comes up.
    pub enabled: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_rate_ms: 2000,
            enabled: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub lockscreen: bool,
    /// Accent color as "#rrggbb"; empty means transparent.
    pub color: String,
    pub level_labels: [String; LEVEL_COUNT],
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            lockscreen: true,
            color: String::new(),
            level_labels: default_level_labels(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sysgauge").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
