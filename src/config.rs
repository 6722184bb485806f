//! Launcher configuration.
//!
//! Read once at startup from `$XDG_CONFIG_HOME/CapyShell/launcher.json`.
//! Every field has a default, so a missing or partial file is fine.

use capy_home::DOCK_HEIGHT;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// BCP-47 tag for labels and collation; falls back to the environment.
    pub locale: Option<String>,
    pub dock_height: i32,
    /// Persisted usage and widget state.
    pub state_path: Option<PathBuf>,
    pub watch_applications: bool,
    pub watch_debounce_ms: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            locale: None,
            dock_height: DOCK_HEIGHT,
            state_path: None,
            watch_applications: true,
            watch_debounce_ms: 500,
        }
    }
}

impl LauncherConfig {
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("CapyShell").join("launcher.json"))
    }

    /// Load from config file, or return default if not found
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring invalid config {:?}: {}", path, e);
            Self::default()
        })
    }

    /// Configured state file, else `$XDG_DATA_HOME/CapyShell/launcher_state.json`.
    /// `None` keeps state in memory only.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_path
            .clone()
            .or_else(|| Some(dirs::data_dir()?.join("CapyShell").join("launcher_state.json")))
    }

    /// Configured locale, else the one from the environment.
    pub fn locale(&self) -> Option<String> {
        self.locale
            .as_deref()
            .and_then(capy_home::normalize_locale_tag)
            .or_else(capy_home::locale_from_env)
    }

    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}
