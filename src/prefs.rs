use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Display preferences persisted across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
}

impl Preferences {
    /// Load saved preferences; a missing or unreadable file yields the
    /// defaults.
    pub fn load() -> Self {
        let Some(path) = prefs_path() else {
            return Self::default();
        };
        fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<()> {
        let path = prefs_path().context("Could not determine config directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text).context("Failed to write preferences")?;
        Ok(())
    }
}

fn prefs_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "inventory-admin")
        .map(|dirs| dirs.config_dir().join("preferences.json"))
}
