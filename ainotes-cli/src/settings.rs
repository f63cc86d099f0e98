//! Application settings persistence for AI Notes.
//!
//! Stores user preferences (database location, AI provider) in a JSON file
//! at an OS-appropriate location.

use ainotes_core::AiConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables checked, in order, for the AI provider key.
const API_KEY_VARS: [&str; 2] = ["AINOTES_API_KEY", "GROQ_API_KEY"];

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// SQLite file holding the notes record.
    pub database_path: String,
    pub ai: AiConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path().to_string_lossy().to_string(),
            ai: AiConfig::default(),
        }
    }
}

impl AppSettings {
    /// Fills `ai.api_key` from the environment when a key variable is set.
    pub fn apply_env(mut self) -> Self {
        let from_env = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty());
        if let Some(key) = from_env {
            self.ai.api_key = Some(key);
        }
        self
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/ainotes/settings.json`
/// - Windows: `%APPDATA%/AINotes/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("AINotes").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("ainotes").join("settings.json")
    }
}

/// Returns the default database location under the user's data directory.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join("ainotes")
        .join("notes.db")
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings_from(path: &Path) -> AppSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings at {}: {e}", path.display());
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    }
}

/// Loads settings from the standard location.
pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_file_path())
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create settings directory: {e}"))?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write settings: {e}"))?;
    Ok(())
}
