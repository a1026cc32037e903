//! User configuration for Ultra
//!
//! This module handles user-configurable settings stored in settings.json.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::Paths;
use crate::store::json_file;

/// User configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// How long a "stay logged in" session is honored
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,

    /// Interval between seek bar refreshes while a song plays
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Volume applied when the player opens (0-100)
    #[serde(default = "default_volume")]
    pub default_volume: u8,

    /// File extensions picked up when a directory is loaded
    #[serde(default = "default_song_extensions")]
    pub song_extensions: Vec<String>,

    /// Song names longer than this are cut and suffixed with "..."
    #[serde(default = "default_display_name_max_len")]
    pub display_name_max_len: usize,

    /// Directory loaded when the player opens, if any
    #[serde(default)]
    pub music_dir: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: default_session_ttl_days(),
            poll_interval_ms: default_poll_interval_ms(),
            default_volume: default_volume(),
            song_extensions: default_song_extensions(),
            display_name_max_len: default_display_name_max_len(),
            music_dir: None,
        }
    }
}

impl UserConfig {
    /// Load configuration from the global paths
    pub fn load() -> Result<Self> {
        let paths = Paths::get()?;
        Self::load_from(&paths.settings_path())
    }

    /// Load configuration from a settings file, writing defaults if it is missing
    pub fn load_from(settings_path: &Path) -> Result<Self> {
        if settings_path.exists() {
            let content =
                std::fs::read_to_string(settings_path).context("Failed to read settings file")?;
            let mut config: UserConfig =
                serde_json::from_str(&content).context("Failed to parse settings file")?;

            config.default_volume = config.default_volume.min(100);
            config.song_extensions = config
                .song_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect();

            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(settings_path)?;
            Ok(config)
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, settings_path: &Path) -> Result<()> {
        json_file::write_json(settings_path, self).context("Failed to write settings file")
    }

    /// Session lifetime as a chrono duration
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }

    /// Poll interval as a std duration, never below 50ms
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }
}

// Default value functions for serde

fn default_session_ttl_days() -> i64 {
    15
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_volume() -> u8 {
    50
}

fn default_song_extensions() -> Vec<String> {
    // mp3 first; the rest are formats rodio decodes out of the box
    ["mp3", "flac", "wav", "ogg"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_display_name_max_len() -> usize {
    25
}
