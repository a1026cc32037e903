//! Path management for Ultra
//!
//! Every file the application persists lives under one config directory.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static PATHS: OnceCell<Arc<Paths>> = OnceCell::new();

/// Manages all filesystem paths for the application
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
}

impl Paths {
    /// Initialize the paths singleton
    pub fn init(config: Option<PathBuf>) -> Result<Arc<Paths>> {
        let paths = PATHS.get_or_try_init(|| {
            let paths = Self::new(config)?;
            Ok::<_, anyhow::Error>(Arc::new(paths))
        })?;
        Ok(Arc::clone(paths))
    }

    /// Get the global paths instance
    pub fn get() -> Result<Arc<Paths>> {
        PATHS.get().map(Arc::clone).context("Paths not initialized")
    }

    /// Build paths rooted at `config_override`, or at the platform config dir.
    ///
    /// Unlike [`Paths::init`] this does not touch the singleton, so tests can
    /// point it at a temporary directory.
    pub fn new(config_override: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_override {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "ultra")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".ultra")),
        };

        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory {}", config_dir.display())
        })?;

        Ok(Self { config_dir })
    }

    // ========== Getters ==========

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the credential file path (username -> credential)
    pub fn users_path(&self) -> PathBuf {
        self.config_dir.join("users.json")
    }

    /// Get the login state file path (stay-logged-in flag + username)
    pub fn login_state_path(&self) -> PathBuf {
        self.config_dir.join("login_state.json")
    }

    /// Get the last-login file path (username + timestamp)
    pub fn login_info_path(&self) -> PathBuf {
        self.config_dir.join("login_info.json")
    }
}
