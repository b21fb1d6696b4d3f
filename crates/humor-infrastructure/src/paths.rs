//! Unified path management for humor-study files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/humor-study/       # Config directory (platform default)
//! ├── config.toml              # Application configuration
//! ├── session.json             # Stored auth tokens (0600)
//! └── logs/                    # Application logs
//!     └── humor.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use humor_core::error::{HumorError, Result};

const APP_DIR_NAME: &str = "humor-study";

/// Resolves every on-disk location used by the application.
///
/// With a base directory all paths live under it (used by tests and the
/// `--config` flag); otherwise the platform config directory is used.
#[derive(Debug, Clone, Default)]
pub struct HumorPaths {
    base: Option<PathBuf>,
}

impl HumorPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the configuration directory (e.g. `~/.config/humor-study/`).
    ///
    /// # Errors
    ///
    /// Returns `HumorError::Config` if the platform config directory cannot be
    /// determined.
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| HumorError::config("Cannot find home directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path of the stored auth session.
    ///
    /// # Security Note
    ///
    /// The file holds bearer tokens and is written with 600 permissions on Unix.
    pub fn session_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("session.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("logs"))
    }
}
