//! Configuration service implementation.
//!
//! Loads `HumorConfig` from `config.toml` (creating a default file on first
//! run), layers environment overrides on top and caches the result.

use crate::paths::HumorPaths;
use crate::storage::{AtomicFile, FileFormat};
use humor_core::config::HumorConfig;
use humor_core::error::Result;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

pub const ENV_SUPABASE_URL: &str = "HUMOR_SUPABASE_URL";
pub const ENV_SUPABASE_PUBLISHABLE_KEY: &str = "HUMOR_SUPABASE_PUBLISHABLE_KEY";
pub const ENV_AUTH_CALLBACK_URL: &str = "HUMOR_AUTH_CALLBACK_URL";
pub const ENV_LOG_LEVEL: &str = "HUMOR_LOG_LEVEL";

/// Configuration service that loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<HumorConfig>>>,
}

impl ConfigService {
    /// Creates a service for the config file at `path`.
    ///
    /// The file is read lazily on first access.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service for the default location (`~/.config/humor-study/config.toml`).
    pub fn from_paths(paths: &HumorPaths) -> Result<Self> {
        Ok(Self::new(paths.config_file()?))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Returns the effective configuration, loading it if not cached.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if the merged
    /// configuration does not validate.
    pub fn get_config(&self) -> Result<HumorConfig> {
        if let Ok(read_lock) = self.config.read() {
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let mut loaded = self.load_or_create()?;
        apply_overrides(&mut loaded, |key| std::env::var(key).ok());
        loaded.validate()?;

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }
        tracing::debug!(path = %self.path.display(), "Configuration loaded");

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_or_create(&self) -> Result<HumorConfig> {
        let file = AtomicFile::<HumorConfig>::new(self.path.clone(), FileFormat::Toml);
        match file.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = HumorConfig::default();
                file.save(&default_config)?;
                tracing::info!(path = %self.path.display(), "Created default configuration file");
                Ok(default_config)
            }
        }
    }
}

/// Applies environment overrides; empty values are ignored.
fn apply_overrides<F>(config: &mut HumorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_SUPABASE_URL) {
        config.supabase.url = url.trim_end_matches('/').to_string();
    }
    if let Some(key) = get(ENV_SUPABASE_PUBLISHABLE_KEY) {
        config.supabase.publishable_key = key;
    }
    if let Some(callback) = get(ENV_AUTH_CALLBACK_URL) {
        config.supabase.auth_callback_url = callback;
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
}
