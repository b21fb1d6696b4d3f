//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every section and
//! field has a default so a partial file is valid.

use serde::{Deserialize, Serialize};

use crate::error::{HumorError, Result};

pub const DEFAULT_AUTH_CALLBACK_URL: &str = "https://thehumorproject1.vercel.app/auth/callback";
pub const DEFAULT_OAUTH_PROVIDER: &str = "google";
pub const DEFAULT_SAMPLE_SIZE: usize = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct HumorConfig {
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub voting: VotingSettings,
    #[serde(default)]
    pub logging: LogSettings,
}

impl HumorConfig {
    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.voting.sample_size == 0 {
            return Err(HumorError::config("voting.sample_size must be at least 1"));
        }
        if !self.supabase.url.is_empty()
            && !(self.supabase.url.starts_with("https://") || self.supabase.url.starts_with("http://"))
        {
            return Err(HumorError::config(format!(
                "supabase.url must be an http(s) URL, got '{}'",
                self.supabase.url
            )));
        }
        Ok(())
    }
}

/// Connection settings for the hosted backend.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub publishable_key: String,
    #[serde(default = "default_auth_callback_url")]
    pub auth_callback_url: String,
    #[serde(default = "default_oauth_provider")]
    pub oauth_provider: String,
    /// Per-request timeout in seconds; 0 disables it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl SupabaseSettings {
    /// Returns true when both the project URL and key are set.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.publishable_key.trim().is_empty()
    }

    /// The publishable key with everything but the last four characters hidden.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.publishable_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            publishable_key: String::new(),
            auth_callback_url: default_auth_callback_url(),
            oauth_provider: default_oauth_provider(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct VotingSettings {
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for VotingSettings {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Also write daily-rolling log files under the app log directory.
    #[serde(default)]
    pub file: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file: false,
        }
    }
}

fn default_auth_callback_url() -> String {
    DEFAULT_AUTH_CALLBACK_URL.to_string()
}

fn default_oauth_provider() -> String {
    DEFAULT_OAUTH_PROVIDER.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}
