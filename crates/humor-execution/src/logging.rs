//! Tracing subscriber initialisation.
//!
//! Filtering comes from `RUST_LOG` when set, otherwise from the configured
//! level. Output goes to stderr (plain or JSON), optionally to a daily
//! rolling file, and optionally to a [`VotingEventLayer`].

use std::path::PathBuf;

use humor_core::config::LogSettings;
use humor_core::error::{HumorError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::tracing_layer::VotingEventLayer;

const LOG_FILE_PREFIX: &str = "humor.log";
const FALLBACK_LEVEL: &str = "info";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the file writer flushing until dropped. Hold it for the life of
/// the process.
#[must_use]
#[derive(Default)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Builder for the global subscriber.
pub struct TracingSetup {
    level: String,
    json: bool,
    console: bool,
    log_dir: Option<PathBuf>,
    events: Option<VotingEventLayer>,
}

impl TracingSetup {
    /// Starts from the `[logging]` section. Console output is on; file
    /// output needs a directory from [`TracingSetup::log_dir`].
    pub fn from_settings(settings: &LogSettings) -> Self {
        Self {
            level: settings.level.clone(),
            json: settings.json,
            console: true,
            log_dir: None,
            events: None,
        }
    }

    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Directory for rolling log files.
    pub fn log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = Some(dir);
        self
    }

    pub fn events(mut self, layer: VotingEventLayer) -> Self {
        self.events = Some(layer);
        self
    }

    /// Installs the subscriber globally.
    ///
    /// # Errors
    ///
    /// Fails if the log directory cannot be created or a global subscriber
    /// is already installed.
    pub fn init(self) -> Result<LoggingGuard> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = LoggingGuard::default();

        if self.console {
            let base = fmt::layer().with_writer(std::io::stderr).with_target(false);
            let layer = if self.json {
                base.json().with_filter(self.filter()).boxed()
            } else {
                base.with_filter(self.filter()).boxed()
            };
            layers.push(layer);
        }

        if let Some(dir) = &self.log_dir {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            let base = fmt::layer().with_writer(writer).with_ansi(false);
            let layer = if self.json {
                base.json().with_filter(self.filter()).boxed()
            } else {
                base.with_filter(self.filter()).boxed()
            };
            layers.push(layer);
            guard._file = Some(file_guard);
        }

        if let Some(events) = self.events {
            layers.push(events.boxed());
        }

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| HumorError::internal(format!("Failed to install tracing subscriber: {}", e)))?;

        tracing::debug!(level = %self.level, json = self.json, "Tracing initialised");
        Ok(guard)
    }

    fn filter(&self) -> EnvFilter {
        filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok(), &self.level)
    }
}

/// Installs console logging (and file logging when `settings.file` is set
/// and `logs_dir` is given).
pub fn init_tracing(settings: &LogSettings, logs_dir: Option<PathBuf>) -> Result<LoggingGuard> {
    let mut setup = TracingSetup::from_settings(settings);
    if settings.file {
        if let Some(dir) = logs_dir {
            setup = setup.log_dir(dir);
        }
    }
    setup.init()
}

/// `RUST_LOG` wins over the configured level; unparsable values fall back.
fn filter_from(env: Option<String>, level: &str) -> EnvFilter {
    env.filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_LEVEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_configured_level_without_env() {
        let filter = filter_from(None, "debug");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_env_overrides_configured_level() {
        let filter = filter_from(Some("warn".to_string()), "debug");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = filter_from(Some("  ".to_string()), "error");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn test_init_tracing_writes_to_log_dir_when_enabled() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs");
        let settings = LogSettings {
            level: "debug".to_string(),
            json: true,
            file: true,
        };

        let guard = init_tracing(&settings, Some(logs.clone())).unwrap();
        tracing::info!(target: "humor_execution", "Log file check");
        drop(guard);

        assert!(logs.is_dir());
        let written: Vec<_> = std::fs::read_dir(&logs).unwrap().collect();
        assert!(!written.is_empty());

        let second = init_tracing(&LogSettings::default(), None);
        assert!(second.is_err());
    }

    #[test]
    fn test_settings_are_carried_into_setup() {
        let settings = LogSettings {
            level: "trace".to_string(),
            json: true,
            file: true,
        };
        let setup = TracingSetup::from_settings(&settings).console(false);

        assert_eq!(setup.level, "trace");
        assert!(setup.json);
        assert!(!setup.console);
        assert!(setup.log_dir.is_none());
    }
}
