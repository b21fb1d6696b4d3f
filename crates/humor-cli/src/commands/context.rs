use std::path::PathBuf;

use anyhow::{Context, Result};
use humor_application::VotingController;
use humor_core::config::HumorConfig;
use humor_execution::logging::init_tracing;
use humor_execution::{LoggingGuard, TracingSetup};
use humor_infrastructure::paths::HumorPaths;
use humor_infrastructure::{Backend, ConfigService};

/// Everything a command needs: resolved paths and the effective config.
pub struct AppContext {
    pub paths: HumorPaths,
    pub config_file: PathBuf,
    pub config: HumorConfig,
    pub demo: bool,
}

impl AppContext {
    /// Resolves paths and loads the configuration.
    ///
    /// With `--config <file>` the session and logs live next to that file.
    pub fn load(config_file: Option<PathBuf>, demo: bool) -> Result<Self> {
        let (paths, service) = match config_file {
            Some(file) => {
                let base = file
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                (HumorPaths::new(Some(base)), ConfigService::new(file))
            }
            None => {
                let paths = HumorPaths::default();
                let service = ConfigService::from_paths(&paths)?;
                (paths, service)
            }
        };

        let config = service
            .get_config()
            .with_context(|| format!("Failed to load {}", service.path().display()))?;

        Ok(Self {
            paths,
            config_file: service.path().clone(),
            config,
            demo,
        })
    }

    /// Starts tracing with the configured level and outputs.
    pub fn tracing(&self) -> Result<TracingSetup> {
        let mut setup = TracingSetup::from_settings(&self.config.logging);
        if self.config.logging.file {
            setup = setup.log_dir(self.paths.logs_dir()?);
        }
        Ok(setup)
    }

    /// Installs tracing for one-shot commands.
    pub fn init_tracing(&self) -> Result<LoggingGuard> {
        Ok(init_tracing(&self.config.logging, Some(self.paths.logs_dir()?))?)
    }

    pub async fn backend(&self) -> Result<Backend> {
        if self.demo {
            return Ok(Backend::demo());
        }
        Backend::hosted(&self.config, &self.paths).await.with_context(|| {
            format!(
                "Backend not configured. Set [supabase] in {} (or HUMOR_SUPABASE_URL and \
                 HUMOR_SUPABASE_PUBLISHABLE_KEY), or run with --demo",
                self.config_file.display()
            )
        })
    }

    pub fn controller(&self, backend: &Backend) -> VotingController {
        VotingController::new(
            backend.sessions.clone(),
            backend.captions.clone(),
            backend.votes.clone(),
        )
        .with_sample_size(self.config.voting.sample_size)
    }
}
