use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::{error, info, warn};

use crate::{
    config::{AppConfig, UserStoreLocation},
    directory::{self, DirectoryError, MemoryDirectory, SpreadsheetDirectory, UserDirectory},
    web::session::SessionStore,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    directory: Arc<dyn UserDirectory>,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let directory: Arc<dyn UserDirectory> = match &config.user_store {
            UserStoreLocation::Spreadsheet(path) => {
                info!(path = %path.display(), "using spreadsheet user directory");
                Arc::new(SpreadsheetDirectory::new(path.clone()))
            }
            UserStoreLocation::Memory => {
                warn!("using in-memory user directory; accounts are lost on restart");
                Arc::new(MemoryDirectory::default())
            }
        };

        Ok(Self::with_directory(config, directory))
    }

    pub fn with_directory(config: AppConfig, directory: Arc<dyn UserDirectory>) -> Self {
        let sessions = SessionStore::new(Duration::hours(config.session_ttl_hours));
        Self {
            config: Arc::new(config),
            directory,
            sessions,
        }
    }

    pub fn ensure_seed_admin(&self) -> Result<()> {
        let seeded = directory::ensure_seed_admin(
            self.directory(),
            &self.config.admin_names,
            &self.config.seed_admin_password,
        )
        .context("failed to verify admin presence")?;

        if let Some(username) = seeded {
            info!(
                %username,
                "Seeded default admin account with the configured seed password. Change it promptly."
            );
        }

        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs a directory operation on the blocking pool. Spreadsheet reads and
    /// writes are synchronous file I/O and must stay off the async workers.
    pub async fn blocking_directory<F, R>(&self, op: F) -> Result<R, DirectoryError>
    where
        F: FnOnce(&dyn UserDirectory) -> Result<R, DirectoryError> + Send + 'static,
        R: Send + 'static,
    {
        let directory = Arc::clone(&self.directory);
        tokio::task::spawn_blocking(move || op(directory.as_ref()))
            .await
            .map_err(|err| {
                error!(?err, "user directory task failed");
                DirectoryError::Unavailable(format!("directory task failed: {err}"))
            })?
    }
}
