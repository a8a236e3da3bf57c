//! Command implementations.

pub mod catalog;
pub mod migrate;
pub mod profile;
pub mod stack;

use std::sync::Arc;

use stackwise_tracker::auth::{CurrentUser, StaticAuth, require_user};
use stackwise_tracker::config::TrackerConfig;
use stackwise_tracker::db::{PgStore, StoreError};
use stackwise_tracker::regimen::RegimenStore;
use stackwise_tracker::TrackerError;
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Tracker(err.into())
    }
}

impl CliError {
    /// Log the failure and print a message for the user.
    pub fn report(&self) {
        match self {
            Self::Tracker(err) => {
                err.report();
                #[allow(clippy::print_stderr)]
                {
                    eprintln!("{}", err.user_message());
                }
            }
            Self::Migrate(_) | Self::Json(_) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(error = %self, sentry_event_id = %event_id, "Command failed");
            }
        }
    }
}

/// Shared state for a single command invocation.
pub struct Context {
    pub config: TrackerConfig,
    pub auth: StaticAuth,
}

impl Context {
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if `STACKWISE_USER_ID` is malformed.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Ok(Self {
            config,
            auth: StaticAuth::from_env()?,
        })
    }

    /// Connect to the configured database.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` without a database URL and
    /// `TrackerError::Store` if the connection fails.
    pub async fn store(&self) -> Result<Arc<PgStore>, TrackerError> {
        tracing::debug!("Connecting to database...");
        Ok(Arc::new(PgStore::connect(&self.config).await?))
    }

    /// Regimen store over `store` with the configured default dose.
    #[must_use]
    pub fn regimen(&self, store: Arc<PgStore>) -> RegimenStore {
        RegimenStore::new(store, self.config.default_servings_per_day)
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NotAuthenticated` when `STACKWISE_USER_ID` is unset.
    pub async fn user(&self) -> Result<CurrentUser, TrackerError> {
        require_user(&self.auth).await
    }
}
