//! Unified error handling with Sentry integration.
//!
//! Constraint-level outcomes (duplicate membership, denied writes) are typed
//! results on the operations that produce them and never appear here.
//! `TrackerError` carries only input validation failures and system-level
//! errors that the caller handles generically.

use stackwise_core::{GenderError, PriceError, ServingsError, UnitError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::db::{PgConnectError, StoreError};

/// Application-level error type for the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Input rejected before any write was attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No user is signed in.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TrackerError {
    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_transient(),
            _ => false,
        }
    }

    /// Whether this is an unexpected failure worth reporting.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(
            self,
            Self::Store(
                StoreError::Connectivity(_)
                    | StoreError::Database(_)
                    | StoreError::DataCorruption(_)
                    | StoreError::ConstraintViolation(_)
            ) | Self::Config(_)
        )
    }

    /// A message safe to show the user.
    ///
    /// Internal error details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(StoreError::PermissionDenied(_)) => {
                "You do not have permission to perform this action.".to_string()
            }
            Self::Store(StoreError::Connectivity(_)) => {
                "Could not reach the server. Please try again.".to_string()
            }
            Self::Store(_) => "Something went wrong. Please try again.".to_string(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::NotAuthenticated => "Please log in to manage your regimen.".to_string(),
            Self::Config(err) => err.to_string(),
        }
    }

    /// Log the error and, for system-level failures, capture it to Sentry.
    pub fn report(&self) {
        if self.is_system() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Tracker error"
            );
        } else {
            tracing::warn!(error = %self, "Operation rejected");
        }
    }
}

impl From<ServingsError> for TrackerError {
    fn from(err: ServingsError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<UnitError> for TrackerError {
    fn from(err: UnitError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<GenderError> for TrackerError {
    fn from(err: GenderError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<PriceError> for TrackerError {
    fn from(err: PriceError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<PgConnectError> for TrackerError {
    fn from(err: PgConnectError) -> Self {
        match err {
            PgConnectError::Config(e) => Self::Config(e),
            PgConnectError::Store(e) => Self::Store(e),
        }
    }
}

/// Result type alias for `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Set the Sentry user context for the signed-in user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
