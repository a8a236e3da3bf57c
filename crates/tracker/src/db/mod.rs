//! Persistence for the regimen tracker.
//!
//! # Tables
//!
//! - `brands`, `supplements`, `products` - Catalog (read-only for the tracker)
//! - `users_products` - Regimen membership, `PRIMARY KEY (user_id, product_id)`
//! - `user_profiles` - Optional demographics, one row per user
//!
//! The unique key on `users_products` is the single source of truth for
//! membership. Callers may look an entry up first, but only the result of the
//! constrained insert decides whether a row was created.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/tracker/migrations/` and run via:
//! ```bash
//! cargo run -p stackwise-cli -- migrate
//! ```

mod memory;
mod postgres;
pub mod rows;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use stackwise_core::{ProductId, SupplementId, UserId};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::{PgConnectError, PgStore};
pub use rows::{EntryRow, ProductRow, ProfileRow, RegimenRow, SupplementRow};

use crate::models::NewRegimenEntry;

/// `PostgreSQL` SQLSTATE for `insufficient_privilege`, raised by row-level
/// security when a write is not permitted.
pub(crate) const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. duplicate membership).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The authorization policy rejected the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The write referenced a row that does not exist (e.g. an unknown product).
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// The store could not be reached.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Any other database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Whether the failure is transient and the operation may be retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return Self::ConstraintViolation(db_err.message().to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::MissingReference(db_err.message().to_owned());
            }
            if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) {
                return Self::PermissionDenied(db_err.message().to_owned());
            }
        }
        if matches!(
            e,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ) {
            return Self::Connectivity(e.to_string());
        }
        Self::Database(e)
    }
}

/// Storage collaborator for the tracker.
///
/// Reads have no side effects and may be retried freely. Each write is a
/// single atomic statement, so a failed write leaves state unchanged.
#[async_trait]
pub trait RegimenBackend: Send + Sync {
    /// All supplements, ordered by name ascending.
    async fn list_supplements(&self) -> Result<Vec<SupplementRow>, StoreError>;

    /// A single supplement.
    async fn get_supplement(&self, id: SupplementId)
    -> Result<Option<SupplementRow>, StoreError>;

    /// Products in a supplement category, ordered by product name ascending.
    async fn products_for_supplement(
        &self,
        id: SupplementId,
    ) -> Result<Vec<ProductRow>, StoreError>;

    /// A single product with its brand.
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRow>, StoreError>;

    /// Look up the membership row for the exact (user, product) key.
    async fn find_entry(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Option<EntryRow>, StoreError>;

    /// Insert a membership row.
    ///
    /// Must return `StoreError::ConstraintViolation` when the key already
    /// exists, `StoreError::MissingReference` when the product is not in the
    /// catalog and `StoreError::PermissionDenied` when the write is not allowed.
    async fn insert_entry(&self, entry: &NewRegimenEntry) -> Result<EntryRow, StoreError>;

    /// Delete a membership row. Returns whether a row was removed.
    async fn delete_entry(&self, user: UserId, product: ProductId) -> Result<bool, StoreError>;

    /// A user's membership rows joined with catalog data, oldest first.
    async fn entries_for_user(&self, user: UserId) -> Result<Vec<RegimenRow>, StoreError>;

    /// The user's profile row, if one exists.
    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRow>, StoreError>;

    /// Insert or overwrite the profile row keyed on the user ID.
    async fn upsert_profile(&self, profile: &ProfileRow) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
