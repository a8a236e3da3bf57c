//! `PostgreSQL` implementation of [`RegimenBackend`].
//!
//! Queries are checked at runtime so the crate builds without a live
//! database; every column list matches the row structs in [`super::rows`].

use async_trait::async_trait;
use sqlx::PgPool;
use stackwise_core::{ProductId, SupplementId, UserId};
use tracing::instrument;

use super::rows::{EntryRow, ProductRow, ProfileRow, RegimenRow, SupplementRow};
use super::{RegimenBackend, StoreError, create_pool};
use crate::config::{ConfigError, TrackerConfig};
use crate::models::NewRegimenEntry;

const PRODUCT_COLUMNS: &str = r"
    SELECT p.product_id, p.product_name, p.product_description, p.product_price,
           p.servings_per_container, p.supplement_id,
           b.brand_id, b.brand_name,
           p.product_url, p.amazon_url, p.product_image
    FROM products p
    LEFT JOIN brands b ON b.brand_id = p.brand_id
";

/// Store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the configured database URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no URL is configured and
    /// `StoreError` if the connection cannot be established.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, PgConnectError> {
        let url = config.require_database_url()?;
        let pool = create_pool(url, config.max_connections)
            .await
            .map_err(StoreError::from)?;
        Ok(Self::new(pool))
    }

    /// Run the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError` if a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Errors that can occur while connecting a [`PgStore`].
#[derive(Debug, thiserror::Error)]
pub enum PgConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
impl RegimenBackend for PgStore {
    #[instrument(skip(self))]
    async fn list_supplements(&self) -> Result<Vec<SupplementRow>, StoreError> {
        let rows = sqlx::query_as::<_, SupplementRow>(
            r"
            SELECT supplement_id, supplement_name, supplement_description
            FROM supplements
            ORDER BY supplement_name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(supplement_id = %id))]
    async fn get_supplement(
        &self,
        id: SupplementId,
    ) -> Result<Option<SupplementRow>, StoreError> {
        let row = sqlx::query_as::<_, SupplementRow>(
            r"
            SELECT supplement_id, supplement_name, supplement_description
            FROM supplements
            WHERE supplement_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(supplement_id = %id))]
    async fn products_for_supplement(
        &self,
        id: SupplementId,
    ) -> Result<Vec<ProductRow>, StoreError> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.supplement_id = $1 ORDER BY p.product_name ASC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRow>, StoreError> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.product_id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(user_id = %user, product_id = %product))]
    async fn find_entry(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Option<EntryRow>, StoreError> {
        let row = sqlx::query_as::<_, EntryRow>(
            r"
            SELECT user_id, product_id, servings_per_day, created_at
            FROM users_products
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user)
        .bind(product)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(user_id = %entry.user_id, product_id = %entry.product_id))]
    async fn insert_entry(&self, entry: &NewRegimenEntry) -> Result<EntryRow, StoreError> {
        let row = sqlx::query_as::<_, EntryRow>(
            r"
            INSERT INTO users_products (user_id, product_id, servings_per_day)
            VALUES ($1, $2, $3)
            RETURNING user_id, product_id, servings_per_day, created_at
            ",
        )
        .bind(entry.user_id)
        .bind(entry.product_id)
        .bind(entry.servings_per_day.get())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self), fields(user_id = %user, product_id = %product))]
    async fn delete_entry(&self, user: UserId, product: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            DELETE FROM users_products
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user)
        .bind(product)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn entries_for_user(&self, user: UserId) -> Result<Vec<RegimenRow>, StoreError> {
        let rows = sqlx::query_as::<_, RegimenRow>(
            r"
            SELECT up.product_id, up.servings_per_day, up.created_at,
                   (p.product_id IS NOT NULL) AS product_found,
                   p.product_name, p.product_description, p.product_price,
                   p.servings_per_container,
                   b.brand_name,
                   s.supplement_id, s.supplement_name
            FROM users_products up
            LEFT JOIN products p ON p.product_id = up.product_id
            LEFT JOIN brands b ON b.brand_id = p.brand_id
            LEFT JOIN supplements s ON s.supplement_id = p.supplement_id
            WHERE up.user_id = $1
            ORDER BY up.created_at ASC, up.product_id ASC
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRow>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, date_of_birth, gender, height, weight
            FROM user_profiles
            WHERE id = $1
            ",
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn upsert_profile(&self, profile: &ProfileRow) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (id, date_of_birth, gender, height, weight)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET date_of_birth = EXCLUDED.date_of_birth,
                gender = EXCLUDED.gender,
                height = EXCLUDED.height,
                weight = EXCLUDED.weight,
                updated_at = NOW()
            ",
        )
        .bind(profile.id)
        .bind(profile.date_of_birth)
        .bind(profile.gender.as_deref())
        .bind(profile.height)
        .bind(profile.weight)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
