//! Read-only catalog access.
//!
//! Supplements and per-supplement product lists are cached with `moka`
//! (5-minute TTL by default). Catalog data is owned upstream, so nothing here
//! writes and every read may be retried.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use stackwise_core::{ProductId, SupplementId};
use tracing::{debug, instrument};

use crate::db::{RegimenBackend, StoreError};
use crate::models::{Product, Supplement};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Supplements,
    Products(SupplementId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Supplements(Arc<Vec<Supplement>>),
    Products(Arc<Vec<Product>>),
}

/// Cached reader over the catalog tables.
#[derive(Clone)]
pub struct CatalogReader {
    backend: Arc<dyn RegimenBackend>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogReader {
    /// Create a reader whose cached entries live for `ttl`.
    #[must_use]
    pub fn new(backend: Arc<dyn RegimenBackend>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { backend, cache }
    }

    /// All supplements, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    #[instrument(skip(self))]
    pub async fn supplements(&self) -> Result<Arc<Vec<Supplement>>, StoreError> {
        if let Some(CacheValue::Supplements(list)) = self.cache.get(&CacheKey::Supplements).await {
            debug!("Cache hit for supplements");
            return Ok(list);
        }

        let list: Arc<Vec<Supplement>> = Arc::new(
            self.backend
                .list_supplements()
                .await?
                .into_iter()
                .map(Supplement::from)
                .collect(),
        );

        self.cache
            .insert(CacheKey::Supplements, CacheValue::Supplements(Arc::clone(&list)))
            .await;
        Ok(list)
    }

    /// A single supplement. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend read fails.
    #[instrument(skip(self), fields(supplement_id = %id))]
    pub async fn supplement(&self, id: SupplementId) -> Result<Option<Supplement>, StoreError> {
        Ok(self.backend.get_supplement(id).await?.map(Supplement::from))
    }

    /// Products in a supplement category, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` for invalid product rows and any
    /// backend read error.
    #[instrument(skip(self), fields(supplement_id = %id))]
    pub async fn products(&self, id: SupplementId) -> Result<Arc<Vec<Product>>, StoreError> {
        let key = CacheKey::Products(id);
        if let Some(CacheValue::Products(list)) = self.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(list);
        }

        let list = self
            .backend
            .products_for_supplement(id)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let list = Arc::new(list);

        self.cache
            .insert(key, CacheValue::Products(Arc::clone(&list)))
            .await;
        Ok(list)
    }

    /// A single product with its brand. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` for an invalid product row and any
    /// backend read error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.backend
            .get_product(id)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
