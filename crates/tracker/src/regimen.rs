//! Regimen store: add, list and remove a user's entries.

use std::sync::Arc;

use serde::Serialize;
use stackwise_core::{ProductId, ServingsPerDay, UserId};
use tracing::{info, instrument, warn};

use crate::db::{RegimenBackend, StoreError};
use crate::error::TrackerError;
use crate::membership::{MembershipGuard, RegisterOutcome};
use crate::models::{NewRegimenEntry, RegimenItem};

/// Outcome of removing an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    NotFound,
    Denied { reason: String },
}

/// Owns create/read/delete of the user-product relation.
#[derive(Clone)]
pub struct RegimenStore {
    backend: Arc<dyn RegimenBackend>,
    guard: MembershipGuard,
    default_servings: ServingsPerDay,
}

impl RegimenStore {
    #[must_use]
    pub fn new(backend: Arc<dyn RegimenBackend>, default_servings: ServingsPerDay) -> Self {
        Self {
            guard: MembershipGuard::new(Arc::clone(&backend)),
            backend,
            default_servings,
        }
    }

    /// Add `product` to the user's regimen.
    ///
    /// Uses the configured default dose when `servings_per_day` is `None`.
    /// Adding a product twice is a no-op reported as
    /// `RegisterOutcome::AlreadyExists`.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` when the product is not in the
    /// catalog and `TrackerError::Store` for connectivity or other system
    /// failures.
    pub async fn add_entry(
        &self,
        user: UserId,
        product: ProductId,
        servings_per_day: Option<ServingsPerDay>,
    ) -> Result<RegisterOutcome, TrackerError> {
        let entry = NewRegimenEntry {
            user_id: user,
            product_id: product,
            servings_per_day: servings_per_day.unwrap_or(self.default_servings),
        };
        match self.guard.try_register(&entry).await {
            Ok(outcome) => Ok(outcome),
            Err(StoreError::MissingReference(_)) => Err(TrackerError::InvalidInput(format!(
                "product {product} does not exist"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Add `product` using the dose exactly as the user typed it.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` for blank, non-numeric or
    /// non-positive input (nothing is written), and `TrackerError::Store` for
    /// system failures.
    pub async fn add_entry_from_input(
        &self,
        user: UserId,
        product: ProductId,
        servings_input: &str,
    ) -> Result<RegisterOutcome, TrackerError> {
        let servings = ServingsPerDay::parse(servings_input)?;
        self.add_entry(user, product, Some(servings)).await
    }

    /// The user's entries resolved against the catalog, oldest first.
    ///
    /// Entries whose product no longer exists are skipped.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Store` if the read fails.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn list_entries(&self, user: UserId) -> Result<Vec<RegimenItem>, TrackerError> {
        let rows = self.backend.entries_for_user(user).await?;
        let total = rows.len();

        let items: Vec<RegimenItem> = rows
            .into_iter()
            .filter_map(|row| {
                let product_id = row.product_id;
                let item = RegimenItem::from_row(row, self.default_servings);
                if item.is_none() {
                    warn!(%product_id, "Skipping entry for deleted product");
                }
                item
            })
            .collect();

        if items.len() < total {
            warn!(skipped = total - items.len(), "Regimen has dangling entries");
        }
        Ok(items)
    }

    /// Remove `product` from the user's regimen.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Store` for connectivity or other system failures.
    #[instrument(skip(self), fields(user_id = %user, product_id = %product))]
    pub async fn remove_entry(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<RemoveOutcome, TrackerError> {
        match self.backend.delete_entry(user, product).await {
            Ok(true) => {
                info!("Entry removed");
                Ok(RemoveOutcome::Removed)
            }
            Ok(false) => Ok(RemoveOutcome::NotFound),
            Err(StoreError::PermissionDenied(reason)) => {
                warn!(%reason, "Entry delete denied");
                Ok(RemoveOutcome::Denied { reason })
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, RegimenStore, ProductId, ProductId) {
        let store = Arc::new(MemoryStore::new());
        let supplement = store.add_supplement("Vitamin D", "Sunshine");
        let first = store.add_product("D3 1000", supplement, None, Decimal::new(12, 0), Some(120));
        let second = store.add_product("D3 5000", supplement, None, Decimal::new(15, 0), Some(90));
        let regimen = RegimenStore::new(store.clone(), ServingsPerDay::default());
        (store, regimen, first, second)
    }

    #[tokio::test]
    async fn test_default_servings_applied() {
        let (_, regimen, product, _) = setup();
        let outcome = regimen
            .add_entry(UserId::random(), product, None)
            .await
            .unwrap();
        let RegisterOutcome::Accepted(entry) = &outcome else {
            panic!("expected Accepted, got {outcome:?}");
        };
        assert_eq!(entry.servings_per_day, ServingsPerDay::default());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_write() {
        let (store, regimen, product, _) = setup();
        let user = UserId::random();

        for input in ["", "two", "0", "-3", "101", "79228162514264337593543950335"] {
            let err = regimen
                .add_entry_from_input(user, product, input)
                .await
                .unwrap_err();
            assert!(matches!(err, TrackerError::InvalidInput(_)), "{input:?}");
        }
        assert_eq!(store.entry_count(user), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_invalid_input() {
        let (store, regimen, _, _) = setup();
        let user = UserId::random();

        let err = regimen
            .add_entry(user, ProductId::new(9_999), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput(_)));
        assert!(!err.is_system());
        assert_eq!(store.entry_count(user), 0);
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let (_, regimen, first, second) = setup();
        let user = UserId::random();
        regimen.add_entry(user, second, None).await.unwrap();
        regimen.add_entry(user, first, None).await.unwrap();

        let ids: Vec<ProductId> = regimen
            .list_entries(user)
            .await
            .unwrap()
            .iter()
            .map(|i| i.product_id)
            .collect();
        assert_eq!(ids, [second, first]);
    }

    #[tokio::test]
    async fn test_list_skips_deleted_products() {
        let (store, regimen, first, second) = setup();
        let user = UserId::random();
        regimen.add_entry(user, first, None).await.unwrap();
        regimen.add_entry(user, second, None).await.unwrap();
        store.remove_product(first);

        let items = regimen.list_entries(user).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, second);
        assert_eq!(items[0].supplement_name, "Vitamin D");
    }

    #[tokio::test]
    async fn test_remove_entry() {
        let (store, regimen, product, _) = setup();
        let user = UserId::random();
        regimen.add_entry(user, product, None).await.unwrap();

        assert_eq!(
            regimen.remove_entry(user, product).await.unwrap(),
            RemoveOutcome::Removed
        );
        assert_eq!(
            regimen.remove_entry(user, product).await.unwrap(),
            RemoveOutcome::NotFound
        );
        assert_eq!(store.entry_count(user), 0);

        // Re-adding after removal creates a fresh entry.
        let outcome = regimen.add_entry(user, product, None).await.unwrap();
        assert!(matches!(outcome, RegisterOutcome::Accepted(_)));
    }

    #[tokio::test]
    async fn test_remove_denied() {
        let (store, regimen, product, _) = setup();
        let user = UserId::random();
        regimen.add_entry(user, product, None).await.unwrap();
        store.deny_writes_for(user);

        let outcome = regimen.remove_entry(user, product).await.unwrap();
        assert!(matches!(outcome, RemoveOutcome::Denied { .. }));
        assert_eq!(store.entry_count(user), 1);
    }
}
