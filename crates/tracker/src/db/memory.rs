//! In-process implementation of [`RegimenBackend`].
//!
//! Enforces the same `(user_id, product_id)` uniqueness as the `PostgreSQL`
//! schema and can simulate the failure modes the tracker has to handle:
//! per-user write denial, stale membership reads, upstream product deletion
//! and a dropped connection.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use stackwise_core::{BrandId, ProductId, SupplementId, UserId};

use super::rows::{EntryRow, ProductRow, ProfileRow, RegimenRow, SupplementRow};
use super::{RegimenBackend, StoreError};
use crate::models::NewRegimenEntry;

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    brands: BTreeMap<BrandId, String>,
    supplements: BTreeMap<SupplementId, SupplementRow>,
    products: BTreeMap<ProductId, ProductRow>,
    /// Membership rows in insertion order.
    entries: Vec<EntryRow>,
    profiles: HashMap<UserId, ProfileRow>,
    denied_writers: HashSet<UserId>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve_brand(&self, mut row: ProductRow) -> ProductRow {
        row.brand_name = row.brand_id.and_then(|id| self.brands.get(&id).cloned());
        row
    }

    fn check_write(&self, user: UserId) -> Result<(), StoreError> {
        if self.denied_writers.contains(&user) {
            return Err(StoreError::PermissionDenied(format!(
                "user {user} may not write this relation"
            )));
        }
        Ok(())
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    stale_reads: AtomicBool,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connectivity("store is offline".to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Catalog seeding
    // =========================================================================

    /// Add a brand and return its ID.
    pub fn add_brand(&self, name: &str) -> BrandId {
        let mut state = self.lock();
        let id = BrandId::new(state.next_id());
        state.brands.insert(id, name.to_owned());
        id
    }

    /// Add a supplement category and return its ID.
    pub fn add_supplement(&self, name: &str, description: &str) -> SupplementId {
        let mut state = self.lock();
        let id = SupplementId::new(state.next_id());
        state.supplements.insert(
            id,
            SupplementRow {
                supplement_id: id,
                supplement_name: name.to_owned(),
                supplement_description: Some(description.to_owned()),
            },
        );
        id
    }

    /// Add a product and return its ID.
    pub fn add_product(
        &self,
        name: &str,
        supplement: SupplementId,
        brand: Option<BrandId>,
        price: Decimal,
        servings_per_container: Option<i32>,
    ) -> ProductId {
        let mut state = self.lock();
        let id = ProductId::new(state.next_id());
        state.products.insert(
            id,
            ProductRow {
                product_id: id,
                product_name: name.to_owned(),
                product_description: None,
                product_price: price,
                servings_per_container,
                supplement_id: supplement,
                brand_id: brand,
                brand_name: None,
                product_url: None,
                amazon_url: None,
                product_image: None,
            },
        );
        id
    }

    /// Remove a product from the catalog without touching regimen entries,
    /// as an upstream deletion would.
    pub fn remove_product(&self, id: ProductId) -> bool {
        self.lock().products.remove(&id).is_some()
    }

    // =========================================================================
    // Failure simulation
    // =========================================================================

    /// Reject every write made on behalf of `user`.
    pub fn deny_writes_for(&self, user: UserId) {
        self.lock().denied_writers.insert(user);
    }

    /// When enabled, `find_entry` never sees existing rows, as a lookup that
    /// raced a concurrent insert would.
    pub fn set_stale_reads(&self, enabled: bool) {
        self.stale_reads.store(enabled, Ordering::SeqCst);
    }

    /// When enabled, every operation fails with `StoreError::Connectivity`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of membership rows stored for `user`.
    #[must_use]
    pub fn entry_count(&self, user: UserId) -> usize {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.user_id == user)
            .count()
    }
}

#[async_trait]
impl RegimenBackend for MemoryStore {
    async fn list_supplements(&self) -> Result<Vec<SupplementRow>, StoreError> {
        self.ensure_online()?;
        let mut rows: Vec<SupplementRow> = self.lock().supplements.values().cloned().collect();
        rows.sort_by(|a, b| a.supplement_name.cmp(&b.supplement_name));
        Ok(rows)
    }

    async fn get_supplement(
        &self,
        id: SupplementId,
    ) -> Result<Option<SupplementRow>, StoreError> {
        self.ensure_online()?;
        Ok(self.lock().supplements.get(&id).cloned())
    }

    async fn products_for_supplement(
        &self,
        id: SupplementId,
    ) -> Result<Vec<ProductRow>, StoreError> {
        self.ensure_online()?;
        let state = self.lock();
        let mut rows: Vec<ProductRow> = state
            .products
            .values()
            .filter(|p| p.supplement_id == id)
            .map(|p| state.resolve_brand(p.clone()))
            .collect();
        rows.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        Ok(rows)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRow>, StoreError> {
        self.ensure_online()?;
        let state = self.lock();
        Ok(state.products.get(&id).map(|p| state.resolve_brand(p.clone())))
    }

    async fn find_entry(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Option<EntryRow>, StoreError> {
        self.ensure_online()?;
        if self.stale_reads.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .lock()
            .entries
            .iter()
            .find(|e| e.user_id == user && e.product_id == product)
            .cloned())
    }

    async fn insert_entry(&self, entry: &NewRegimenEntry) -> Result<EntryRow, StoreError> {
        self.ensure_online()?;
        let mut state = self.lock();
        state.check_write(entry.user_id)?;

        if !state.products.contains_key(&entry.product_id) {
            return Err(StoreError::MissingReference(format!(
                "product {} is not in the catalog",
                entry.product_id
            )));
        }

        if state
            .entries
            .iter()
            .any(|e| e.user_id == entry.user_id && e.product_id == entry.product_id)
        {
            return Err(StoreError::ConstraintViolation(format!(
                "duplicate key (user_id, product_id)=({}, {})",
                entry.user_id, entry.product_id
            )));
        }

        let row = EntryRow {
            user_id: entry.user_id,
            product_id: entry.product_id,
            servings_per_day: Some(entry.servings_per_day.get()),
            created_at: Utc::now(),
        };
        state.entries.push(row.clone());
        Ok(row)
    }

    async fn delete_entry(&self, user: UserId, product: ProductId) -> Result<bool, StoreError> {
        self.ensure_online()?;
        let mut state = self.lock();
        state.check_write(user)?;
        let before = state.entries.len();
        state
            .entries
            .retain(|e| !(e.user_id == user && e.product_id == product));
        Ok(state.entries.len() < before)
    }

    async fn entries_for_user(&self, user: UserId) -> Result<Vec<RegimenRow>, StoreError> {
        self.ensure_online()?;
        let state = self.lock();
        let rows = state
            .entries
            .iter()
            .filter(|e| e.user_id == user)
            .map(|e| {
                let product = state.products.get(&e.product_id);
                let supplement =
                    product.and_then(|p| state.supplements.get(&p.supplement_id));
                RegimenRow {
                    product_id: e.product_id,
                    servings_per_day: e.servings_per_day,
                    created_at: e.created_at,
                    product_found: product.is_some(),
                    product_name: product.map(|p| p.product_name.clone()),
                    product_description: product.and_then(|p| p.product_description.clone()),
                    product_price: product.map(|p| p.product_price),
                    servings_per_container: product.and_then(|p| p.servings_per_container),
                    brand_name: product
                        .and_then(|p| p.brand_id)
                        .and_then(|id| state.brands.get(&id).cloned()),
                    supplement_id: supplement.map(|s| s.supplement_id),
                    supplement_name: supplement.map(|s| s.supplement_name.clone()),
                }
            })
            .collect();
        Ok(rows)
    }

    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRow>, StoreError> {
        self.ensure_online()?;
        Ok(self.lock().profiles.get(&user).cloned())
    }

    async fn upsert_profile(&self, profile: &ProfileRow) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut state = self.lock();
        state.check_write(profile.id)?;
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stackwise_core::ServingsPerDay;

    use super::*;

    fn new_entry(user: UserId, product: ProductId) -> NewRegimenEntry {
        NewRegimenEntry {
            user_id: user,
            product_id: product,
            servings_per_day: ServingsPerDay::default(),
        }
    }

    fn store_with_product() -> (MemoryStore, ProductId) {
        let store = MemoryStore::new();
        let supplement = store.add_supplement("Zinc", "Mineral");
        let product = store.add_product("Zinc 50", supplement, None, Decimal::new(10, 0), Some(100));
        (store, product)
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_constraint_violation() {
        let (store, product) = store_with_product();
        let user = UserId::random();

        store.insert_entry(&new_entry(user, product)).await.unwrap();
        let err = store.insert_entry(&new_entry(user, product)).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert_eq!(store.entry_count(user), 1);
    }

    #[tokio::test]
    async fn test_denied_writer() {
        let (store, product) = store_with_product();
        let user = UserId::random();
        store.deny_writes_for(user);

        let err = store
            .insert_entry(&new_entry(user, product))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_unknown_product_is_missing_reference() {
        let (store, _) = store_with_product();
        let user = UserId::random();

        let err = store
            .insert_entry(&new_entry(user, ProductId::new(404)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
        assert_eq!(store.entry_count(user), 0);
    }

    #[tokio::test]
    async fn test_offline_store() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.list_supplements().await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_catalog_ordering_and_brand_join() {
        let store = MemoryStore::new();
        let brand = store.add_brand("Acme");
        let zinc = store.add_supplement("Zinc", "Mineral");
        let creatine = store.add_supplement("Creatine", "Performance");
        store.add_product("Zinc 50", zinc, Some(brand), Decimal::new(10, 0), Some(100));
        store.add_product("Zinc 25", zinc, None, Decimal::new(8, 0), Some(100));

        let names: Vec<String> = store
            .list_supplements()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.supplement_name)
            .collect();
        assert_eq!(names, ["Creatine", "Zinc"]);

        let products = store.products_for_supplement(zinc).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].product_name, "Zinc 25");
        assert_eq!(products[1].brand_name.as_deref(), Some("Acme"));
        assert!(store.products_for_supplement(creatine).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removed_product_leaves_dangling_entry() {
        let store = MemoryStore::new();
        let user = UserId::random();
        let supplement = store.add_supplement("Magnesium", "");
        let product = store.add_product("Mag", supplement, None, Decimal::ONE, Some(30));
        store.insert_entry(&new_entry(user, product)).await.unwrap();

        assert!(store.remove_product(product));
        let rows = store.entries_for_user(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].product_found);
        assert!(rows[0].supplement_id.is_none());
    }
}
