//! Integration tests for Stackwise.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p stackwise-integration-tests
//!
//! # Include the PostgreSQL tests
//! STACKWISE_TEST_DATABASE_URL=postgres://localhost/stackwise_test \
//!     cargo test -p stackwise-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `regimen_membership` - At-most-one membership, including racing adds
//! - `cost_summary` - Cost formula, flagged entries, distinct counting
//! - `profile_view` - View assembly and unit conversion
//! - `postgres_store` - The same contracts against a real database

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::SecretString;
use stackwise_core::{ProductId, ServingsPerDay, SupplementId};
use stackwise_tracker::db::{MemoryStore, PgStore, create_pool};
use stackwise_tracker::profile::ProfileAssembler;
use stackwise_tracker::regimen::RegimenStore;

/// Environment variable holding the test database URL.
pub const TEST_DATABASE_URL: &str = "STACKWISE_TEST_DATABASE_URL";

/// Services wired over an in-process store with a small catalog.
pub struct MemoryContext {
    pub store: Arc<MemoryStore>,
    pub regimen: RegimenStore,
    pub profiles: ProfileAssembler,
    pub omega3: SupplementId,
    pub creatine: SupplementId,
    /// Omega-3, $30.00, 60 servings.
    pub fish_oil: ProductId,
    /// Omega-3 from a second brand, $45.00, 90 servings.
    pub algae_oil: ProductId,
    /// Creatine, $25.00, 0 servings per container.
    pub creatine_broken: ProductId,
}

impl MemoryContext {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let nordic = store.add_brand("Nordic Naturals");
        let ovega = store.add_brand("Ovega");

        let omega3 = store.add_supplement("Omega-3", "Fatty acids");
        let creatine = store.add_supplement("Creatine", "Strength");

        let fish_oil =
            store.add_product("Fish Oil", omega3, Some(nordic), Decimal::new(30, 0), Some(60));
        let algae_oil =
            store.add_product("Algae Oil", omega3, Some(ovega), Decimal::new(45, 0), Some(90));
        let creatine_broken =
            store.add_product("Creatine Tub", creatine, None, Decimal::new(25, 0), Some(0));

        let regimen = RegimenStore::new(store.clone(), ServingsPerDay::default());
        let profiles = ProfileAssembler::new(regimen.clone(), store.clone());

        Self {
            store,
            regimen,
            profiles,
            omega3,
            creatine,
            fish_oil,
            algae_oil,
            creatine_broken,
        }
    }
}

impl Default for MemoryContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Services wired over a migrated test database.
pub struct PgContext {
    pub store: Arc<PgStore>,
    pub regimen: RegimenStore,
    pub profiles: ProfileAssembler,
}

impl PgContext {
    /// Connect to `STACKWISE_TEST_DATABASE_URL` and apply migrations.
    ///
    /// # Panics
    ///
    /// Panics if the variable is unset or the database is unreachable.
    pub async fn connect() -> Self {
        let url = std::env::var(TEST_DATABASE_URL)
            .unwrap_or_else(|_| panic!("{TEST_DATABASE_URL} must be set"));
        let pool = create_pool(&SecretString::from(url), 5)
            .await
            .expect("Failed to connect to test database");

        let store = Arc::new(PgStore::new(pool));
        store.migrate().await.expect("Failed to run migrations");

        let regimen = RegimenStore::new(store.clone(), ServingsPerDay::default());
        let profiles = ProfileAssembler::new(regimen.clone(), store.clone());
        Self {
            store,
            regimen,
            profiles,
        }
    }

    /// Insert a supplement category and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn insert_supplement(&self, name: &str) -> SupplementId {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO supplements (supplement_name) VALUES ($1) RETURNING supplement_id",
        )
        .bind(name)
        .fetch_one(self.store.pool())
        .await
        .expect("Failed to insert supplement");
        SupplementId::new(id)
    }

    /// Insert a product and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn insert_product(
        &self,
        name: &str,
        supplement: SupplementId,
        price: Decimal,
        servings_per_container: Option<i32>,
    ) -> ProductId {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (product_name, product_price, servings_per_container, supplement_id)
            VALUES ($1, $2, $3, $4)
            RETURNING product_id
            ",
        )
        .bind(name)
        .bind(price)
        .bind(servings_per_container)
        .bind(supplement)
        .fetch_one(self.store.pool())
        .await
        .expect("Failed to insert product");
        ProductId::new(id)
    }
}
