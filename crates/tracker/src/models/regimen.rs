//! Regimen membership types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use stackwise_core::{Price, ProductId, ServingsPerDay, SupplementId, UserId};

use crate::db::StoreError;
use crate::db::rows::{EntryRow, RegimenRow};

/// One (user, product) membership record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimenEntry {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub servings_per_day: ServingsPerDay,
    pub created_at: DateTime<Utc>,
}

impl RegimenEntry {
    /// Convert a stored row, applying `default_servings` when the dose is unset.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the stored dose is not positive.
    pub fn from_row(row: EntryRow, default_servings: ServingsPerDay) -> Result<Self, StoreError> {
        let servings_per_day = match row.servings_per_day {
            Some(value) => ServingsPerDay::new(value).map_err(|e| {
                StoreError::DataCorruption(format!(
                    "entry ({}, {}): {e}",
                    row.user_id, row.product_id
                ))
            })?,
            None => default_servings,
        };
        Ok(Self {
            user_id: row.user_id,
            product_id: row.product_id,
            servings_per_day,
            created_at: row.created_at,
        })
    }
}

/// Values for a membership insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRegimenEntry {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub servings_per_day: ServingsPerDay,
}

/// A regimen entry resolved against the catalog, ready for aggregation.
///
/// Missing nested fields are defaulted here: names become empty strings and a
/// missing price becomes zero. `servings_per_container` stays optional so the
/// cost aggregator can flag it instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimenItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_description: String,
    pub price: Price,
    pub servings_per_container: Option<i32>,
    pub servings_per_day: ServingsPerDay,
    pub brand_name: String,
    pub supplement_id: Option<SupplementId>,
    pub supplement_name: String,
    pub added_at: DateTime<Utc>,
}

impl RegimenItem {
    /// Resolve a joined row. Returns `None` when the product no longer exists.
    #[must_use]
    pub fn from_row(row: RegimenRow, default_servings: ServingsPerDay) -> Option<Self> {
        if !row.product_found {
            return None;
        }

        let price = row
            .product_price
            .and_then(|amount| Price::new(amount).ok())
            .unwrap_or(Price::ZERO);
        let servings_per_day = row
            .servings_per_day
            .and_then(|value| ServingsPerDay::new(value).ok())
            .unwrap_or(default_servings);

        Some(Self {
            product_id: row.product_id,
            product_name: row.product_name.unwrap_or_default(),
            product_description: row.product_description.unwrap_or_default(),
            price,
            servings_per_container: row.servings_per_container,
            servings_per_day,
            brand_name: row.brand_name.unwrap_or_default(),
            supplement_id: row.supplement_id,
            supplement_name: row.supplement_name.unwrap_or_default(),
            added_at: row.created_at,
        })
    }
}
