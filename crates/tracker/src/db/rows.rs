//! Row types returned by [`RegimenBackend`](super::RegimenBackend).
//!
//! Rows mirror the table shapes, including every column a join may leave
//! empty. Conversion into validated domain types lives in [`crate::models`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use stackwise_core::{BrandId, ProductId, SupplementId, UserId};

/// A `supplements` row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SupplementRow {
    pub supplement_id: SupplementId,
    pub supplement_name: String,
    pub supplement_description: Option<String>,
}

/// A `products` row with its brand left-joined.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_description: Option<String>,
    pub product_price: Decimal,
    pub servings_per_container: Option<i32>,
    pub supplement_id: SupplementId,
    pub brand_id: Option<BrandId>,
    pub brand_name: Option<String>,
    pub product_url: Option<String>,
    pub amazon_url: Option<String>,
    pub product_image: Option<String>,
}

/// A `users_products` row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EntryRow {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub servings_per_day: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// A `users_products` row left-joined with product, brand and supplement.
///
/// `product_found` is false when the referenced product no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RegimenRow {
    pub product_id: ProductId,
    pub servings_per_day: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub product_found: bool,
    pub product_name: Option<String>,
    pub product_description: Option<String>,
    pub product_price: Option<Decimal>,
    pub servings_per_container: Option<i32>,
    pub brand_name: Option<String>,
    pub supplement_id: Option<SupplementId>,
    pub supplement_name: Option<String>,
}

/// A `user_profiles` row. Height is centimeters, weight kilograms.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: UserId,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height: Option<Decimal>,
    pub weight: Option<Decimal>,
}
