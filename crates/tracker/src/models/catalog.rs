//! Catalog domain types.
//!
//! Catalog data is owned upstream; the tracker only reads it.

use serde::Serialize;
use stackwise_core::{BrandId, Price, ProductId, SupplementId};
use url::Url;

use crate::db::StoreError;
use crate::db::rows::{ProductRow, SupplementRow};

/// A product maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
}

/// A supplement category grouping products (e.g. "Creatine").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Supplement {
    pub id: SupplementId,
    pub name: String,
    pub description: String,
}

impl From<SupplementRow> for Supplement {
    fn from(row: SupplementRow) -> Self {
        Self {
            id: row.supplement_id,
            name: row.supplement_name,
            description: row.supplement_description.unwrap_or_default(),
        }
    }
}

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Doses in one container. `None` when the catalog has no value.
    pub servings_per_container: Option<i32>,
    pub supplement_id: SupplementId,
    pub brand: Option<Brand>,
    pub product_url: Option<Url>,
    pub amazon_url: Option<Url>,
    pub image: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.product_price).map_err(|e| {
            StoreError::DataCorruption(format!("product {}: {e}", row.product_id))
        })?;

        let brand = match (row.brand_id, row.brand_name) {
            (Some(id), Some(name)) => Some(Brand { id, name }),
            _ => None,
        };

        Ok(Self {
            id: row.product_id,
            name: row.product_name,
            description: row.product_description.unwrap_or_default(),
            price,
            servings_per_container: row.servings_per_container,
            supplement_id: row.supplement_id,
            brand,
            product_url: parse_link(row.product_id, "product_url", row.product_url),
            amazon_url: parse_link(row.product_id, "amazon_url", row.amazon_url),
            image: row.product_image.filter(|s| !s.is_empty()),
        })
    }
}

/// Parse an optional purchase link, dropping values that are not URLs.
fn parse_link(product: ProductId, field: &str, raw: Option<String>) -> Option<Url> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    match Url::parse(raw.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(product_id = %product, field, error = %e, "Ignoring malformed link");
            None
        }
    }
}
