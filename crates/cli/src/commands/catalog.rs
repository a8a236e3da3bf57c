//! Catalog browsing commands.

use stackwise_core::SupplementId;
use stackwise_tracker::catalog::CatalogReader;

use super::{CliError, Context};

/// List supplement categories.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub async fn supplements(ctx: &Context) -> Result<(), CliError> {
    let catalog = CatalogReader::new(ctx.store().await?, ctx.config.catalog_cache_ttl);
    let supplements = catalog.supplements().await?;

    #[allow(clippy::print_stdout)]
    {
        if supplements.is_empty() {
            println!("No supplements in the catalog.");
        }
        for supplement in supplements.iter() {
            println!("{:>5}  {}", supplement.id, supplement.name);
            if !supplement.description.is_empty() {
                println!("       {}", supplement.description);
            }
        }
    }
    Ok(())
}

/// List products in one supplement category.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub async fn products(ctx: &Context, supplement_id: SupplementId) -> Result<(), CliError> {
    let catalog = CatalogReader::new(ctx.store().await?, ctx.config.catalog_cache_ttl);
    let Some(supplement) = catalog.supplement(supplement_id).await? else {
        return Err(stackwise_tracker::TrackerError::InvalidInput(format!(
            "Supplement {supplement_id} not found"
        ))
        .into());
    };
    let products = catalog.products(supplement_id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", supplement.name);
        for product in products.iter() {
            let brand = product.brand.as_ref().map_or("", |b| b.name.as_str());
            let servings = product
                .servings_per_container
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            println!(
                "{:>5}  {:<32} {:<20} {:>9}  {servings} servings",
                product.id, product.name, brand, product.price
            );
            if let Some(url) = product.product_url.as_ref().or(product.amazon_url.as_ref()) {
                println!("       {url}");
            }
        }
    }
    Ok(())
}
