//! Regimen commands.

use stackwise_core::ProductId;
use stackwise_tracker::TrackerError;
use stackwise_tracker::catalog::CatalogReader;
use stackwise_tracker::cost;
use stackwise_tracker::membership::RegisterOutcome;
use stackwise_tracker::regimen::RemoveOutcome;

use super::{CliError, Context};

/// Add a product to the signed-in user's regimen.
///
/// # Errors
///
/// Returns an error for unknown products, invalid servings input and
/// storage failures.
pub async fn add(
    ctx: &Context,
    product_id: ProductId,
    servings: Option<&str>,
) -> Result<(), CliError> {
    let user = ctx.user().await?;
    let store = ctx.store().await?;

    let catalog = CatalogReader::new(store.clone(), ctx.config.catalog_cache_ttl);
    let product = catalog
        .product(product_id)
        .await?
        .ok_or_else(|| TrackerError::InvalidInput(format!("Product {product_id} not found")))?;

    let regimen = ctx.regimen(store);
    let outcome = match servings {
        Some(input) => regimen.add_entry_from_input(user.id, product_id, input).await?,
        None => regimen.add_entry(user.id, product_id, None).await?,
    };

    #[allow(clippy::print_stdout)]
    {
        match outcome {
            RegisterOutcome::Accepted(entry) => println!(
                "Added {} ({} per day) to your stack.",
                product.name, entry.servings_per_day
            ),
            RegisterOutcome::AlreadyExists => {
                println!("{} is already in your stack.", product.name);
            }
            RegisterOutcome::Denied { reason } => {
                println!("Could not add {}: {reason}", product.name);
            }
        }
    }
    Ok(())
}

/// Print the regimen with per-entry and total monthly cost.
///
/// # Errors
///
/// Returns an error if the regimen cannot be read.
pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.user().await?;
    let regimen = ctx.regimen(ctx.store().await?);

    let items = regimen.list_entries(user.id).await?;
    let summary = cost::aggregate(&items);

    #[allow(clippy::print_stdout)]
    {
        if items.is_empty() {
            println!("Your stack is empty.");
            return Ok(());
        }
        for (item, line) in items.iter().zip(&summary.lines) {
            let monthly = line
                .monthly_cost
                .map_or_else(|| "n/a".to_string(), |c| format!("${:.2}", c.round_dp(2)));
            println!(
                "{:>5}  {:<32} {:<20} {:<20} {:>5}/day {:>10}/mo",
                item.product_id,
                item.product_name,
                item.brand_name,
                item.supplement_name,
                item.servings_per_day,
                monthly
            );
        }
        println!();
        println!("Supplements:  {}", summary.distinct_supplement_count);
        println!("Monthly cost: {}", summary.monthly_cost_display());
        for (product_id, flag) in summary.flagged() {
            println!("Excluded from cost: product {product_id} ({flag:?})");
        }
    }
    Ok(())
}

/// Remove a product from the signed-in user's regimen.
///
/// # Errors
///
/// Returns an error if the delete fails for reasons other than a denial.
pub async fn remove(ctx: &Context, product_id: ProductId) -> Result<(), CliError> {
    let user = ctx.user().await?;
    let regimen = ctx.regimen(ctx.store().await?);

    let outcome = regimen.remove_entry(user.id, product_id).await?;

    #[allow(clippy::print_stdout)]
    {
        match outcome {
            RemoveOutcome::Removed => println!("Removed product {product_id} from your stack."),
            RemoveOutcome::NotFound => println!("Product {product_id} is not in your stack."),
            RemoveOutcome::Denied { reason } => {
                println!("Could not remove product {product_id}: {reason}");
            }
        }
    }
    Ok(())
}
