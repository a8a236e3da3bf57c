//! Profile commands.

use std::sync::Arc;

use stackwise_tracker::db::PgStore;
use stackwise_tracker::profile::{ProfileAssembler, ProfileUpdate, ProfileView};

use super::{CliError, Context};

fn assembler(ctx: &Context, store: Arc<PgStore>) -> ProfileAssembler {
    ProfileAssembler::new(ctx.regimen(Arc::clone(&store)), store)
}

/// Show the profile view.
///
/// # Errors
///
/// Returns an error if the regimen or profile cannot be read.
pub async fn show(ctx: &Context, json: bool) -> Result<(), CliError> {
    let user = ctx.user().await?;
    let view = assembler(ctx, ctx.store().await?)
        .build_profile_view(&user)
        .await?;

    if json {
        #[allow(clippy::print_stdout)]
        {
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    } else {
        print_view(&view);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_view(view: &ProfileView) {
    println!("{}", view.user.display_name);
    if let Some(email) = &view.user.email {
        println!("{email}");
    }
    println!();
    println!("Supplements:  {}", view.distinct_supplement_count);
    println!("Products:     {}", view.entries.len());
    println!("Monthly cost: {}", view.monthly_cost_display());
    println!();

    let demographics = &view.demographics;
    let unset = || "-".to_string();
    println!(
        "Date of birth: {}",
        demographics.date_of_birth.map_or_else(unset, |d| d.to_string())
    );
    println!(
        "Gender:        {}",
        demographics.gender.map_or_else(unset, |g| g.to_string())
    );
    println!(
        "Height:        {}",
        demographics.height.map_or_else(unset, |h| h.to_string())
    );
    println!(
        "Weight:        {}",
        demographics.weight.map_or_else(unset, |w| w.to_string())
    );
}

/// Apply demographic edits.
///
/// # Errors
///
/// Returns an error for invalid measurements or if the upsert fails.
pub async fn set(ctx: &Context, update: ProfileUpdate) -> Result<(), CliError> {
    let user = ctx.user().await?;
    let profile = assembler(ctx, ctx.store().await?)
        .update_profile(&user, update)
        .await?;

    tracing::debug!(?profile, "Saved profile");
    #[allow(clippy::print_stdout)]
    {
        println!("Profile updated.");
    }
    Ok(())
}
