//! Stackwise CLI - manage a supplement regimen from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! stackwise migrate
//!
//! # Browse the catalog
//! stackwise catalog supplements
//! stackwise catalog products 3
//!
//! # Manage your stack
//! stackwise stack add 12 --servings 2
//! stackwise stack list
//! stackwise stack remove 12
//!
//! # Profile
//! stackwise profile show --json
//! stackwise profile set --feet 5 --inches 10 --weight-lbs 165
//! ```
//!
//! The signed-in user is read from `STACKWISE_USER_ID` (plus optional
//! `STACKWISE_USER_EMAIL`, `STACKWISE_USER_NAME`, `STACKWISE_USER_AVATAR`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use stackwise_core::{Gender, ProductId, SupplementId};
use stackwise_tracker::config::TrackerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "stackwise")]
#[command(author, version, about = "Track your supplement stack and what it costs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage your regimen
    Stack {
        #[command(subcommand)]
        action: StackAction,
    },
    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List supplement categories
    Supplements,
    /// List products in a supplement category
    Products {
        /// Supplement ID
        supplement_id: SupplementId,
    },
}

#[derive(Subcommand)]
enum StackAction {
    /// Add a product to your regimen
    Add {
        /// Product ID
        product_id: ProductId,

        /// Servings per day (defaults to `STACKWISE_DEFAULT_SERVINGS_PER_DAY`)
        #[arg(short, long)]
        servings: Option<String>,
    },
    /// List your regimen with costs
    List,
    /// Remove a product from your regimen
    Remove {
        /// Product ID
        product_id: ProductId,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile, regimen summary and demographics
    Show {
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update demographics
    Set {
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<NaiveDate>,

        /// Gender (`male`, `female`, `other`)
        #[arg(long)]
        gender: Option<Gender>,

        /// Height, feet component
        #[arg(long)]
        feet: Option<u32>,

        /// Height, inches component (0-11)
        #[arg(long)]
        inches: Option<u32>,

        /// Weight in pounds
        #[arg(long)]
        weight_lbs: Option<Decimal>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &TrackerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stackwise_tracker=info,stackwise_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: TrackerConfig) -> Result<(), CliError> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&ctx).await?,
        Commands::Catalog { action } => match action {
            CatalogAction::Supplements => commands::catalog::supplements(&ctx).await?,
            CatalogAction::Products { supplement_id } => {
                commands::catalog::products(&ctx, supplement_id).await?;
            }
        },
        Commands::Stack { action } => match action {
            StackAction::Add {
                product_id,
                servings,
            } => commands::stack::add(&ctx, product_id, servings.as_deref()).await?,
            StackAction::List => commands::stack::list(&ctx).await?,
            StackAction::Remove { product_id } => {
                commands::stack::remove(&ctx, product_id).await?;
            }
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show { json } => commands::profile::show(&ctx, json).await?,
            ProfileAction::Set {
                dob,
                gender,
                feet,
                inches,
                weight_lbs,
            } => {
                let update = stackwise_tracker::profile::ProfileUpdate {
                    date_of_birth: dob,
                    gender,
                    feet,
                    inches,
                    weight_lbs,
                };
                commands::profile::set(&ctx, update).await?;
            }
        },
    }
    Ok(())
}
