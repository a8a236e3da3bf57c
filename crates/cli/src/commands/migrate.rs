//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! stackwise migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STACKWISE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/tracker/migrations/` and are embedded at build
//! time:
//! ```text
//! migrations/
//! ├── 20250301000000_catalog.sql
//! ├── 20250301000001_regimen.sql
//! └── 20250301000002_user_profiles.sql
//! ```

use super::{CliError, Context};

/// Apply all pending tracker migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run(ctx: &Context) -> Result<(), CliError> {
    let store = ctx.store().await?;

    tracing::info!("Running tracker migrations...");
    store.migrate().await?;

    tracing::info!("Tracker migrations complete!");
    Ok(())
}
