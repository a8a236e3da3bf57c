//! At-most-one (user, product) membership guard.
//!
//! The existence lookup only saves a round trip in the common case. The
//! authoritative answer is the constrained insert: a unique violation means a
//! concurrent caller already created the row, which is reported the same way
//! as a row found by the lookup.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::db::{RegimenBackend, StoreError};
use crate::models::{NewRegimenEntry, RegimenEntry};

/// Outcome of a membership registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegisterOutcome {
    /// A new entry was created.
    Accepted(RegimenEntry),
    /// The entry already existed; nothing changed.
    AlreadyExists,
    /// The authorization policy rejected the write.
    Denied { reason: String },
}

impl RegisterOutcome {
    /// True when the product is in the user's regimen after the call.
    #[must_use]
    pub const fn is_member(&self) -> bool {
        matches!(self, Self::Accepted(_) | Self::AlreadyExists)
    }
}

/// Decides insert vs. no-op for regimen membership.
#[derive(Clone)]
pub struct MembershipGuard {
    backend: Arc<dyn RegimenBackend>,
}

impl MembershipGuard {
    #[must_use]
    pub fn new(backend: Arc<dyn RegimenBackend>) -> Self {
        Self { backend }
    }

    /// Register `entry`, creating the row unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` for failures other than a duplicate key or a
    /// denied write (connectivity, malformed data).
    #[instrument(
        skip(self, entry),
        fields(user_id = %entry.user_id, product_id = %entry.product_id)
    )]
    pub async fn try_register(
        &self,
        entry: &NewRegimenEntry,
    ) -> Result<RegisterOutcome, StoreError> {
        if self
            .backend
            .find_entry(entry.user_id, entry.product_id)
            .await?
            .is_some()
        {
            debug!("Entry already present");
            return Ok(RegisterOutcome::AlreadyExists);
        }

        match self.backend.insert_entry(entry).await {
            Ok(row) => {
                let created = RegimenEntry::from_row(row, entry.servings_per_day)?;
                info!(servings_per_day = %created.servings_per_day, "Entry added");
                Ok(RegisterOutcome::Accepted(created))
            }
            Err(StoreError::ConstraintViolation(detail)) => {
                debug!(%detail, "Concurrent insert won the race");
                Ok(RegisterOutcome::AlreadyExists)
            }
            Err(StoreError::PermissionDenied(reason)) => {
                warn!(%reason, "Entry insert denied");
                Ok(RegisterOutcome::Denied { reason })
            }
            Err(other) => Err(other),
        }
    }
}
