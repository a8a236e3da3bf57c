//! User demographics in canonical units.

use chrono::NaiveDate;
use serde::Serialize;
use stackwise_core::{Centimeters, Gender, Kilograms, UserId};

use crate::db::rows::ProfileRow;

/// Optional demographic data for a user. Height and weight are stored in
/// centimeters and kilograms only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height: Option<Centimeters>,
    pub weight: Option<Kilograms>,
}

impl UserProfile {
    /// An empty profile for a user who has not filled one in.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            date_of_birth: None,
            gender: None,
            height: None,
            weight: None,
        }
    }

    /// The row written by an upsert.
    #[must_use]
    pub fn to_row(&self) -> ProfileRow {
        ProfileRow {
            id: self.user_id,
            date_of_birth: self.date_of_birth,
            gender: self.gender.map(|g| g.as_str().to_owned()),
            height: self.height.map(|h| h.get()),
            weight: self.weight.map(|w| w.get()),
        }
    }
}

impl From<ProfileRow> for UserProfile {
    /// Unknown genders and non-positive measurements read back as unset.
    fn from(row: ProfileRow) -> Self {
        let gender = row.gender.as_deref().filter(|g| !g.is_empty()).and_then(|g| {
            g.parse::<Gender>()
                .inspect_err(|e| tracing::warn!(user_id = %row.id, error = %e, "Ignoring stored gender"))
                .ok()
        });

        Self {
            user_id: row.id,
            date_of_birth: row.date_of_birth,
            gender,
            height: row.height.and_then(|v| Centimeters::new(v).ok()),
            weight: row.weight.and_then(|v| Kilograms::new(v).ok()),
        }
    }
}
