//! Profile view assembly.
//!
//! Composes the regimen, its cost summary and the optional demographic
//! profile into one view model. Stored centimeters and kilograms are
//! converted to feet/inches and pounds here and nowhere else.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use stackwise_core::{
    FeetInches, Gender, Pounds, Price, ProductId, ServingsPerDay, SupplementId,
};
use tracing::{info, instrument, warn};

use crate::auth::CurrentUser;
use crate::cost::{self, CostFlag};
use crate::db::RegimenBackend;
use crate::error::TrackerError;
use crate::models::UserProfile;
use crate::regimen::RegimenStore;

/// Display name used when the identity provider has none.
pub const DEFAULT_DISPLAY_NAME: &str = "User";
/// Avatar used when the identity provider has none.
pub const DEFAULT_AVATAR_URL: &str = "/placeholder-avatar.jpg";

/// Identity display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: String,
}

impl From<&CurrentUser> for IdentityView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            display_name: user
                .display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            email: user.email.clone(),
            avatar_url: user
                .avatar_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
        }
    }
}

/// One row of the regimen table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub product_id: ProductId,
    pub product_name: String,
    pub brand_name: String,
    pub supplement_id: Option<SupplementId>,
    pub supplement_name: String,
    pub price: Price,
    pub servings_per_container: Option<i32>,
    pub servings_per_day: ServingsPerDay,
    pub monthly_cost: Option<Decimal>,
    pub flag: Option<CostFlag>,
}

/// Demographics in presentation units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height: Option<FeetInches>,
    pub weight: Option<Pounds>,
}

impl From<&UserProfile> for Demographics {
    fn from(profile: &UserProfile) -> Self {
        let height = profile.height.and_then(|cm| {
            cm.to_feet_inches()
                .inspect_err(|e| warn!(error = %e, "Stored height not presentable"))
                .ok()
        });
        Self {
            date_of_birth: profile.date_of_birth,
            gender: profile.gender,
            height,
            weight: profile.weight.map(|kg| kg.to_pounds()),
        }
    }
}

/// Everything the profile page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub user: IdentityView,
    pub entries: Vec<EntryView>,
    pub distinct_supplement_count: usize,
    pub monthly_cost: Decimal,
    pub flagged: Vec<(ProductId, CostFlag)>,
    pub demographics: Demographics,
}

impl ProfileView {
    /// Monthly cost rounded to cents.
    #[must_use]
    pub fn monthly_cost_display(&self) -> String {
        format!("${:.2}", self.monthly_cost.round_dp(2))
    }
}

/// Demographic edits in presentation units.
///
/// `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub feet: Option<u32>,
    pub inches: Option<u32>,
    pub weight_lbs: Option<Decimal>,
}

/// Builds profile views and applies profile edits.
#[derive(Clone)]
pub struct ProfileAssembler {
    regimen: RegimenStore,
    backend: Arc<dyn RegimenBackend>,
}

impl ProfileAssembler {
    #[must_use]
    pub fn new(regimen: RegimenStore, backend: Arc<dyn RegimenBackend>) -> Self {
        Self { regimen, backend }
    }

    /// Assemble the profile view for `user`.
    ///
    /// A user without a stored profile gets empty demographics.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Store` if reading the regimen or profile fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn build_profile_view(&self, user: &CurrentUser) -> Result<ProfileView, TrackerError> {
        let items = self.regimen.list_entries(user.id).await?;
        let summary = cost::aggregate(&items);
        let profile = self.load_profile(user).await?;

        let entries = items
            .into_iter()
            .zip(&summary.lines)
            .map(|(item, line)| EntryView {
                product_id: item.product_id,
                product_name: item.product_name,
                brand_name: item.brand_name,
                supplement_id: item.supplement_id,
                supplement_name: item.supplement_name,
                price: item.price,
                servings_per_container: item.servings_per_container,
                servings_per_day: item.servings_per_day,
                monthly_cost: line.monthly_cost,
                flag: line.flag,
            })
            .collect();

        Ok(ProfileView {
            user: IdentityView::from(user),
            entries,
            distinct_supplement_count: summary.distinct_supplement_count,
            monthly_cost: summary.monthly_cost,
            flagged: summary.flagged().collect(),
            demographics: Demographics::from(&profile),
        })
    }

    /// The stored profile, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Store` if the read fails.
    pub async fn load_profile(&self, user: &CurrentUser) -> Result<UserProfile, TrackerError> {
        Ok(self
            .backend
            .get_profile(user.id)
            .await?
            .map_or_else(|| UserProfile::empty(user.id), UserProfile::from))
    }

    /// Apply `update` on top of the stored profile and upsert it.
    ///
    /// Height is written when `feet` is given, with `inches` defaulting to 0.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` for inches without feet or
    /// out-of-range measurements (nothing is written), and
    /// `TrackerError::Store` if the upsert is denied or fails.
    #[instrument(skip(self, user, update), fields(user_id = %user.id))]
    pub async fn update_profile(
        &self,
        user: &CurrentUser,
        update: ProfileUpdate,
    ) -> Result<UserProfile, TrackerError> {
        let height = match (update.feet, update.inches) {
            (Some(feet), inches) => {
                Some(FeetInches::new(feet, inches.unwrap_or(0))?.to_centimeters())
            }
            (None, Some(_)) => {
                return Err(TrackerError::InvalidInput(
                    "inches require feet to be set".to_string(),
                ));
            }
            (None, None) => None,
        };
        let weight = update
            .weight_lbs
            .map(Pounds::new)
            .transpose()?
            .map(|lbs| lbs.to_kilograms());

        let mut profile = self.load_profile(user).await?;
        if let Some(dob) = update.date_of_birth {
            profile.date_of_birth = Some(dob);
        }
        if let Some(gender) = update.gender {
            profile.gender = Some(gender);
        }
        if height.is_some() {
            profile.height = height;
        }
        if weight.is_some() {
            profile.weight = weight;
        }

        self.backend.upsert_profile(&profile.to_row()).await?;
        info!("Profile updated");
        Ok(profile)
    }
}
