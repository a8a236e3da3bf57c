//! Authentication seam.
//!
//! The tracker never inspects credentials. An [`AuthProvider`] hands over the
//! resulting identity, and every operation takes that identity as an explicit
//! parameter instead of reading ambient session state.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::Serialize;
use stackwise_core::UserId;

use crate::error::{TrackerError, clear_sentry_user, set_sentry_user};

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    /// A user known only by ID.
    #[must_use]
    pub const fn new(id: UserId) -> Self {
        Self {
            id,
            email: None,
            display_name: None,
            avatar_url: None,
        }
    }
}

/// Source of the current identity.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, if any.
    async fn current_user(&self) -> Option<CurrentUser>;

    /// End the session.
    async fn logout(&self);
}

/// Resolve the signed-in user or fail with `TrackerError::NotAuthenticated`.
///
/// # Errors
///
/// Returns `TrackerError::NotAuthenticated` when nobody is signed in.
pub async fn require_user(auth: &dyn AuthProvider) -> Result<CurrentUser, TrackerError> {
    let user = auth
        .current_user()
        .await
        .ok_or(TrackerError::NotAuthenticated)?;
    set_sentry_user(&user.id, user.email.as_deref());
    Ok(user)
}

/// Provider holding a fixed identity until logout.
#[derive(Debug, Default)]
pub struct StaticAuth {
    user: RwLock<Option<CurrentUser>>,
}

impl StaticAuth {
    /// Create a provider for `user` (or nobody).
    #[must_use]
    pub const fn new(user: Option<CurrentUser>) -> Self {
        Self {
            user: RwLock::new(user),
        }
    }

    /// Build the identity from environment variables.
    ///
    /// - `STACKWISE_USER_ID` - UUID of the signed-in user (unset means signed out)
    /// - `STACKWISE_USER_EMAIL`, `STACKWISE_USER_NAME`, `STACKWISE_USER_AVATAR` - optional
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` if `STACKWISE_USER_ID` is not a UUID.
    pub fn from_env() -> Result<Self, TrackerError> {
        let Some(raw_id) = std::env::var("STACKWISE_USER_ID").ok().filter(|v| !v.is_empty())
        else {
            return Ok(Self::new(None));
        };
        let id = raw_id
            .parse::<UserId>()
            .map_err(|e| TrackerError::InvalidInput(format!("STACKWISE_USER_ID: {e}")))?;

        let optional = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Ok(Self::new(Some(CurrentUser {
            id,
            email: optional("STACKWISE_USER_EMAIL"),
            display_name: optional("STACKWISE_USER_NAME"),
            avatar_url: optional("STACKWISE_USER_AVATAR"),
        })))
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_user(&self) -> Option<CurrentUser> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn logout(&self) {
        let previous = self
            .user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(user) = previous {
            tracing::info!(user_id = %user.id, "Logged out");
        }
        clear_sentry_user();
    }
}
