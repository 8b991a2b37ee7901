//! Registered user profiles (`profiles` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawmilya_core::{ProfileId, Role, UserStatus};

/// A stored profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unknown")
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    #[must_use]
    pub fn status(&self) -> UserStatus {
        self.status.unwrap_or_default()
    }

    /// Case-insensitive match on name, email or id.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || self.name.as_deref().is_some_and(|n| n.to_lowercase().contains(&q))
            || self.email.as_deref().is_some_and(|e| e.to_lowercase().contains(&q))
            || self.id.as_str().to_lowercase().contains(&q)
    }
}

/// Partial profile update; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn now() -> Self {
        Self {
            updated_at: Utc::now(),
            ..Self::default()
        }
    }
}
