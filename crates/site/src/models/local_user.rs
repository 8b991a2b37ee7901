//! Accounts created on this site without the remote identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawmilya_core::{Email, ProfileId, Role, UserStatus};

use super::profile::Profile;

/// A local fallback account as persisted in the `local_users` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: ProfileId,
    pub name: String,
    /// Always stored normalized (trimmed, lowercased).
    pub email: Email,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocalUser {
    /// The account seen as a profile row.
    #[must_use]
    pub fn to_profile(&self) -> Profile {
        Profile {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            email: Some(self.email.to_string()),
            role: Some(self.role),
            phone: self.phone.clone(),
            address: self.address.clone(),
            status: Some(self.status),
            created_at: Some(self.created_at),
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a local account.
#[derive(Debug, Clone)]
pub struct NewLocalUser {
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub password_hash: String,
}
