//! Local fallback accounts (`local_users.json`).
//!
//! Email is the natural key: lookups and the uniqueness check ignore case.

use chrono::Utc;

use pawmilya_core::ProfileId;

use super::{LocalStore, USERS};
use crate::models::{LocalUser, NewLocalUser, ProfileUpdate};
use crate::store::StoreError;

impl LocalStore {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if an account with the same email
    /// (ignoring case) already exists.
    pub async fn create_user(&self, new: NewLocalUser) -> Result<LocalUser, StoreError> {
        self.modify(USERS, move |users: &mut Vec<LocalUser>| {
            if users.iter().any(|u| u.email.matches(new.email.as_str())) {
                return Err(StoreError::Conflict(format!(
                    "email already registered: {}",
                    new.email
                )));
            }

            let user = LocalUser {
                id: ProfileId::generate(),
                name: new.name,
                email: new.email,
                role: new.role,
                status: pawmilya_core::UserStatus::Active,
                phone: None,
                address: None,
                password_hash: new.password_hash,
                created_at: Utc::now(),
                updated_at: None,
            };
            users.push(user.clone());
            Ok(user)
        })
        .await
    }

    /// Find an account by email, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be read.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<LocalUser>, StoreError> {
        let users: Vec<LocalUser> = self.load(USERS).await?;
        Ok(users.into_iter().find(|u| u.email.matches(email)))
    }

    /// # Errors
    ///
    /// Returns error if the document cannot be read.
    pub async fn get_user(&self, id: &ProfileId) -> Result<Option<LocalUser>, StoreError> {
        let users: Vec<LocalUser> = self.load(USERS).await?;
        Ok(users.into_iter().find(|u| &u.id == id))
    }

    /// # Errors
    ///
    /// Returns error if the document cannot be read.
    pub async fn list_users(&self) -> Result<Vec<LocalUser>, StoreError> {
        let mut users: Vec<LocalUser> = self.load(USERS).await?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    /// Apply a partial update and return the updated account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no account has this id.
    pub async fn update_user(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
    ) -> Result<LocalUser, StoreError> {
        self.modify(USERS, |users: &mut Vec<LocalUser>| {
            let user = users
                .iter_mut()
                .find(|u| &u.id == id)
                .ok_or(StoreError::NotFound)?;

            if let Some(name) = &update.name {
                user.name.clone_from(name);
            }
            if let Some(phone) = &update.phone {
                user.phone = Some(phone.clone());
            }
            if let Some(address) = &update.address {
                user.address = Some(address.clone());
            }
            if let Some(role) = update.role {
                user.role = role;
            }
            if let Some(status) = update.status {
                user.status = status;
            }
            user.updated_at = Some(update.updated_at);

            Ok(user.clone())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no account has this id.
    pub async fn delete_user(&self, id: &ProfileId) -> Result<(), StoreError> {
        self.modify(USERS, |users: &mut Vec<LocalUser>| {
            let before = users.len();
            users.retain(|u| &u.id != id);
            if users.len() == before {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }
}
