//! Authentication service.
//!
//! Login tries the remote identity provider first and falls back to the
//! local accounts document. Signup only ever creates local accounts.

mod admin;
mod error;

pub use admin::AdminPolicy;
pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde_json::json;

use pawmilya_core::{Email, Role};

use crate::models::{CurrentUser, LocalUser, NewLocalUser, ProfileUpdate};
use crate::remote::{RemoteClient, RemoteSession, RestRequest};
use crate::store::{ClinicStore, LocalStore, RemoteStore, StoreError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    local: &'a LocalStore,
    remote: Option<&'a RemoteClient>,
    policy: &'a AdminPolicy,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        local: &'a LocalStore,
        remote: Option<&'a RemoteClient>,
        policy: &'a AdminPolicy,
    ) -> Self {
        Self {
            local,
            remote,
            policy,
        }
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if neither the remote provider
    /// nor a local account accepts the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::normalized(email)?;

        if let Some(remote) = self.remote {
            match remote.sign_in_with_password(email.as_str(), password).await {
                Ok(session) => return self.remote_user(remote, &email, session).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Remote sign-in failed, trying local accounts");
                }
            }
        }

        let user = self
            .local
            .find_user_by_email(email.as_str())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &user.password_hash)?;

        tracing::info!(user_id = %user.id, "Local account signed in");
        Ok(self.local_user(&user))
    }

    /// Build the signed-in user from session claims, then enrich it from
    /// the `profiles` row when there is one.
    async fn remote_user(
        &self,
        remote: &RemoteClient,
        typed: &Email,
        session: RemoteSession,
    ) -> Result<CurrentUser, AuthError> {
        let email = match session.user.email.as_deref() {
            Some(claimed) => Email::normalized(claimed)?,
            None => typed.clone(),
        };
        let name = session
            .user
            .user_metadata
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name(&email));

        let mut user = CurrentUser {
            id: session.user.id,
            name,
            role: self.policy.role_for_email(email.as_str()),
            email,
            phone: None,
            address: None,
            is_admin: false,
            access_token: Some(session.access_token),
        };

        let store = RemoteStore::new(remote.clone(), user.access_token.clone());
        match store.get_profile(&user.id).await {
            Ok(Some(profile)) => {
                if let Some(name) = profile.name.filter(|n| !n.trim().is_empty()) {
                    user.name = name;
                }
                user.phone = profile.phone;
                user.address = profile.address;
                if profile.role.is_some_and(Role::is_admin) {
                    user.role = Role::Admin;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Profile lookup failed"),
        }

        user.is_admin = self.policy.is_admin(user.email.as_str(), user.role);
        if user.is_admin {
            ensure_admin_access(remote, &user).await;
        }

        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "Remote session started");
        Ok(user)
    }

    /// End the remote session if there is one. Never fails.
    pub async fn logout(&self, user: Option<&CurrentUser>) {
        if let (Some(remote), Some(token)) = (self.remote, user.and_then(|u| u.access_token.as_ref()))
            && let Err(e) = remote.sign_out(token).await
        {
            tracing::warn!(error = %e, "Remote sign-out failed");
        }
    }

    // =========================================================================
    // Local Accounts
    // =========================================================================

    /// Register a local fallback account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::normalized(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .local
            .create_user(NewLocalUser {
                name: name.to_string(),
                role: self.policy.role_for_email(email.as_str()),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, "Local account created");
        Ok(self.local_user(&user))
    }

    /// Resolve a local session pointer. `None` when the account is gone.
    ///
    /// # Errors
    ///
    /// Returns error if the accounts document cannot be read.
    pub async fn resolve_local(
        &self,
        id: &pawmilya_core::ProfileId,
    ) -> Result<Option<CurrentUser>, AuthError> {
        Ok(self.local.get_user(id).await?.map(|u| self.local_user(&u)))
    }

    fn local_user(&self, user: &LocalUser) -> CurrentUser {
        CurrentUser {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            address: user.address.clone(),
            is_admin: self.policy.is_admin(user.email.as_str(), user.role),
            access_token: None,
        }
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update name, phone and address.
    ///
    /// A local account with the user's email takes precedence; otherwise the
    /// `profiles` row is patched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if neither store can be updated.
    pub async fn update_profile(
        &self,
        user: &CurrentUser,
        name: &str,
        phone: &str,
        address: &str,
    ) -> Result<CurrentUser, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let update = ProfileUpdate {
            name: Some(name.to_string()),
            phone: Some(phone.trim().to_string()),
            address: Some(address.trim().to_string()),
            ..ProfileUpdate::now()
        };

        if let Some(local) = self.local.find_user_by_email(user.email.as_str()).await? {
            let updated = self.local.update_user(&local.id, &update).await?;
            return Ok(CurrentUser {
                id: user.id.clone(),
                access_token: user.access_token.clone(),
                ..self.local_user(&updated)
            });
        }

        let remote = self
            .remote
            .ok_or(StoreError::Remote(crate::remote::RemoteError::NotConfigured))?;
        RemoteStore::new(remote.clone(), user.access_token.clone())
            .update_profile(&user.id, &update)
            .await?;

        Ok(CurrentUser {
            name: name.to_string(),
            phone: update.phone,
            address: update.address,
            ..user.clone()
        })
    }
}

/// Record an admin in the `admins` table. Failures are only logged.
async fn ensure_admin_access(remote: &RemoteClient, user: &CurrentUser) {
    let row = json!({
        "user_id": user.id,
        "email": user.email,
        "updated_at": Utc::now(),
    });
    let result = match RestRequest::upsert("admins", &row, "user_id") {
        Ok(request) => remote.execute(&request, user.access_token.as_ref()).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::warn!(user_id = %user.id, error = %e, "Could not record admin access");
    }
}

fn fallback_name(email: &Email) -> String {
    let local = email.local_part();
    if local.is_empty() {
        "User".to_string()
    } else {
        local.to_string()
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("mochi123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("mochi123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(validate_password("12345"), Err(AuthError::WeakPassword(_))));
        assert!(validate_password("123456").is_ok());
    }

    #[tokio::test]
    async fn test_signup_then_login_locally() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let policy = AdminPolicy::new(["admin@example.com"]);
        let auth = AuthService::new(&local, None, &policy);

        let user = auth.signup("Ana", " Ana@Example.com ", "secret1").await.unwrap();
        assert_eq!(user.email.as_str(), "ana@example.com");
        assert!(!user.is_admin);

        let again = auth.login("ANA@example.com", "secret1").await.unwrap();
        assert_eq!(again.id, user.id);
        assert!(again.access_token.is_none());

        assert!(matches!(
            auth.login("ana@example.com", "nope123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_signup_rejected_ignoring_case() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let policy = AdminPolicy::default();
        let auth = AuthService::new(&local, None, &policy);

        auth.signup("A", "a@b.com", "secret1").await.unwrap();
        let err = auth.signup("B", "A@B.com", "secret2").await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(err.to_string(), "This email is already registered. Please log in.");
    }

    #[tokio::test]
    async fn test_admin_email_signup_gets_admin_role() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let policy = AdminPolicy::new(["admin@example.com"]);
        let auth = AuthService::new(&local, None, &policy);

        let user = auth.signup("Dr. Cruz", "admin@example.com", "secret1").await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn test_update_profile_of_local_account() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let policy = AdminPolicy::default();
        let auth = AuthService::new(&local, None, &policy);

        let user = auth.signup("Ana", "ana@example.com", "secret1").await.unwrap();
        let updated = auth
            .update_profile(&user, "Ana Reyes", "0917 555 0101", "Baguio")
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Reyes");
        assert_eq!(updated.address.as_deref(), Some("Baguio"));

        let resolved = auth.resolve_local(&user.id).await.unwrap().unwrap();
        assert_eq!(resolved.phone.as_deref(), Some("0917 555 0101"));
    }
}
