//! Local account management.
//!
//! Accounts created here live in the local accounts document and can log in
//! whether or not the hosted backend is reachable.

use pawmilya_core::{Email, Role};
use pawmilya_site::models::{LocalUser, NewLocalUser};
use pawmilya_site::services::auth::{hash_password, validate_password};
use pawmilya_site::store::{LocalStore, StoreError};

use super::CommandError;

/// Create a local account.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a blank name, a malformed
/// email or an existing account. Returns `CommandError::Auth` for a weak
/// password.
pub async fn create(
    store: &LocalStore,
    email: &str,
    name: &str,
    password: &str,
    admin: bool,
) -> Result<LocalUser, CommandError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidArgument("name must not be blank".to_string()));
    }
    let email = Email::normalized(email)
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    validate_password(password)?;

    let role = if admin { Role::Admin } else { Role::Customer };
    let user = store
        .create_user(NewLocalUser {
            name: name.to_string(),
            email,
            role,
            password_hash: hash_password(password)?,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(msg) => CommandError::InvalidArgument(msg),
            other => CommandError::Store(other),
        })?;

    tracing::info!(
        "Local account created. ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user)
}

/// Print every local account.
///
/// # Errors
///
/// Returns error if the accounts document cannot be read.
#[allow(clippy::print_stdout)]
pub async fn list(store: &LocalStore) -> Result<(), CommandError> {
    let users = store.list_users().await?;
    if users.is_empty() {
        tracing::info!("No local accounts in {}", store.dir().display());
        return Ok(());
    }

    for user in &users {
        println!("{}", format_user(user));
    }
    tracing::info!("{} local account(s)", users.len());
    Ok(())
}

fn format_user(user: &LocalUser) -> String {
    format!(
        "{:<36}  {:<32}  {:<24}  {:<8}  {:<9}  {}",
        user.id,
        user.email,
        user.name,
        user.role,
        user.status,
        user.created_at.format("%Y-%m-%d")
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_admin_account() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let user = create(&store, " Vet@Example.com ", "Clinic Vet", "secret-pass", true)
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "vet@example.com");
        assert_eq!(user.role, Role::Admin);
        assert_ne!(user.password_hash, "secret-pass");

        let stored = store.find_user_by_email("vet@example.com").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_weak_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        create(&store, "owner@example.com", "Owner", "secret-pass", false)
            .await
            .unwrap();
        let duplicate = create(&store, "OWNER@example.com", "Owner", "secret-pass", false).await;
        assert!(matches!(duplicate, Err(CommandError::InvalidArgument(_))));

        let weak = create(&store, "new@example.com", "New", "123", false).await;
        assert!(matches!(weak, Err(CommandError::Auth(_))));

        let blank = create(&store, "other@example.com", "  ", "secret-pass", false).await;
        assert!(matches!(blank, Err(CommandError::InvalidArgument(_))));
    }
}
