//! Command implementations.
//!
//! Each command works on the same local store and configuration as the
//! running site, so it can be used while the site is up.

pub mod appointments;
pub mod feedback;
pub mod remote;
pub mod users;

use thiserror::Error;

use pawmilya_site::config::{ConfigError, SiteConfig};
use pawmilya_site::remote::RemoteError;
use pawmilya_site::services::AuthError;
use pawmilya_site::store::StoreError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Local store error: {0}")]
    Store(#[from] StoreError),

    #[error("Account error: {0}")]
    Auth(#[from] AuthError),

    #[error("Hosted backend error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Hosted backend is not configured (set REMOTE_URL and REMOTE_ANON_KEY)")]
    RemoteNotConfigured,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the site configuration, including a `.env` file if present.
///
/// # Errors
///
/// Returns `CommandError::Config` if the environment is malformed.
pub fn load_config() -> Result<SiteConfig, CommandError> {
    dotenvy::dotenv().ok();

    Ok(SiteConfig::from_env()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_without_env_file() {
        // Every setting has a default, so a bare environment still loads.
        let config = load_config().unwrap();
        assert!(!config.data_dir.as_os_str().is_empty());
        assert!(!config.admin_emails.is_empty());
    }
}
