//! Hosted backend diagnostics.

use pawmilya_site::config::SiteConfig;
use pawmilya_site::remote::RemoteClient;

use super::CommandError;

/// Ping the hosted backend with the configured key.
///
/// # Errors
///
/// Returns `CommandError::RemoteNotConfigured` when no backend is set, or the
/// backend error when the request fails.
pub async fn check(config: &SiteConfig) -> Result<(), CommandError> {
    let remote = config
        .remote
        .as_ref()
        .ok_or(CommandError::RemoteNotConfigured)?;
    let client = RemoteClient::new(remote)?;

    tracing::info!("Checking {} ...", client.base_url());
    client.ping().await?;
    tracing::info!("Hosted backend reachable and key accepted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_requires_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::local(dir.path().to_path_buf(), dir.path().to_path_buf());
        assert!(matches!(
            check(&config).await,
            Err(CommandError::RemoteNotConfigured)
        ));
    }
}
