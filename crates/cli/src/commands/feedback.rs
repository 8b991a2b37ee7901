//! Feedback review and export.

use std::path::Path;

use pawmilya_core::FeedbackStatus;
use pawmilya_site::models::Feedback;
use pawmilya_site::store::LocalStore;

use super::CommandError;

/// Entries newest first, optionally limited to one status.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for an unknown status.
pub async fn filtered(
    store: &LocalStore,
    status: Option<&str>,
) -> Result<Vec<Feedback>, CommandError> {
    let status = status
        .map(str::parse::<FeedbackStatus>)
        .transpose()
        .map_err(CommandError::InvalidArgument)?;

    let mut entries = store.list_feedback().await?;
    if let Some(status) = status {
        entries.retain(|f| f.status == status);
    }
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(entries)
}

/// Print feedback entries.
///
/// # Errors
///
/// Returns error if the status is unknown or the document cannot be read.
#[allow(clippy::print_stdout)]
pub async fn list(store: &LocalStore, status: Option<&str>) -> Result<(), CommandError> {
    let entries = filtered(store, status).await?;

    for entry in &entries {
        println!(
            "{}  {}  {}/5  {:<22}  {:<11}  {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.rating.stars(),
            entry.category.label(),
            entry.status.label(),
            entry.submitter()
        );
        println!("    {}", entry.message.replace('\n', "\n    "));
    }
    tracing::info!("{} feedback entr(ies)", entries.len());
    Ok(())
}

/// Write every entry to `output` as pretty-printed JSON.
///
/// # Errors
///
/// Returns error if the document cannot be read or the file cannot be written.
pub async fn export(store: &LocalStore, output: &Path) -> Result<usize, CommandError> {
    let entries = filtered(store, None).await?;
    let json = serde_json::to_vec_pretty(&entries)?;
    tokio::fs::write(output, json).await?;

    tracing::info!("Exported {} feedback entr(ies) to {}", entries.len(), output.display());
    Ok(entries.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawmilya_core::{FeedbackCategory, Rating};
    use pawmilya_site::models::NewFeedback;

    use super::*;

    async fn seed(store: &LocalStore) {
        for (stars, message) in [(5, "Great visit"), (2, "Long wait")] {
            store
                .add_feedback(NewFeedback {
                    rating: Rating::new(stars).unwrap(),
                    category: FeedbackCategory::General,
                    message: message.to_string(),
                    user_email: None,
                    user_name: None,
                })
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        seed(&store).await;

        let latest = filtered(&store, None).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest.first().unwrap().message, "Long wait");

        let first = latest.last().unwrap().id.clone();
        store
            .set_feedback_status(&first, FeedbackStatus::Resolved)
            .await
            .unwrap();

        let resolved = filtered(&store, Some("resolved")).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.first().unwrap().message, "Great visit");

        assert!(matches!(
            filtered(&store, Some("archived")).await,
            Err(CommandError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_export_writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("data"));
        seed(&store).await;

        let output = dir.path().join("feedback.json");
        assert_eq!(export(&store, &output).await.unwrap(), 2);

        let written: Vec<Feedback> =
            serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
    }
}
