//! Visitor feedback (`feedback.json`).

use pawmilya_core::{FeedbackId, FeedbackStatus};

use super::{FEEDBACK, LocalStore};
use crate::models::{Feedback, NewFeedback};
use crate::store::StoreError;

impl LocalStore {
    /// # Errors
    ///
    /// Returns error if the document cannot be written.
    pub async fn add_feedback(&self, new: NewFeedback) -> Result<Feedback, StoreError> {
        self.add_feedback_at(new, chrono::Utc::now()).await
    }

    /// Ids stay `feedback-<millis>`; a millisecond already taken moves the
    /// new entry to the next free one.
    pub(crate) async fn add_feedback_at(
        &self,
        new: NewFeedback,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Feedback, StoreError> {
        let mut feedback = new.into_feedback(now);
        self.modify(FEEDBACK, move |items: &mut Vec<Feedback>| {
            let mut millis = now.timestamp_millis();
            while items.iter().any(|f| f.id == feedback.id) {
                millis += 1;
                feedback.id = FeedbackId::from_millis(millis);
            }
            items.push(feedback.clone());
            Ok(feedback)
        })
        .await
    }

    /// All feedback, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be read.
    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, StoreError> {
        let mut items: Vec<Feedback> = self.load(FEEDBACK).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no entry has this id.
    pub async fn set_feedback_status(
        &self,
        id: &FeedbackId,
        status: FeedbackStatus,
    ) -> Result<(), StoreError> {
        self.modify(FEEDBACK, |items: &mut Vec<Feedback>| {
            let entry = items
                .iter_mut()
                .find(|f| &f.id == id)
                .ok_or(StoreError::NotFound)?;
            entry.status = status;
            Ok(())
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no entry has this id.
    pub async fn delete_feedback(&self, id: &FeedbackId) -> Result<(), StoreError> {
        self.modify(FEEDBACK, |items: &mut Vec<Feedback>| {
            let before = items.len();
            items.retain(|f| &f.id != id);
            if items.len() == before {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pawmilya_core::{FeedbackCategory, Rating};

    fn note(message: &str) -> NewFeedback {
        NewFeedback {
            rating: Rating::new(4).unwrap(),
            category: FeedbackCategory::General,
            message: message.to_string(),
            user_email: None,
            user_name: None,
        }
    }

    #[tokio::test]
    async fn test_same_millisecond_submissions_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let now = chrono::Utc::now();

        let first = store.add_feedback_at(note("First"), now).await.unwrap();
        let second = store.add_feedback_at(note("Second"), now).await.unwrap();
        assert_eq!(first.id, FeedbackId::from_millis(now.timestamp_millis()));
        assert_eq!(second.id, FeedbackId::from_millis(now.timestamp_millis() + 1));

        store.delete_feedback(&first.id).await.unwrap();
        let remaining = store.list_feedback().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.first().unwrap().message, "Second");
    }

    #[tokio::test]
    async fn test_feedback_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let entry = store
            .add_feedback(NewFeedback {
                rating: Rating::new(5).unwrap(),
                category: FeedbackCategory::Staff,
                message: "Friendly front desk".to_string(),
                user_email: Some("ana@example.com".to_string()),
                user_name: Some("Ana".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(entry.status, FeedbackStatus::New);

        store
            .set_feedback_status(&entry.id, FeedbackStatus::Resolved)
            .await
            .unwrap();
        let listed = store.list_feedback().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed.first().unwrap().status, FeedbackStatus::Resolved);

        store.delete_feedback(&entry.id).await.unwrap();
        assert!(store.list_feedback().await.unwrap().is_empty());
        assert!(matches!(
            store.delete_feedback(&entry.id).await,
            Err(StoreError::NotFound)
        ));
    }
}
