//! Visitor feedback, kept only in the local `feedback` document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawmilya_core::{FeedbackCategory, FeedbackId, FeedbackStatus, Rating};

/// A stored feedback entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: FeedbackId,
    pub rating: Rating,
    pub category: FeedbackCategory,
    pub message: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: FeedbackStatus,
}

impl Feedback {
    #[must_use]
    pub fn submitter(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.user_email.as_deref())
            .unwrap_or("Anonymous")
    }
}

/// A validated submission.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub rating: Rating,
    pub category: FeedbackCategory,
    pub message: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

impl NewFeedback {
    #[must_use]
    pub fn into_feedback(self, now: DateTime<Utc>) -> Feedback {
        Feedback {
            id: FeedbackId::from_millis(now.timestamp_millis()),
            rating: self.rating,
            category: self.category,
            message: self.message,
            user_email: self.user_email,
            user_name: self.user_name,
            created_at: now,
            status: FeedbackStatus::New,
        }
    }
}

/// Back-office feedback filter.
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub search: String,
    pub category: Option<FeedbackCategory>,
    pub rating: Option<Rating>,
    pub status: Option<FeedbackStatus>,
}

impl FeedbackFilter {
    #[must_use]
    pub fn matches(&self, feedback: &Feedback) -> bool {
        let q = self.search.trim().to_lowercase();
        let text_match = q.is_empty()
            || feedback.message.to_lowercase().contains(&q)
            || feedback
                .user_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&q))
            || feedback
                .user_email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&q));
        text_match
            && self.category.is_none_or(|c| feedback.category == c)
            && self.rating.is_none_or(|r| feedback.rating == r)
            && self.status.is_none_or(|s| feedback.status == s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feedback_gets_millis_id_and_new_status() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let feedback = NewFeedback {
            rating: Rating::new(4).unwrap(),
            category: FeedbackCategory::Grooming,
            message: "Very gentle with our cat".to_string(),
            user_email: None,
            user_name: None,
        }
        .into_feedback(now);
        assert_eq!(feedback.id.as_str(), "feedback-1700000000123");
        assert_eq!(feedback.status, FeedbackStatus::New);
        assert_eq!(feedback.submitter(), "Anonymous");

        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20.123Z");
        assert_eq!(json["category"], "grooming");
        assert_eq!(json["rating"], 4);
    }
}
