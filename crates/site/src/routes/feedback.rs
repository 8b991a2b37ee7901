//! Public feedback form.
//!
//! Entries are stored only in the local `feedback` document.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pawmilya_core::{FeedbackCategory, Rating};

use crate::error::Result;
use crate::filters;
use crate::models::{CurrentUser, Flash, NewFeedback};
use crate::services::booking::{FieldErrors, filled};
use crate::state::AppState;
use crate::views::{PageContext, set_flash};

/// Feedback form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub rating: String,
    pub category: String,
    pub message: String,
}

impl FeedbackForm {
    /// Validate into a submission, attaching the signed-in user if any.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when the form is incomplete.
    pub fn validate(&self, user: Option<&CurrentUser>) -> std::result::Result<NewFeedback, FieldErrors> {
        let mut errors = FieldErrors::default();

        let rating = self
            .rating
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|stars| Rating::new(stars).ok());
        if rating.is_none() {
            errors.add("rating", "Please choose a rating from 1 to 5 stars.");
        }

        let category = self.category.parse::<FeedbackCategory>().ok();
        if category.is_none() {
            errors.add("category", "Please choose a category.");
        }

        let message = filled(&self.message);
        if message.is_none() {
            errors.add("message", "Please tell us a little about your experience.");
        }

        match (rating, category, message) {
            (Some(rating), Some(category), Some(message)) if errors.is_empty() => Ok(NewFeedback {
                rating,
                category,
                message,
                user_email: user.map(|u| u.email.to_string()),
                user_name: user.map(|u| u.name.clone()),
            }),
            _ => Err(errors),
        }
    }

    #[must_use]
    pub fn is_category(&self, category: &str) -> bool {
        self.category == category
    }

    #[must_use]
    pub fn is_rating(&self, stars: &u8) -> bool {
        self.rating == stars.to_string()
    }
}

/// A category option.
pub struct CategoryChoice {
    pub value: &'static str,
    pub label: &'static str,
}

fn category_choices() -> Vec<CategoryChoice> {
    FeedbackCategory::ALL
        .into_iter()
        .map(|c| CategoryChoice {
            value: c.as_str(),
            label: c.label(),
        })
        .collect()
}

/// Feedback page template.
#[derive(Template, WebTemplate)]
#[template(path = "feedback/form.html")]
pub struct FeedbackTemplate {
    pub ctx: PageContext,
    pub form: FeedbackForm,
    pub errors: FieldErrors,
    pub categories: Vec<CategoryChoice>,
    pub stars: Vec<u8>,
}

impl FeedbackTemplate {
    fn new(ctx: PageContext, form: FeedbackForm, errors: FieldErrors) -> Self {
        Self {
            ctx,
            form,
            errors,
            categories: category_choices(),
            stars: (Rating::MIN..=Rating::MAX).rev().collect(),
        }
    }
}

/// Display the feedback form.
#[instrument(skip_all)]
pub async fn form(ctx: PageContext) -> impl IntoResponse {
    FeedbackTemplate::new(ctx, FeedbackForm::default(), FieldErrors::default())
}

/// Store a feedback entry.
///
/// # Errors
///
/// Returns error if the feedback document cannot be written.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    ctx: PageContext,
    session: Session,
    Form(form): Form<FeedbackForm>,
) -> Result<Response> {
    let new = match form.validate(ctx.user.as_ref()) {
        Ok(new) => new,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                FeedbackTemplate::new(ctx, form, errors),
            )
                .into_response());
        }
    };

    let feedback = state.local().add_feedback(new).await?;
    tracing::info!(
        feedback_id = %feedback.id,
        rating = feedback.rating.stars(),
        category = feedback.category.as_str(),
        "Feedback received"
    );

    set_flash(
        &session,
        Flash::success("Thank you!", "Your feedback helps us care for your pets better."),
    )
    .await;
    Ok(Redirect::to("/feedback").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pawmilya_core::{Email, ProfileId, Role};

    use super::*;

    fn form(rating: &str, category: &str, message: &str) -> FeedbackForm {
        FeedbackForm {
            rating: rating.to_string(),
            category: category.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_anonymous_submission() {
        let new = form("5", "grooming", "  Lovely trim  ").validate(None).unwrap();
        assert_eq!(new.rating.stars(), 5);
        assert_eq!(new.category, FeedbackCategory::Grooming);
        assert_eq!(new.message, "Lovely trim");
        assert!(new.user_email.is_none());
    }

    #[test]
    fn test_signed_in_submitter_is_attached() {
        let user = CurrentUser {
            id: ProfileId::new("u-1"),
            name: "Ana Reyes".to_string(),
            email: Email::parse("ana@example.com").unwrap(),
            role: Role::Customer,
            phone: None,
            address: None,
            is_admin: false,
            access_token: None,
        };
        let new = form("3", "website", "Slow page").validate(Some(&user)).unwrap();
        assert_eq!(new.user_name.as_deref(), Some("Ana Reyes"));
        assert_eq!(new.user_email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_rejects_out_of_range_rating_and_blank_message() {
        let errors = form("0", "nonsense", "   ").validate(None).unwrap_err();
        assert!(errors.get("rating").is_some());
        assert!(errors.get("category").is_some());
        assert!(errors.get("message").is_some());
    }
}
