//! Back-office feedback review.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pawmilya_core::{FeedbackCategory, FeedbackId, FeedbackStatus, Rating};

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Feedback, FeedbackFilter, Flash};
use crate::services::FeedbackStats;
use crate::state::AppState;
use crate::views::{PageContext, set_flash};

use super::{filter_value, load_notice, report};

/// Feedback filters.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub rating: Option<String>,
    pub status: Option<String>,
}

impl FeedbackQuery {
    fn filter(&self) -> FeedbackFilter {
        FeedbackFilter {
            search: self.search.clone().unwrap_or_default(),
            category: filter_value(self.category.as_deref()),
            rating: filter_value::<u8>(self.rating.as_deref()).and_then(|r| Rating::new(r).ok()),
            status: filter_value(self.status.as_deref()),
        }
    }
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// One bar of the rating distribution.
#[derive(Debug, Clone)]
pub struct DistributionRow {
    pub stars: u8,
    pub count: usize,
    pub percent: usize,
}

/// Feedback page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/feedback.html")]
pub struct FeedbackTemplate {
    pub ctx: PageContext,
    pub entries: Vec<Feedback>,
    pub stats: FeedbackStats,
    pub distribution: Vec<DistributionRow>,
    pub search: String,
    pub category: String,
    pub rating: String,
    pub status: String,
    pub categories: [FeedbackCategory; 8],
    pub statuses: [FeedbackStatus; 4],
    pub notice: Option<String>,
}

fn distribution(stats: &FeedbackStats) -> Vec<DistributionRow> {
    (Rating::MIN..=Rating::MAX)
        .rev()
        .map(|stars| DistributionRow {
            stars,
            count: stats
                .distribution
                .get(usize::from(stars - 1))
                .copied()
                .unwrap_or(0),
            percent: stats.percent(stars),
        })
        .collect()
}

/// Feedback list handler. Stats cover every entry, not just the filtered view.
#[instrument(skip(state, _admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<FeedbackQuery>,
) -> impl IntoResponse {
    let filter = query.filter();

    let (all, notice) = match state.local().list_feedback().await {
        Ok(all) => (all, None),
        Err(e) => (Vec::new(), Some(load_notice("feedback", &e))),
    };
    let stats = FeedbackStats::compute(&all);

    FeedbackTemplate {
        ctx,
        distribution: distribution(&stats),
        stats,
        entries: all.into_iter().filter(|f| filter.matches(f)).collect(),
        search: filter.search,
        category: filter.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
        rating: filter.rating.map(|r| r.stars().to_string()).unwrap_or_default(),
        status: filter.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        categories: FeedbackCategory::ALL,
        statuses: FeedbackStatus::ALL,
        notice,
    }
}

/// Change a feedback entry's review status.
#[instrument(skip(state, _admin, session))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let Ok(status) = form.status.parse::<FeedbackStatus>() else {
        set_flash(&session, Flash::error("Update failed", "Unknown feedback status.")).await;
        return Redirect::to("/admin/feedback");
    };
    let result = state
        .local()
        .set_feedback_status(&FeedbackId::new(id), status)
        .await;
    report(&session, result, "Feedback status updated.", "update the feedback").await;
    Redirect::to("/admin/feedback")
}

/// Delete a feedback entry.
#[instrument(skip(state, _admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    let result = state.local().delete_feedback(&FeedbackId::new(id)).await;
    report(&session, result, "Feedback deleted.", "delete the feedback").await;
    Redirect::to("/admin/feedback")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_filter_parses_rating() {
        let query = FeedbackQuery {
            rating: Some("4".to_string()),
            category: Some("staff".to_string()),
            status: Some("in_progress".to_string()),
            search: None,
        };
        let filter = query.filter();
        assert_eq!(filter.rating, Some(Rating::new(4).unwrap()));
        assert_eq!(filter.category, Some(FeedbackCategory::Staff));
        assert_eq!(filter.status, Some(FeedbackStatus::InProgress));

        let out_of_range = FeedbackQuery {
            rating: Some("9".to_string()),
            ..FeedbackQuery::default()
        };
        assert!(out_of_range.filter().rating.is_none());
    }

    #[test]
    fn test_distribution_lists_five_to_one() {
        let stats = FeedbackStats {
            total: 4,
            distribution: [0, 0, 1, 1, 2],
            ..FeedbackStats::default()
        };
        let rows = distribution(&stats);
        let summary: Vec<(u8, usize, usize)> =
            rows.iter().map(|r| (r.stars, r.count, r.percent)).collect();
        assert_eq!(
            summary,
            vec![(5, 2, 50), (4, 1, 25), (3, 1, 25), (2, 0, 0), (1, 0, 0)]
        );
    }
}
