//! Back-office dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Appointment;
use crate::services::AdminStats;
use crate::state::AppState;
use crate::store::ClinicStore;
use crate::views::PageContext;

use super::load_notice;

const RECENT_LIMIT: usize = 5;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub stats: AdminStats,
    pub recent: Vec<Appointment>,
    pub source: &'static str,
    pub notice: Option<String>,
}

/// Dashboard handler.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
) -> impl IntoResponse {
    let backend = state.backend_for(Some(&admin));

    let (appointments, pets, recent) = tokio::join!(
        backend.list_appointments(),
        backend.list_pets(),
        backend.recent_appointments(RECENT_LIMIT),
    );

    let mut notice = None;
    let appointments = appointments.unwrap_or_else(|e| {
        notice = Some(load_notice("appointments", &e));
        Vec::new()
    });
    let total_pets = pets.map_or_else(
        |e| {
            tracing::warn!(error = %e, "Failed to count pets");
            0
        },
        |p| p.len(),
    );
    let recent = recent.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load recent appointments");
        Vec::new()
    });

    DashboardTemplate {
        ctx,
        stats: AdminStats::compute(&appointments, total_pets),
        recent,
        source: backend.location(),
        notice,
    }
}
