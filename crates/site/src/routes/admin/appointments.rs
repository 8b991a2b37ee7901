//! Back-office appointment management.
//!
//! The list reads from the in-process [`AppointmentFeed`] snapshot so busy
//! pages do not hit the backend on every load. `?refresh=1` forces a fetch
//! and every mutation invalidates the snapshot.
//!
//! [`AppointmentFeed`]: crate::services::AppointmentFeed

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pawmilya_core::{AppointmentId, AppointmentStatus, ServiceCategory};

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Appointment, AppointmentFilter, Flash};
use crate::state::AppState;
use crate::store::ClinicStore;
use crate::views::{Catalog, Choice, PageContext, set_flash};

use super::{filter_value, load_notice, report};

// =============================================================================
// Query and Form Types
// =============================================================================

/// List filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub service: Option<String>,
    pub refresh: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> AppointmentFilter {
        AppointmentFilter {
            search: self.search.clone().unwrap_or_default(),
            status: filter_value(self.status.as_deref()),
            service: self
                .service
                .as_deref()
                .and_then(ServiceCategory::from_label)
                .map(|s| s.label().to_string()),
        }
    }

    fn wants_refresh(&self) -> bool {
        matches!(self.refresh.as_deref(), Some("1" | "true"))
    }
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Notes form.
#[derive(Debug, Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub notes: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Appointment list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/appointments.html")]
pub struct AppointmentsTemplate {
    pub ctx: PageContext,
    pub appointments: Vec<Appointment>,
    pub total: usize,
    pub search: String,
    pub status: String,
    pub service: String,
    pub statuses: [AppointmentStatus; 3],
    pub services: Vec<Choice>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub source: &'static str,
    pub notice: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Appointment list handler.
#[instrument(skip(state, admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let backend = state.backend_for(Some(&admin));
    let filter = query.filter();

    let (appointments, total, fetched_at, notice) =
        match state.feed().get(&backend, query.wants_refresh()).await {
            Ok(snapshot) => {
                let matching: Vec<Appointment> = snapshot
                    .appointments
                    .iter()
                    .filter(|a| filter.matches(a))
                    .cloned()
                    .collect();
                (
                    matching,
                    snapshot.appointments.len(),
                    Some(snapshot.fetched_at),
                    None,
                )
            }
            Err(e) => (Vec::new(), 0, None, Some(load_notice("appointments", &e))),
        };

    AppointmentsTemplate {
        ctx,
        appointments,
        total,
        search: filter.search,
        status: filter.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        service: filter.service.unwrap_or_default(),
        statuses: AppointmentStatus::ALL,
        services: Catalog::new().services,
        fetched_at,
        source: backend.location(),
        notice,
    }
}

/// Change an appointment's status.
#[instrument(skip(state, admin, session))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let Ok(status) = form.status.parse::<AppointmentStatus>() else {
        set_flash(&session, Flash::error("Update failed", "Unknown appointment status.")).await;
        return Redirect::to("/admin/appointments");
    };
    let result = state
        .backend_for(Some(&admin))
        .update_appointment_status(&AppointmentId::new(id), status)
        .await;
    state.feed().invalidate().await;
    report(&session, result, "Appointment status updated.", "update the status").await;
    Redirect::to("/admin/appointments")
}

/// Replace an appointment's notes.
#[instrument(skip(state, admin, session, form))]
pub async fn update_notes(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<NotesForm>,
) -> Redirect {
    let result = state
        .backend_for(Some(&admin))
        .update_appointment_notes(&AppointmentId::new(id), form.notes.trim(), None)
        .await;
    state.feed().invalidate().await;
    report(&session, result, "Notes saved.", "save the notes").await;
    Redirect::to("/admin/appointments")
}

/// Delete an appointment.
#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    let result = state
        .backend_for(Some(&admin))
        .delete_appointment(&AppointmentId::new(id))
        .await;
    state.feed().invalidate().await;
    report(&session, result, "Appointment deleted.", "delete the appointment").await;
    Redirect::to("/admin/appointments")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_builds_filter() {
        let query = ListQuery {
            search: Some("mochi".to_string()),
            status: Some("Cancelled".to_string()),
            service: Some("pet-grooming".to_string()),
            refresh: Some("1".to_string()),
        };
        let filter = query.filter();
        assert_eq!(filter.search, "mochi");
        assert_eq!(filter.status, Some(AppointmentStatus::Cancelled));
        assert_eq!(filter.service.as_deref(), Some("Pet Grooming"));
        assert!(query.wants_refresh());
        assert!(!ListQuery::default().wants_refresh());
    }
}
