//! Booking records: every appointment the site knows about.
//!
//! Combines the backend's rows with the local fallback document so bookings
//! that missed the remote store are still visible. Each row is tagged with
//! where it lives.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use pawmilya_core::AppointmentStatus;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Appointment, AppointmentFilter};
use crate::state::AppState;
use crate::store::{Backend, ClinicStore, LocalStore, StoreError};
use crate::views::PageContext;

use super::{filter_value, load_notice};

/// Record filters.
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

/// One appointment and where it is stored.
#[derive(Debug, Clone)]
pub struct BookingRecord {
    pub appointment: Appointment,
    pub source: &'static str,
}

/// Booking records template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/records.html")]
pub struct RecordsTemplate {
    pub ctx: PageContext,
    pub records: Vec<BookingRecord>,
    pub search: String,
    pub status: String,
    pub statuses: [AppointmentStatus; 3],
    pub notice: Option<String>,
}

/// Tag, filter and sort by appointment date, newest first.
fn merge(
    primary: Vec<Appointment>,
    primary_source: &'static str,
    local: Vec<Appointment>,
    filter: &AppointmentFilter,
) -> Vec<BookingRecord> {
    let mut records: Vec<BookingRecord> = primary
        .into_iter()
        .map(|a| (a, primary_source))
        .chain(local.into_iter().map(|a| (a, "local storage")))
        .filter(|(a, _)| filter.matches(a))
        .map(|(appointment, source)| BookingRecord {
            appointment,
            source,
        })
        .collect();
    records.sort_by(|a, b| {
        b.appointment
            .appointment_date
            .cmp(&a.appointment.appointment_date)
            .then_with(|| b.appointment.created_at.cmp(&a.appointment.created_at))
    });
    records
}

async fn load(
    backend: &Backend,
    local: &LocalStore,
) -> (Vec<Appointment>, Vec<Appointment>, Option<StoreError>) {
    match backend {
        Backend::Remote(remote) => {
            let (remote_rows, local_rows) =
                tokio::join!(remote.list_appointments(), local.local_appointments());
            let mut error = None;
            let remote_rows = remote_rows.unwrap_or_else(|e| {
                error = Some(e);
                Vec::new()
            });
            let local_rows = local_rows.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read local appointments");
                Vec::new()
            });
            (remote_rows, local_rows, error)
        }
        // The local backend already is the fallback document.
        Backend::Local(_) => match local.local_appointments().await {
            Ok(rows) => (Vec::new(), rows, None),
            Err(e) => (Vec::new(), Vec::new(), Some(e)),
        },
    }
}

/// Booking records handler.
#[instrument(skip(state, admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<RecordsQuery>,
) -> impl IntoResponse {
    let backend = state.backend_for(Some(&admin));
    let filter = AppointmentFilter {
        search: query.search.unwrap_or_default(),
        status: filter_value(query.status.as_deref()),
        service: None,
    };

    let (primary, local, error) = load(&backend, state.local()).await;
    let notice = error.map(|e| load_notice("database records", &e));

    RecordsTemplate {
        ctx,
        records: merge(primary, backend.location(), local, &filter),
        search: filter.search,
        status: filter.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        statuses: AppointmentStatus::ALL,
        notice,
    }
}
