//! Appointment booking route handlers.
//!
//! ```text
//! GET  /appointment            - Booking form (?pet=, ?service=, ?edit=1, ?reschedule=1)
//! POST /appointment            - Validate and show the review step
//! POST /appointment/confirm    - Save the reviewed booking
//! GET  /appointment/success    - Outcome of the last booking
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pawmilya_core::{PetId, ServiceCategory};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Flash, Pet, keys};
use crate::services::booking::{FieldErrors, SaveLocation, ValidBooking};
use crate::services::{
    AppointmentForm, BookingError, BookingService, Confirmation, LastBooking,
};
use crate::state::AppState;
use crate::store::ClinicStore;
use crate::views::{Catalog, PageContext, set_flash};

/// Today's date on the clinic's clock.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

// =============================================================================
// Query Types
// =============================================================================

/// Booking form query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    /// Prefill from a registered pet.
    pub pet: Option<String>,
    /// Preselect a service by label.
    pub service: Option<String>,
    /// Return from the review step with the pending form.
    pub edit: Option<String>,
    /// Rebook the last confirmed booking with a new date and time.
    pub reschedule: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Booking form template.
#[derive(Template, WebTemplate)]
#[template(path = "appointment/form.html")]
pub struct FormTemplate {
    pub ctx: PageContext,
    pub form: AppointmentForm,
    pub errors: FieldErrors,
    pub pets: Vec<Pet>,
    pub catalog: Catalog,
    pub min_date: String,
}

/// Review ("confirm your appointment") template.
#[derive(Template, WebTemplate)]
#[template(path = "appointment/review.html")]
pub struct ReviewTemplate {
    pub ctx: PageContext,
    pub booking: ValidBooking,
}

/// Booking outcome template.
#[derive(Template, WebTemplate)]
#[template(path = "appointment/success.html")]
pub struct SuccessTemplate {
    pub ctx: PageContext,
    pub booking: ValidBooking,
    pub appointment_id: String,
    pub saved_to: SaveLocation,
}

// =============================================================================
// Helpers
// =============================================================================

async fn owner_pets(state: &AppState, user: &CurrentUser) -> Vec<Pet> {
    match state
        .backend_for(Some(user))
        .list_pets_for_owner(&user.id)
        .await
    {
        Ok(pets) => pets,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load pets for booking form");
            Vec::new()
        }
    }
}

async fn render_form(
    state: &AppState,
    ctx: PageContext,
    user: &CurrentUser,
    form: AppointmentForm,
    errors: FieldErrors,
) -> FormTemplate {
    FormTemplate {
        ctx,
        pets: owner_pets(state, user).await,
        form,
        errors,
        catalog: Catalog::new(),
        min_date: today().format("%Y-%m-%d").to_string(),
    }
}

async fn initial_form(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    query: &FormQuery,
) -> Result<AppointmentForm> {
    if query.edit.is_some()
        && let Some(form) = session.get::<AppointmentForm>(keys::PENDING_BOOKING).await?
    {
        return Ok(form);
    }

    if query.reschedule.is_some()
        && let Some(last) = session.get::<LastBooking>(keys::LAST_BOOKING).await?
    {
        return Ok(last.form.rescheduled());
    }

    let mut form = match query.pet.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let pet = state
                .backend_for(Some(user))
                .get_pet(&PetId::new(id), &user.id)
                .await?;
            match pet {
                Some(pet) => AppointmentForm::from_pet(&pet, user),
                None => {
                    tracing::info!(pet_id = %id, "Autofill pet not found for owner");
                    AppointmentForm::for_user(user)
                }
            }
        }
        None => AppointmentForm::for_user(user),
    };

    if let Some(service) = query.service.as_deref().and_then(ServiceCategory::from_label) {
        form.service = service.label().to_string();
    }
    Ok(form)
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the booking form.
///
/// # Errors
///
/// Returns error if the session or the pet lookup fails.
#[instrument(skip(state, ctx, session, user))]
pub async fn form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    session: Session,
    Query(query): Query<FormQuery>,
) -> Result<impl IntoResponse> {
    let form = initial_form(&state, &session, &user, &query).await?;
    Ok(render_form(&state, ctx, &user, form, FieldErrors::default()).await)
}

/// Validate the form and show the review step.
///
/// # Errors
///
/// Returns error if the session cannot be written.
#[instrument(skip_all)]
pub async fn review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    session: Session,
    Form(form): Form<AppointmentForm>,
) -> Result<Response> {
    match form.validate(today()) {
        Ok(booking) => {
            session.insert(keys::PENDING_BOOKING, &form).await?;
            Ok(ReviewTemplate { ctx, booking }.into_response())
        }
        Err(BookingError::Invalid(errors)) => {
            tracing::debug!(fields = errors.len(), "Booking form has errors");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                render_form(&state, ctx, &user, form, errors).await,
            )
                .into_response())
        }
    }
}

/// Save the reviewed booking, falling back to local storage when the
/// remote save fails.
///
/// # Errors
///
/// Returns error if the session or the local fallback cannot be written.
#[instrument(skip_all)]
pub async fn confirm(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    session: Session,
) -> Result<Response> {
    let Some(form) = session
        .remove::<AppointmentForm>(keys::PENDING_BOOKING)
        .await?
    else {
        set_flash(
            &session,
            Flash::error("Nothing to confirm", "Please fill in the booking form first."),
        )
        .await;
        return Ok(Redirect::to("/appointment").into_response());
    };

    let booking = match form.validate(today()) {
        Ok(booking) => booking,
        Err(BookingError::Invalid(errors)) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                render_form(&state, ctx, &user, form, errors).await,
            )
                .into_response());
        }
    };

    let backend = state.backend_for(Some(&user));
    let outcome = BookingService::new(&backend, state.local())
        .submit(&booking, &user)
        .await?;
    state.feed().invalidate().await;

    add_breadcrumb(
        "booking",
        "Appointment booked",
        Some(&[("saved_to", outcome.saved_to.label())]),
    );

    if let Err(e) = state
        .email()
        .send_confirmation(booking.email.as_str(), &Confirmation::from_booking(&booking))
        .await
    {
        tracing::warn!(error = %e, "Failed to send confirmation email");
    }

    let flash = match &outcome.remote_failure {
        Some(reason) => Flash::error(
            "Database save failed",
            format!("Your appointment was saved to local storage instead. ({reason})"),
        ),
        None => Flash::success(
            "Appointment booked!",
            format!(
                "{} is booked for {} on {} at {}.",
                booking.pet_name,
                booking.service.label(),
                booking.appointment_date.format("%B %-d, %Y"),
                booking.time_slot.label()
            ),
        ),
    };
    set_flash(&session, flash).await;

    session
        .insert(
            keys::LAST_BOOKING,
            LastBooking {
                form,
                appointment_id: outcome.appointment.id.to_string(),
                saved_to: outcome.saved_to,
            },
        )
        .await?;

    Ok(Redirect::to("/appointment/success").into_response())
}

/// Show where the last booking was saved.
///
/// # Errors
///
/// Returns error if the session cannot be read.
#[instrument(skip_all)]
pub async fn success(
    RequireAuth(_user): RequireAuth,
    ctx: PageContext,
    session: Session,
) -> Result<Response> {
    let Some(last) = session.get::<LastBooking>(keys::LAST_BOOKING).await? else {
        return Ok(Redirect::to("/appointment").into_response());
    };

    // Past dates are accepted here: the page may be revisited after the day.
    let booking = match last.form.validate(NaiveDate::MIN) {
        Ok(booking) => booking,
        Err(_) => return Ok(Redirect::to("/appointment").into_response()),
    };

    Ok(SuccessTemplate {
        ctx,
        booking,
        appointment_id: last.appointment_id,
        saved_to: last.saved_to,
    }
    .into_response())
}
