//! Account area: profile, pets and the user's own appointments.
//!
//! ```text
//! GET  /profile                       - Profile
//! POST /profile                       - Update name, phone, address
//! GET  /my-pets                       - Pet list with ages and the add form
//! POST /my-pets                       - Add a pet
//! GET  /my-pets/{id}/edit             - Edit form
//! POST /my-pets/{id}                  - Partial update
//! POST /my-pets/{id}/delete           - Delete
//! GET  /my-appointments               - Upcoming and past appointments
//! POST /my-appointments/{id}/notes    - Add or edit notes
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pawmilya_core::{AppointmentId, PetId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, identity_for};
use crate::models::{Appointment, CurrentUser, Flash, Pet, keys};
use crate::routes::appointment::today;
use crate::services::booking::FieldErrors;
use crate::services::pets::GENDERS;
use crate::services::{AuthError, PetForm};
use crate::state::AppState;
use crate::store::{ClinicStore, StoreError};
use crate::views::{Catalog, PageContext, set_flash};

// =============================================================================
// Form Types
// =============================================================================

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Notes form data.
#[derive(Debug, Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub notes: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub user: CurrentUser,
    pub error: Option<String>,
}

/// A pet with its derived age.
pub struct PetRow {
    pub pet: Pet,
    pub species_label: String,
    pub age: String,
}

impl PetRow {
    fn new(pet: Pet) -> Self {
        Self {
            species_label: pet.decoded_species().label(),
            age: pet.age_on(today()).to_string(),
            pet,
        }
    }
}

/// Pet list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/pets.html")]
pub struct PetsTemplate {
    pub ctx: PageContext,
    pub pets: Vec<PetRow>,
    pub form: PetForm,
    pub errors: FieldErrors,
    pub catalog: Catalog,
    pub genders: &'static [&'static str],
    pub max_date: String,
}

/// Pet edit template.
#[derive(Template, WebTemplate)]
#[template(path = "account/pet_edit.html")]
pub struct PetEditTemplate {
    pub ctx: PageContext,
    pub pet: Pet,
    pub form: PetForm,
    pub errors: FieldErrors,
    pub catalog: Catalog,
    pub genders: &'static [&'static str],
    pub max_date: String,
}

/// The user's appointments template.
#[derive(Template, WebTemplate)]
#[template(path = "account/appointments.html")]
pub struct AppointmentsTemplate {
    pub ctx: PageContext,
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

// =============================================================================
// Profile
// =============================================================================

/// Display the profile page.
#[instrument(skip_all)]
pub async fn profile(RequireAuth(user): RequireAuth, ctx: PageContext) -> impl IntoResponse {
    ProfileTemplate {
        ctx,
        user,
        error: None,
    }
}

/// Update name, phone and address, then refresh the session identity.
///
/// # Errors
///
/// Returns error if the update or the session write fails.
#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    match state
        .auth()
        .update_profile(&user, &form.name, &form.phone, &form.address)
        .await
    {
        Ok(updated) => {
            session.insert(keys::IDENTITY, identity_for(&updated)).await?;
            set_flash(
                &session,
                Flash::success("Profile updated", "Your details have been saved."),
            )
            .await;
            Ok(Redirect::to("/profile").into_response())
        }
        Err(AuthError::MissingName) => Ok((
            StatusCode::BAD_REQUEST,
            ProfileTemplate {
                ctx,
                user,
                error: Some("Please enter your name.".to_string()),
            },
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Pets
// =============================================================================

fn max_date() -> String {
    today().format("%Y-%m-%d").to_string()
}

async fn pets_page(
    state: &AppState,
    ctx: PageContext,
    user: &CurrentUser,
    form: PetForm,
    errors: FieldErrors,
) -> Result<PetsTemplate> {
    let pets = state
        .backend_for(Some(user))
        .list_pets_for_owner(&user.id)
        .await?;

    Ok(PetsTemplate {
        ctx,
        pets: pets.into_iter().map(PetRow::new).collect(),
        form,
        errors,
        catalog: Catalog::new(),
        genders: &GENDERS,
        max_date: max_date(),
    })
}

/// Display the user's pets.
///
/// # Errors
///
/// Returns error if the pets cannot be loaded.
#[instrument(skip_all)]
pub async fn pets(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    pets_page(&state, ctx, &user, PetForm::default(), FieldErrors::default()).await
}

/// Add a pet.
///
/// # Errors
///
/// Returns error if the store write fails.
#[instrument(skip_all)]
pub async fn add_pet(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    session: Session,
    Form(form): Form<PetForm>,
) -> Result<Response> {
    let new_pet = match form.to_new_pet(&user.id, today()) {
        Ok(pet) => pet,
        Err(errors) => {
            let page = pets_page(&state, ctx, &user, form, errors).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let pet = state
        .backend_for(Some(&user))
        .insert_pet(&new_pet)
        .await?;
    tracing::info!(pet_id = %pet.id, "Pet added");

    set_flash(
        &session,
        Flash::success("Pet added", format!("{} has been added to your pets.", pet.name)),
    )
    .await;
    Ok(Redirect::to("/my-pets").into_response())
}

async fn owned_pet(state: &AppState, user: &CurrentUser, id: &str) -> Result<Pet> {
    state
        .backend_for(Some(user))
        .get_pet(&PetId::new(id), &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("pet {id}")))
}

/// Display the pet edit form.
///
/// # Errors
///
/// Returns 404 if the pet does not belong to the user.
#[instrument(skip(state, user, ctx))]
pub async fn edit_pet(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let pet = owned_pet(&state, &user, &id).await?;
    Ok(PetEditTemplate {
        ctx,
        form: PetForm::from_pet(&pet),
        pet,
        errors: FieldErrors::default(),
        catalog: Catalog::new(),
        genders: &GENDERS,
        max_date: max_date(),
    })
}

/// Apply a partial pet update.
///
/// # Errors
///
/// Returns 404 if the pet does not belong to the user.
#[instrument(skip(state, user, ctx, session, form))]
pub async fn update_pet(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<PetForm>,
) -> Result<Response> {
    let pet = owned_pet(&state, &user, &id).await?;

    let update = match form.to_update(today()) {
        Ok(update) => update,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                PetEditTemplate {
                    ctx,
                    pet,
                    form,
                    errors,
                    catalog: Catalog::new(),
                    genders: &GENDERS,
                    max_date: max_date(),
                },
            )
                .into_response());
        }
    };

    state
        .backend_for(Some(&user))
        .update_pet(&pet.id, &user.id, &update)
        .await?;

    set_flash(
        &session,
        Flash::success("Pet updated", format!("{}'s details have been saved.", pet.name)),
    )
    .await;
    Ok(Redirect::to("/my-pets").into_response())
}

/// Delete a pet.
///
/// # Errors
///
/// Returns 404 if the pet does not belong to the user.
#[instrument(skip(state, user, session))]
pub async fn delete_pet(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let pet = owned_pet(&state, &user, &id).await?;
    state
        .backend_for(Some(&user))
        .delete_pet(&pet.id, &user.id)
        .await?;
    tracing::info!(pet_id = %pet.id, "Pet deleted");

    set_flash(
        &session,
        Flash::success("Pet removed", format!("{} has been removed.", pet.name)),
    )
    .await;
    Ok(Redirect::to("/my-pets"))
}

// =============================================================================
// Appointments
// =============================================================================

/// Split into upcoming (scheduled, today or later) and everything else.
fn split_upcoming(appointments: Vec<Appointment>) -> (Vec<Appointment>, Vec<Appointment>) {
    let today = today();
    let (mut upcoming, past): (Vec<_>, Vec<_>) = appointments
        .into_iter()
        .partition(|a| a.is_upcoming(today));
    // Soonest first.
    upcoming.sort_by(|a, b| {
        a.appointment_date
            .cmp(&b.appointment_date)
            .then_with(|| a.time_slot.cmp(&b.time_slot))
    });
    (upcoming, past)
}

/// Display the user's appointments.
///
/// # Errors
///
/// Returns error if the appointments cannot be loaded.
#[instrument(skip_all)]
pub async fn appointments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let appointments = state
        .backend_for(Some(&user))
        .list_appointments_for_owner(&user.id)
        .await?;
    let (upcoming, past) = split_upcoming(appointments);

    Ok(AppointmentsTemplate {
        ctx,
        upcoming,
        past,
    })
}

/// Save notes on one of the user's appointments.
///
/// # Errors
///
/// Returns 404 if the appointment does not belong to the user.
#[instrument(skip(state, user, session, form))]
pub async fn update_notes(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<NotesForm>,
) -> Result<Redirect> {
    let result = state
        .backend_for(Some(&user))
        .update_appointment_notes(&AppointmentId::new(id), form.notes.trim(), Some(&user.id))
        .await;

    match result {
        Ok(()) => {
            set_flash(&session, Flash::success("Notes saved", "Your notes have been updated.")).await;
        }
        Err(StoreError::NotFound) => return Err(AppError::NotFound("appointment".to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save appointment notes");
            set_flash(
                &session,
                Flash::error("Could not save notes", "Please try again in a moment."),
            )
            .await;
        }
    }
    Ok(Redirect::to("/my-appointments"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use pawmilya_core::{AppointmentStatus, ProfileId};

    use super::*;
    use crate::models::NewAppointment;
    use crate::models::appointment::AppointmentDetails;

    fn appointment(days_ahead: i64, status: AppointmentStatus) -> Appointment {
        NewAppointment {
            owner_id: Some(ProfileId::new("u-1")),
            pet_name: format!("pet{days_ahead}"),
            owner_name: "Ana".to_string(),
            service: "Vaccination".to_string(),
            appointment_date: today() + Duration::days(days_ahead),
            time_slot: "9:00 AM".to_string(),
            status,
        }
        .into_appointment(AppointmentDetails::default(), Utc::now())
    }

    #[test]
    fn test_cancelled_and_completed_are_never_upcoming() {
        let (upcoming, past) = split_upcoming(vec![
            appointment(5, AppointmentStatus::Scheduled),
            appointment(1, AppointmentStatus::Scheduled),
            appointment(3, AppointmentStatus::Cancelled),
            appointment(3, AppointmentStatus::Completed),
            appointment(-2, AppointmentStatus::Scheduled),
        ]);

        let names: Vec<&str> = upcoming.iter().map(|a| a.pet_name.as_str()).collect();
        assert_eq!(names, vec!["pet1", "pet5"]);
        assert_eq!(past.len(), 3);
    }
}
