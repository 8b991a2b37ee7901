//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (remote ping, else local store writable)
//!
//! # Public pages
//! GET  /                       - Home page
//! GET  /services               - Services and pricing
//! GET  /faq                    - Frequently asked questions
//! GET  /{slug}                 - Service info page (pet-grooming, vaccination, ...)
//! GET  /feedback               - Feedback form
//! POST /feedback               - Submit feedback
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action
//! POST /logout                 - Logout action
//!
//! # Booking (requires auth)
//! GET  /appointment            - Booking form (?pet, ?service, ?edit, ?reschedule)
//! POST /appointment            - Validate and show the review step
//! POST /appointment/confirm    - Save the reviewed booking
//! GET  /appointment/success    - Confirmation page
//!
//! # Account (requires auth)
//! GET  /profile                - Profile
//! POST /profile                - Update profile
//! GET  /my-pets                - Pets
//! POST /my-pets                - Add pet
//! GET  /my-pets/{id}/edit      - Edit pet form
//! POST /my-pets/{id}           - Update pet
//! POST /my-pets/{id}/delete    - Delete pet
//! GET  /my-appointments        - Own appointments
//! POST /my-appointments/{id}/notes - Save notes
//!
//! # Admin (requires admin)
//! GET  /admin                  - Dashboard
//! GET  /admin/appointments     - Appointments (?search, ?status, ?service, ?refresh)
//! POST /admin/appointments/{id}/status
//! POST /admin/appointments/{id}/notes
//! POST /admin/appointments/{id}/delete
//! GET  /admin/booking-records  - Backend and local records
//! GET  /admin/pets             - Pets with owners
//! GET  /admin/users            - Users
//! POST /admin/users/{id}/role
//! POST /admin/users/{id}/status
//! POST /admin/users/{id}/delete
//! GET  /admin/feedback         - Feedback and rating stats
//! POST /admin/feedback/{id}/status
//! POST /admin/feedback/{id}/delete
//! ```

pub mod account;
pub mod admin;
pub mod appointment;
pub mod auth;
pub mod feedback;
pub mod home;
pub mod pages;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;
use crate::store::ClinicStore;

/// Create the booking routes router.
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(appointment::form).post(appointment::review))
        .route("/confirm", post(appointment::confirm))
        .route("/success", get(appointment::success))
}

/// Create the pet routes router.
pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::pets).post(account::add_pet))
        .route("/{id}", post(account::update_pet))
        .route("/{id}/edit", get(account::edit_pet))
        .route("/{id}/delete", post(account::delete_pet))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard::index))
        .route("/appointments", get(admin::appointments::index))
        .route(
            "/appointments/{id}/status",
            post(admin::appointments::update_status),
        )
        .route(
            "/appointments/{id}/notes",
            post(admin::appointments::update_notes),
        )
        .route("/appointments/{id}/delete", post(admin::appointments::delete))
        .route("/booking-records", get(admin::records::index))
        .route("/pets", get(admin::pets::index))
        .route("/users", get(admin::users::index))
        .route("/users/{id}/role", post(admin::users::update_role))
        .route("/users/{id}/status", post(admin::users::update_status))
        .route("/users/{id}/delete", post(admin::users::delete))
        .route("/feedback", get(admin::feedback::index))
        .route("/feedback/{id}/status", post(admin::feedback::update_status))
        .route("/feedback/{id}/delete", post(admin::feedback::delete))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Public pages
        .route("/", get(home::home))
        .route("/services", get(pages::services))
        .route("/faq", get(pages::faq))
        .route("/feedback", get(feedback::form).post(feedback::submit))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        // Booking
        .nest("/appointment", appointment_routes())
        // Account
        .route("/profile", get(account::profile).post(account::update_profile))
        .nest("/my-pets", pet_routes())
        .route("/my-appointments", get(account::appointments))
        .route("/my-appointments/{id}/notes", post(account::update_notes))
        // Back-office
        .nest("/admin", admin_routes())
        // Service info pages; unknown slugs are 404
        .route("/{slug}", get(pages::service_page))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Pings the remote store when one is configured, otherwise checks that the
/// local data directory is writable. Returns 503 when the check fails.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let result = if state.remote().is_some() {
        state.service_backend().ping().await
    } else {
        state.local().check_writable().await
    };

    match result {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
