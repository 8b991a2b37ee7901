//! Login, signup and logout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_identity, identity_for, set_identity};
use crate::models::Flash;
use crate::services::AuthError;
use crate::state::AppState;
use crate::views::{PageContext, set_flash};

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Signup form data.
#[derive(Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Where to go after login.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub email: String,
    pub next: String,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
}

/// Only same-site paths are followed after login.
///
/// Browsers read `\` as `/`, so `/\host` is as off-site as `//host`.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
#[instrument(skip(ctx))]
pub async fn login_page(ctx: PageContext, Query(query): Query<NextQuery>) -> impl IntoResponse {
    LoginTemplate {
        ctx,
        error: None,
        email: String::new(),
        next: safe_next(query.next.as_deref()),
    }
}

/// Handle login: remote identity first, then local accounts.
///
/// # Errors
///
/// Returns error if the session cannot be written.
#[instrument(skip(state, ctx, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    ctx: PageContext,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(Some(&form.next));

    match state.auth().login(&form.email, &form.password).await {
        Ok(user) => {
            set_identity(&session, &identity_for(&user)).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            set_flash(
                &session,
                Flash::success("Welcome back!", format!("Signed in as {}", user.name)),
            )
            .await;
            Ok(Redirect::to(&next).into_response())
        }
        Err(e) => {
            let message = match e {
                AuthError::InvalidCredentials | AuthError::InvalidEmail(_) => {
                    "Invalid email or password.".to_string()
                }
                other => {
                    tracing::error!(error = %other, "Login failed");
                    "Login failed. Please try again.".to_string()
                }
            };
            Ok((
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    ctx,
                    error: Some(message),
                    email: form.email,
                    next,
                },
            )
                .into_response())
        }
    }
}

// =============================================================================
// Signup
// =============================================================================

/// Display the signup page.
#[instrument(skip(ctx))]
pub async fn signup_page(ctx: PageContext) -> impl IntoResponse {
    SignupTemplate {
        ctx,
        error: None,
        name: String::new(),
        email: String::new(),
    }
}

/// Create a local account and sign it in.
///
/// # Errors
///
/// Returns error if the session cannot be written.
#[instrument(skip(state, ctx, session, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    ctx: PageContext,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let result = if form.password == form.confirm_password {
        state
            .auth()
            .signup(&form.name, &form.email, &form.password)
            .await
    } else {
        Err(AuthError::WeakPassword("passwords do not match".to_string()))
    };

    match result {
        Ok(user) => {
            set_identity(&session, &identity_for(&user)).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            set_flash(
                &session,
                Flash::success("Account created", format!("Welcome to PawMilya, {}!", user.name)),
            )
            .await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            let (status, message) = match e {
                AuthError::UserAlreadyExists => (StatusCode::CONFLICT, e.to_string()),
                AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg),
                AuthError::MissingName => (StatusCode::BAD_REQUEST, "Please enter your name.".to_string()),
                AuthError::InvalidEmail(_) => (
                    StatusCode::BAD_REQUEST,
                    "Please enter a valid email address.".to_string(),
                ),
                other => {
                    tracing::error!(error = %other, "Signup failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Signup failed. Please try again.".to_string(),
                    )
                }
            };
            Ok((
                status,
                SignupTemplate {
                    ctx,
                    error: Some(message),
                    name: form.name,
                    email: form.email,
                },
            )
                .into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out of the remote session (best effort) and forget the identity.
///
/// # Errors
///
/// Returns error if the session cannot be written.
#[instrument(skip(state, user, session))]
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Redirect> {
    state.auth().logout(user.as_ref()).await;
    clear_identity(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::success("Signed out", "You have been logged out.")).await;
    Ok(Redirect::to("/"))
}
