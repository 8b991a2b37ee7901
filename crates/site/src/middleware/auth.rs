//! Authentication extractors.
//!
//! The session holds a [`SessionIdentity`]. Remote identities are used as
//! stored; local ones are re-read from the local accounts document on every
//! request, and a pointer to a deleted account resolves to signed out.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, SessionIdentity, keys};
use crate::state::AppState;

/// Resolved user cached in request extensions.
#[derive(Clone)]
struct ResolvedUser(Option<CurrentUser>);

/// Extractor that requires a signed-in user.
///
/// Redirects to `/login?next=<path>` when nobody is signed in.
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in administrator.
///
/// Redirects to login when signed out, 403 for non-admins.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// Signed in without admin rights.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                Redirect::to(&format!("/login?next={}", urlencoding::encode(&next))).into_response()
            }
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Access denied. Administrator privileges are required.",
            )
                .into_response(),
        }
    }
}

/// Resolve the signed-in user for this request, once.
pub async fn current_user(parts: &mut Parts, state: &AppState) -> Option<CurrentUser> {
    if let Some(ResolvedUser(user)) = parts.extensions.get::<ResolvedUser>() {
        return user.clone();
    }

    let user = match parts.extensions.get::<Session>() {
        Some(session) => resolve(session, state).await,
        None => None,
    };

    parts.extensions.insert(ResolvedUser(user.clone()));
    user
}

async fn resolve(session: &Session, state: &AppState) -> Option<CurrentUser> {
    let identity = session
        .get::<SessionIdentity>(keys::IDENTITY)
        .await
        .ok()
        .flatten()?;

    match identity {
        SessionIdentity::Remote { user } => Some(user),
        SessionIdentity::Local { user_id } => match state.auth().resolve_local(&user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::info!(user_id = %user_id, "Local account no longer exists, signing out");
                if let Err(e) = clear_identity(session).await {
                    tracing::warn!(error = %e, "Failed to clear stale identity");
                }
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve local account");
                None
            }
        },
    }
}

fn login_redirect(parts: &Parts) -> AuthRejection {
    let next = parts
        .uri
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);
    AuthRejection::RedirectToLogin { next }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state)
            .await
            .map(Self)
            .ok_or_else(|| login_redirect(parts))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state)
            .await
            .ok_or_else(|| login_redirect(parts))?;
        if user.is_admin {
            Ok(Self(user))
        } else {
            tracing::warn!(user_id = %user.id, "Non-admin attempted to open the back-office");
            Err(AuthRejection::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts, state).await))
    }
}

/// Store the signed-in identity in the session.
///
/// The session ID is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_identity(
    session: &Session,
    identity: &SessionIdentity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::IDENTITY, identity).await
}

/// Identity to remember for `user`: remote sessions cache the whole user,
/// local accounts only a pointer.
#[must_use]
pub fn identity_for(user: &CurrentUser) -> SessionIdentity {
    if user.has_remote_session() {
        SessionIdentity::Remote { user: user.clone() }
    } else {
        SessionIdentity::Local {
            user_id: user.id.clone(),
        }
    }
}

/// Clear the signed-in identity (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_identity(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<SessionIdentity>(keys::IDENTITY).await?;
    Ok(())
}
