//! Back-office user management.

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

use pawmilya_core::{ProfileId, Role, UserStatus};

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Flash, Profile, ProfileUpdate};
use crate::state::AppState;
use crate::store::ClinicStore;
use crate::views::{PageContext, set_flash};

use super::{filter_value, load_notice, report};

/// User filters.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// Role change form. Any label other than an admin spelling means customer.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Parsed user filters.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: String,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    fn from_query(query: UsersQuery) -> Self {
        Self {
            search: query.search.unwrap_or_default(),
            role: query
                .role
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case("all"))
                .map(Role::from_label),
            status: filter_value(query.status.as_deref()),
        }
    }

    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        profile.matches_search(&self.search)
            && self.role.is_none_or(|r| profile.role() == r)
            && self.status.is_none_or(|s| profile.status() == s)
    }
}

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub ctx: PageContext,
    pub users: Vec<Profile>,
    pub search: String,
    pub role: String,
    pub status: String,
    pub statuses: [UserStatus; 3],
    pub notice: Option<String>,
}

/// User list handler.
#[instrument(skip(state, admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<UsersQuery>,
) -> impl IntoResponse {
    let filter = UserFilter::from_query(query);

    let (users, notice) = match state.backend_for(Some(&admin)).list_profiles().await {
        Ok(profiles) => (
            profiles.into_iter().filter(|p| filter.matches(p)).collect(),
            None,
        ),
        Err(e) => (Vec::new(), Some(load_notice("users", &e))),
    };

    UsersTemplate {
        ctx,
        users,
        search: filter.search,
        role: filter.role.map(|r| r.as_str().to_string()).unwrap_or_default(),
        status: filter.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        statuses: UserStatus::ALL,
        notice,
    }
}

/// Change a user's role.
#[instrument(skip(state, admin, session))]
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<RoleForm>,
) -> Redirect {
    let update = ProfileUpdate {
        role: Some(Role::from_label(&form.role)),
        ..ProfileUpdate::now()
    };
    let result = state
        .backend_for(Some(&admin))
        .update_profile(&ProfileId::new(id), &update)
        .await;
    report(&session, result, "Role updated.", "update the role").await;
    Redirect::to("/admin/users")
}

/// Change a user's account status.
#[instrument(skip(state, admin, session))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let Ok(status) = form.status.parse::<UserStatus>() else {
        set_flash(&session, Flash::error("Update failed", "Unknown account status.")).await;
        return Redirect::to("/admin/users");
    };
    let update = ProfileUpdate {
        status: Some(status),
        ..ProfileUpdate::now()
    };
    let result = state
        .backend_for(Some(&admin))
        .update_profile(&ProfileId::new(id), &update)
        .await;
    report(&session, result, "Status updated.", "update the status").await;
    Redirect::to("/admin/users")
}

/// Delete a user profile. Administrators cannot delete themselves.
#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    let id = ProfileId::new(id);
    if id == admin.id {
        set_flash(
            &session,
            Flash::error("Not allowed", "You cannot delete your own account."),
        )
        .await;
        return Redirect::to("/admin/users");
    }

    let result = state.backend_for(Some(&admin)).delete_profile(&id).await;
    if result.is_ok() {
        tracing::info!(profile_id = %id, "User deleted");
    }
    report(&session, result, "User deleted.", "delete the user").await;
    Redirect::to("/admin/users")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(name: &str, role: Option<&str>, status: Option<&str>) -> Profile {
        serde_json::from_value(serde_json::json!({
            "id": format!("id-{name}"),
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "role": role,
            "status": status
        }))
        .unwrap()
    }

    #[test]
    fn test_role_filter_maps_labels() {
        let filter = UserFilter::from_query(UsersQuery {
            role: Some("Administrator".to_string()),
            ..UsersQuery::default()
        });
        assert_eq!(filter.role, Some(Role::Admin));
        assert!(filter.matches(&profile("Ana", Some("admin"), None)));
        assert!(!filter.matches(&profile("Ben", Some("customer"), None)));
        // A missing role column counts as customer.
        assert!(!filter.matches(&profile("Cai", None, None)));
    }

    #[test]
    fn test_status_and_search_filters() {
        let filter = UserFilter::from_query(UsersQuery {
            search: Some("ben@".to_string()),
            status: Some("suspended".to_string()),
            role: Some("all".to_string()),
        });
        assert!(filter.role.is_none());
        assert!(filter.matches(&profile("Ben", None, Some("Suspended"))));
        assert!(!filter.matches(&profile("Ben", None, None)));
        assert!(!filter.matches(&profile("Ana", None, Some("Suspended"))));
    }
}
