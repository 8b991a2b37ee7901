//! Per-page context shared by every full-page template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use pawmilya_core::{BloodTest, PetKind, ReptileType, ServiceCategory, TimeSlot, breeds_for};

use crate::middleware::current_user;
use crate::models::{CurrentUser, Flash, keys};
use crate::state::AppState;

/// Navigation user, one-shot flash and current path for the base layout.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub path: String,
}

impl PageContext {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// Whether `prefix` is the active nav section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(prefix)
        }
    }

    /// Display name for the header greeting.
    #[must_use]
    pub fn user_name(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.name.as_str())
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state).await;
        let flash = match parts.extensions.get::<Session>() {
            Some(session) => take_flash(session).await,
            None => None,
        };

        Ok(Self {
            user,
            flash,
            path: parts.uri.path().to_string(),
        })
    }
}

/// Queue a flash for the next rendered page. Failures are logged.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(keys::FLASH).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read flash message");
        None
    })
}

/// An option in a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Breed options for one species.
#[derive(Debug, Clone)]
pub struct BreedGroup {
    pub species: &'static str,
    pub label: &'static str,
    pub breeds: &'static [&'static str],
}

/// Select options for the booking and pet forms.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub species: Vec<Choice>,
    pub reptile_types: Vec<Choice>,
    pub breeds: Vec<BreedGroup>,
    pub services: Vec<Choice>,
    pub time_slots: Vec<Choice>,
    pub blood_tests: Vec<Choice>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            species: PetKind::ALL
                .into_iter()
                .map(|k| Choice::new(k.as_str(), k.label()))
                .collect(),
            reptile_types: ReptileType::ALL
                .into_iter()
                .map(|r| Choice::new(r.as_str(), r.label()))
                .collect(),
            breeds: PetKind::ALL
                .into_iter()
                .filter(|k| *k != PetKind::Reptile)
                .map(|k| BreedGroup {
                    species: k.as_str(),
                    label: k.label(),
                    breeds: breeds_for(k),
                })
                .collect(),
            services: ServiceCategory::ALL
                .into_iter()
                .map(|s| Choice::new(s.label(), s.label()))
                .collect(),
            time_slots: TimeSlot::all()
                .map(|t| Choice::new(t.label(), t.label()))
                .collect(),
            blood_tests: BloodTest::ALL
                .into_iter()
                .map(|b| Choice::new(b.as_str(), b.label()))
                .collect(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_options() {
        let catalog = Catalog::new();
        assert_eq!(catalog.species.len(), 6);
        assert_eq!(catalog.services.len(), 12);
        assert_eq!(catalog.time_slots.len(), 9);
        assert!(catalog.breeds.iter().all(|g| g.species != "reptile"));
        assert!(
            catalog
                .breeds
                .iter()
                .all(|g| g.breeds.last() == Some(&pawmilya_core::OTHER_BREED))
        );
    }

    #[test]
    fn test_is_active() {
        let ctx = PageContext {
            path: "/admin/users".to_string(),
            ..PageContext::default()
        };
        assert!(ctx.is_active("/admin"));
        assert!(!ctx.is_active("/"));
    }
}
