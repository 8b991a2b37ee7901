//! Back-office pet directory.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use pawmilya_core::{PetKind, ProfileId};

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Pet, Profile};
use crate::routes::appointment::today;
use crate::state::AppState;
use crate::store::ClinicStore;
use crate::views::PageContext;

use super::load_notice;

/// Pet filters.
#[derive(Debug, Default, Deserialize)]
pub struct PetsQuery {
    pub search: Option<String>,
    pub species: Option<String>,
}

/// A pet joined with its owner's profile.
#[derive(Debug, Clone)]
pub struct PetView {
    pub pet: Pet,
    pub species_label: String,
    pub age: String,
    pub owner_name: String,
    pub owner_email: String,
}

impl PetView {
    fn matches(&self, search: &str, kind: Option<PetKind>) -> bool {
        let q = search.trim().to_lowercase();
        let text_match = q.is_empty()
            || self.pet.name.to_lowercase().contains(&q)
            || self
                .pet
                .breed
                .as_deref()
                .is_some_and(|b| b.to_lowercase().contains(&q))
            || self.owner_name.to_lowercase().contains(&q)
            || self.owner_email.to_lowercase().contains(&q);
        text_match && kind.is_none_or(|k| self.pet.decoded_species().kind == k)
    }
}

/// Pet directory template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/pets.html")]
pub struct PetsTemplate {
    pub ctx: PageContext,
    pub pets: Vec<PetView>,
    pub search: String,
    pub species: String,
    pub kinds: [PetKind; 6],
    pub notice: Option<String>,
}

/// Join pets to owner profiles. Missing owners show as "Unknown".
fn join_owners(pets: Vec<Pet>, profiles: &[Profile]) -> Vec<PetView> {
    let owners: HashMap<&ProfileId, &Profile> = profiles.iter().map(|p| (&p.id, p)).collect();
    let today = today();

    pets.into_iter()
        .map(|pet| {
            let owner = owners.get(&pet.owner_id);
            PetView {
                species_label: pet.decoded_species().label(),
                age: pet.age_on(today).to_string(),
                owner_name: owner.map_or("Unknown", |o| o.display_name()).to_string(),
                owner_email: owner
                    .and_then(|o| o.email.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                pet,
            }
        })
        .collect()
}

/// Pet directory handler.
#[instrument(skip(state, admin, ctx))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ctx: PageContext,
    Query(query): Query<PetsQuery>,
) -> impl IntoResponse {
    let backend = state.backend_for(Some(&admin));
    let (pets, profiles) = tokio::join!(backend.list_pets(), backend.list_profiles());

    let mut notice = None;
    let pets = pets.unwrap_or_else(|e| {
        notice = Some(load_notice("pets", &e));
        Vec::new()
    });
    let profiles = profiles.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load owner profiles");
        Vec::new()
    });

    let search = query.search.unwrap_or_default();
    let kind = query.species.as_deref().and_then(PetKind::parse);

    PetsTemplate {
        ctx,
        pets: join_owners(pets, &profiles)
            .into_iter()
            .filter(|p| p.matches(&search, kind))
            .collect(),
        search,
        species: kind.map(|k| k.as_str().to_string()).unwrap_or_default(),
        kinds: PetKind::ALL,
        notice,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pet(name: &str, owner: &str, species: &str, breed: Option<&str>) -> Pet {
        serde_json::from_value(serde_json::json!({
            "id": format!("pet-{name}"),
            "owner_id": owner,
            "name": name,
            "type": species.split(':').next().unwrap(),
            "species": species,
            "breed": breed,
            "birth_date": "2020-01-15",
            "gender": "male"
        }))
        .unwrap()
    }

    fn profile(id: &str, name: &str) -> Profile {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "email": format!("{id}@example.com")
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_owner_is_unknown() {
        let views = join_owners(
            vec![pet("Bantay", "u-1", "dog", Some("Aspin")), pet("Ghost", "gone", "cat", None)],
            &[profile("u-1", "Juan")],
        );
        assert_eq!(views.first().unwrap().owner_name, "Juan");
        assert_eq!(views.first().unwrap().owner_email, "u-1@example.com");
        assert_eq!(views.last().unwrap().owner_name, "Unknown");
        assert_eq!(views.last().unwrap().owner_email, "Unknown");
    }

    #[test]
    fn test_search_covers_breed_and_owner() {
        let views = join_owners(
            vec![
                pet("Bantay", "u-1", "dog", Some("Aspin")),
                pet("Iggy", "u-2", "reptile:iguana", None),
            ],
            &[profile("u-1", "Juan"), profile("u-2", "Maria")],
        );
        let hits = |q: &str, kind| views.iter().filter(|v| v.matches(q, kind)).count();
        assert_eq!(hits("aspin", None), 1);
        assert_eq!(hits("maria", None), 1);
        assert_eq!(hits("", Some(PetKind::Reptile)), 1);
        assert_eq!(hits("juan", Some(PetKind::Reptile)), 0);
    }
}
