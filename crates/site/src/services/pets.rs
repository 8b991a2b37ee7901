//! Pet registration and edit forms.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pawmilya_core::{PetKind, ProfileId, Species, effective_breed, match_breed};

use crate::models::{NewPet, Pet, PetUpdate};
use crate::services::booking::{FieldErrors, filled};

/// Genders offered on the pet form.
pub const GENDERS: [&str; 2] = ["male", "female"];

/// Pet form as posted by the add and edit dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetForm {
    pub name: String,
    pub species: String,
    pub reptile_type: String,
    pub other_species: String,
    pub breed: String,
    pub breed_other: String,
    pub weight: String,
    pub birth_date: String,
    pub gender: String,
}

impl PetForm {
    /// Edit form showing a pet's current values.
    #[must_use]
    pub fn from_pet(pet: &Pet) -> Self {
        let species = pet.decoded_species();
        let mut form = Self {
            name: pet.name.clone(),
            species: species.kind.as_str().to_string(),
            weight: pet.weight.clone().unwrap_or_default(),
            birth_date: pet.birth_date.format("%Y-%m-%d").to_string(),
            gender: pet.gender.clone(),
            ..Self::default()
        };
        match species.kind {
            PetKind::Reptile => form.reptile_type = species.detail.unwrap_or_default(),
            PetKind::Other => form.other_species = species.detail.unwrap_or_default(),
            _ => {}
        }
        if let Some(stored) = pet.breed.as_deref().and_then(filled) {
            let (breed, other) = match_breed(species.kind, &stored);
            form.breed = breed;
            form.breed_other = other.unwrap_or_default();
        }
        form
    }

    #[must_use]
    pub fn is_breed_selected(&self, species: &str, breed: &str) -> bool {
        self.species == species && self.breed == breed
    }

    #[must_use]
    pub fn is_gender(&self, gender: &str) -> bool {
        self.gender.eq_ignore_ascii_case(gender)
    }

    fn species(&self, kind: PetKind) -> Species {
        Species::from_form(kind, &self.reptile_type, &self.other_species)
    }

    fn breed(&self, kind: PetKind) -> Option<String> {
        if kind == PetKind::Reptile {
            None
        } else {
            effective_breed(&self.breed, &self.breed_other)
        }
    }

    fn birth_date(&self, today: NaiveDate, errors: &mut FieldErrors) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d") {
            Ok(date) if date > today => {
                errors.add("birth_date", "Birth date cannot be in the future");
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("birth_date", "Please enter a birth date");
                None
            }
        }
    }

    /// Validate a new pet for `owner`. All fields but breed and weight are
    /// required.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn to_new_pet(&self, owner: &ProfileId, today: NaiveDate) -> Result<NewPet, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = filled(&self.name);
        if name.is_none() {
            errors.add("name", "Pet name is required");
        }
        let kind = PetKind::parse(&self.species);
        if kind.is_none() {
            errors.add("species", "Please select a species");
        }
        let birth_date = self.birth_date(today, &mut errors);
        let gender = GENDERS
            .iter()
            .find(|g| g.eq_ignore_ascii_case(self.gender.trim()))
            .map(|g| (*g).to_string());
        if gender.is_none() {
            errors.add("gender", "Please select a gender");
        }

        match (name, kind, birth_date, gender) {
            (Some(name), Some(kind), Some(birth_date), Some(gender)) if errors.is_empty() => {
                Ok(NewPet {
                    owner_id: owner.clone(),
                    name,
                    kind: kind.as_str().to_string(),
                    species: self.species(kind).encode(),
                    breed: self.breed(kind),
                    weight: filled(&self.weight),
                    birth_date,
                    gender,
                })
            }
            _ => Err(errors),
        }
    }

    /// Partial update: only non-empty fields are changed.
    ///
    /// # Errors
    ///
    /// Returns the failing fields when a submitted value is invalid.
    pub fn to_update(&self, today: NaiveDate) -> Result<PetUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();
        let mut update = PetUpdate {
            name: filled(&self.name),
            weight: filled(&self.weight),
            updated_at: Utc::now(),
            ..PetUpdate::default()
        };

        if filled(&self.species).is_some() {
            match PetKind::parse(&self.species) {
                Some(kind) => {
                    update.kind = Some(kind.as_str().to_string());
                    update.species = Some(self.species(kind).encode());
                    update.breed = self.breed(kind);
                }
                None => errors.add("species", "Please select a species"),
            }
        } else {
            update.breed = effective_breed(&self.breed, &self.breed_other);
        }
        if filled(&self.birth_date).is_some() {
            update.birth_date = self.birth_date(today, &mut errors);
        }
        if let Some(gender) = filled(&self.gender) {
            match GENDERS.iter().find(|g| g.eq_ignore_ascii_case(&gender)) {
                Some(g) => update.gender = Some((*g).to_string()),
                None => errors.add("gender", "Please select a gender"),
            }
        }

        if errors.is_empty() { Ok(update) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        "2025-06-01".parse().unwrap()
    }

    fn form() -> PetForm {
        PetForm {
            name: "Mochi".to_string(),
            species: "reptile".to_string(),
            reptile_type: "iguana".to_string(),
            breed: "Labrador Retriever".to_string(),
            birth_date: "2022-06-01".to_string(),
            gender: "Female".to_string(),
            ..PetForm::default()
        }
    }

    #[test]
    fn test_new_pet_encodes_species_and_drops_reptile_breed() {
        let pet = form().to_new_pet(&ProfileId::new("u-1"), today()).unwrap();
        assert_eq!(pet.kind, "reptile");
        assert_eq!(pet.species, "reptile:iguana");
        assert_eq!(pet.breed, None);
        assert_eq!(pet.gender, "female");
    }

    #[test]
    fn test_new_pet_rejects_future_birth_date() {
        let errors = PetForm {
            birth_date: "2030-01-01".to_string(),
            ..form()
        }
        .to_new_pet(&ProfileId::new("u-1"), today())
        .unwrap_err();
        assert!(errors.get("birth_date").is_some());
    }

    #[test]
    fn test_update_only_sends_filled_fields() {
        let update = PetForm {
            weight: "6 kg".to_string(),
            ..PetForm::default()
        }
        .to_update(today())
        .unwrap();
        assert_eq!(update.weight.as_deref(), Some("6 kg"));
        assert!(update.name.is_none());
        assert!(update.species.is_none());

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("name").is_none());
        assert!(json.get("updated_at").is_some());
    }

    #[test]
    fn test_edit_form_round_trips_custom_breed() {
        let pet = PetForm {
            species: "dog".to_string(),
            breed: "Other".to_string(),
            breed_other: "Aspin".to_string(),
            ..form()
        }
        .to_new_pet(&ProfileId::new("u-1"), today())
        .unwrap()
        .into_pet(Utc::now());

        let edit = PetForm::from_pet(&pet);
        assert_eq!(edit.species, "dog");
        assert_eq!(edit.breed, "Other");
        assert_eq!(edit.breed_other, "Aspin");
    }
}
