//! Pets owned by registered users (`pets` table).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pawmilya_core::{PetAge, PetId, ProfileId, Species};

/// A stored pet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub owner_id: ProfileId,
    pub name: String,
    /// Broad kind (`dog`, `reptile`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Encoded species, e.g. `reptile:iguana`.
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    /// Free text such as `5 kg`.
    #[serde(default)]
    pub weight: Option<String>,
    pub birth_date: NaiveDate,
    pub gender: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Pet {
    #[must_use]
    pub fn decoded_species(&self) -> Species {
        Species::decode(&self.species, Some(&self.kind))
    }

    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> PetAge {
        PetAge::on(self.birth_date, today)
    }
}

/// Insert payload for a new pet.
#[derive(Debug, Clone, Serialize)]
pub struct NewPet {
    pub owner_id: ProfileId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub species: String,
    pub breed: Option<String>,
    pub weight: Option<String>,
    pub birth_date: NaiveDate,
    pub gender: String,
}

impl NewPet {
    /// Materialize a local record with a generated id.
    #[must_use]
    pub fn into_pet(self, now: DateTime<Utc>) -> Pet {
        Pet {
            id: PetId::generate(),
            owner_id: self.owner_id,
            name: self.name,
            kind: self.kind,
            species: self.species,
            breed: self.breed,
            weight: self.weight,
            birth_date: self.birth_date,
            gender: self.gender,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Partial pet update; only provided fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PetUpdate {
    /// Apply to a locally stored pet.
    pub fn apply(&self, pet: &mut Pet) {
        if let Some(name) = &self.name {
            pet.name.clone_from(name);
        }
        if let Some(kind) = &self.kind {
            pet.kind.clone_from(kind);
        }
        if let Some(species) = &self.species {
            pet.species.clone_from(species);
        }
        if let Some(breed) = &self.breed {
            pet.breed = Some(breed.clone());
        }
        if let Some(weight) = &self.weight {
            pet.weight = Some(weight.clone());
        }
        if let Some(birth_date) = self.birth_date {
            pet.birth_date = birth_date;
        }
        if let Some(gender) = &self.gender {
            pet.gender.clone_from(gender);
        }
        pet.updated_at = Some(self.updated_at);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pawmilya_core::PetKind;

    fn sample() -> Pet {
        serde_json::from_str(
            r#"{"id":"pet-1","owner_id":"u-1","name":"Mochi","type":"reptile",
                "species":"reptile:iguana","breed":"Iguana","weight":"1.2 kg",
                "birth_date":"2022-06-01","gender":"female",
                "created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_pet_row_decodes_species() {
        let pet = sample();
        let species = pet.decoded_species();
        assert_eq!(species.kind, PetKind::Reptile);
        assert_eq!(species.detail.as_deref(), Some("iguana"));
    }

    #[test]
    fn test_update_only_touches_provided_fields() {
        let mut pet = sample();
        let update = PetUpdate {
            weight: Some("1.5 kg".to_string()),
            updated_at: Utc::now(),
            ..PetUpdate::default()
        };
        update.apply(&mut pet);
        assert_eq!(pet.weight.as_deref(), Some("1.5 kg"));
        assert_eq!(pet.name, "Mochi");
        assert_eq!(pet.breed.as_deref(), Some("Iguana"));

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("name").is_none());
        assert!(json.get("type").is_none());
    }
}
