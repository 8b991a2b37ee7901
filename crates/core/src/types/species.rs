//! Pet species, the encoded species column and per-species breed lists.
//!
//! The species column carries a sub-type for reptiles and free text for
//! "other" animals using a `kind:detail` prefix, e.g. `reptile:iguana` or
//! `other:ferret`. Plain kinds are stored bare (`dog`).

use serde::{Deserialize, Serialize};

/// Breed value meaning "not in the list, see free text".
pub const OTHER_BREED: &str = "Other";

/// Broad kind of animal as chosen on the booking and pet forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetKind {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Reptile,
    Other,
}

impl PetKind {
    pub const ALL: [Self; 6] = [
        Self::Dog,
        Self::Cat,
        Self::Bird,
        Self::Rabbit,
        Self::Reptile,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Bird => "bird",
            Self::Rabbit => "rabbit",
            Self::Reptile => "reptile",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Bird => "Bird",
            Self::Rabbit => "Rabbit",
            Self::Reptile => "Reptile",
            Self::Other => "Other",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(needle))
    }
}

/// Reptile sub-types offered when the kind is `reptile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReptileType {
    Lizard,
    Iguana,
    Turtle,
    Chameleon,
}

impl ReptileType {
    pub const ALL: [Self; 4] = [Self::Lizard, Self::Iguana, Self::Turtle, Self::Chameleon];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lizard => "lizard",
            Self::Iguana => "iguana",
            Self::Turtle => "turtle",
            Self::Chameleon => "chameleon",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lizard => "Lizard",
            Self::Iguana => "Iguana",
            Self::Turtle => "Turtle",
            Self::Chameleon => "Chameleon",
        }
    }
}

/// A species selection: kind plus optional detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    pub kind: PetKind,
    /// Reptile type for reptiles, free text for "other", unused otherwise.
    pub detail: Option<String>,
}

impl Species {
    #[must_use]
    pub const fn plain(kind: PetKind) -> Self {
        Self { kind, detail: None }
    }

    /// Build from form fields; the detail only counts for the kind it belongs to.
    #[must_use]
    pub fn from_form(kind: PetKind, reptile_type: &str, other_species: &str) -> Self {
        let detail = match kind {
            PetKind::Reptile => non_blank(reptile_type),
            PetKind::Other => non_blank(other_species),
            _ => None,
        };
        Self { kind, detail }
    }

    /// Encode for the species column.
    #[must_use]
    pub fn encode(&self) -> String {
        match (&self.kind, &self.detail) {
            (PetKind::Reptile | PetKind::Other, Some(detail)) => {
                format!("{}:{detail}", self.kind.as_str())
            }
            (kind, _) => kind.as_str().to_string(),
        }
    }

    /// Decode a stored species value.
    ///
    /// `type_hint` is the pet's separate `type` column, preferred for bare
    /// values. Unknown bare values become `other` with the value as detail.
    #[must_use]
    pub fn decode(stored: &str, type_hint: Option<&str>) -> Self {
        let stored = stored.trim();
        if let Some(rest) = stored.strip_prefix("reptile:") {
            return Self {
                kind: PetKind::Reptile,
                detail: non_blank(rest),
            };
        }
        if let Some(rest) = stored.strip_prefix("other:") {
            return Self {
                kind: PetKind::Other,
                detail: non_blank(rest),
            };
        }

        let bare = type_hint.and_then(non_blank).unwrap_or_else(|| stored.to_string());
        match PetKind::parse(&bare) {
            Some(kind) => Self::plain(kind),
            None => Self {
                kind: PetKind::Other,
                detail: non_blank(&bare),
            },
        }
    }

    /// Human label, e.g. `Reptile (Iguana)`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} ({})", self.kind.label(), capitalize(detail)),
            None => self.kind.label().to_string(),
        }
    }

    /// Reptile type selection, when the detail is one of the offered types.
    #[must_use]
    pub fn reptile_type(&self) -> Option<ReptileType> {
        if self.kind != PetKind::Reptile {
            return None;
        }
        let detail = self.detail.as_deref()?;
        ReptileType::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(detail))
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Breed options for a kind. Every list ends with "Mixed Breed" and "Other".
#[must_use]
pub const fn breeds_for(kind: PetKind) -> &'static [&'static str] {
    match kind {
        PetKind::Dog => &[
            "Golden Retriever",
            "Labrador Retriever",
            "German Shepherd",
            "Bulldog",
            "Poodle",
            "Beagle",
            "Rottweiler",
            "Yorkshire Terrier",
            "Dachshund",
            "Siberian Husky",
            "Boxer",
            "Border Collie",
            "Chihuahua",
            "Shih Tzu",
            "Mixed Breed",
            OTHER_BREED,
        ],
        PetKind::Cat => &[
            "Persian",
            "Maine Coon",
            "Siamese",
            "Ragdoll",
            "British Shorthair",
            "Abyssinian",
            "Birman",
            "Oriental Shorthair",
            "American Shorthair",
            "Scottish Fold",
            "Sphynx",
            "Russian Blue",
            "Mixed Breed",
            OTHER_BREED,
        ],
        PetKind::Bird => &[
            "Budgerigar",
            "Cockatiel",
            "Cockatoo",
            "African Grey",
            "Macaw",
            "Parakeet",
            "Canary",
            "Finch",
            "Lovebird",
            "Conure",
            "Mixed Breed",
            OTHER_BREED,
        ],
        PetKind::Rabbit => &[
            "Netherland Dwarf",
            "Holland Lop",
            "Mini Rex",
            "Lionhead",
            "Angora",
            "Flemish Giant",
            "Rex",
            "Mini Lop",
            "English Lop",
            "French Lop",
            "Mixed Breed",
            OTHER_BREED,
        ],
        PetKind::Reptile => &[
            "Bearded Dragon",
            "Leopard Gecko",
            "Ball Python",
            "Corn Snake",
            "Iguana",
            "Chameleon",
            "Turtle",
            "Tortoise",
            "Monitor Lizard",
            "Boa",
            "Mixed Breed",
            OTHER_BREED,
        ],
        PetKind::Other => &[
            "Hamster",
            "Guinea Pig",
            "Ferret",
            "Chinchilla",
            "Hedgehog",
            "Sugar Glider",
            "Rat",
            "Mouse",
            "Gerbil",
            "Mixed Breed",
            OTHER_BREED,
        ],
    }
}

/// Map a stored breed onto the form's breed select.
///
/// Returns the matching list entry (case-insensitive), or `"Other"` plus the
/// stored text for the free-text field.
#[must_use]
pub fn match_breed(kind: PetKind, stored: &str) -> (String, Option<String>) {
    let stored = stored.trim();
    breeds_for(kind)
        .iter()
        .find(|b| b.eq_ignore_ascii_case(stored))
        .map_or_else(
            || (OTHER_BREED.to_string(), Some(stored.to_string())),
            |b| ((*b).to_string(), None),
        )
}

/// Resolve the breed select and its free-text companion into one value.
#[must_use]
pub fn effective_breed(breed: &str, breed_other: &str) -> Option<String> {
    if breed.trim() == OTHER_BREED {
        non_blank(breed_other).or_else(|| Some(OTHER_BREED.to_string()))
    } else {
        non_blank(breed)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_prefixes_detail() {
        let reptile = Species::from_form(PetKind::Reptile, "iguana", "ignored");
        assert_eq!(reptile.encode(), "reptile:iguana");

        let other = Species::from_form(PetKind::Other, "lizard", "Ferret");
        assert_eq!(other.encode(), "other:Ferret");

        let dog = Species::from_form(PetKind::Dog, "lizard", "Ferret");
        assert_eq!(dog.encode(), "dog");
    }

    #[test]
    fn test_reptile_without_type_is_bare() {
        assert_eq!(Species::from_form(PetKind::Reptile, " ", "").encode(), "reptile");
    }

    #[test]
    fn test_decode_prefixes() {
        let reptile = Species::decode("reptile:turtle", Some("reptile"));
        assert_eq!(reptile.kind, PetKind::Reptile);
        assert_eq!(reptile.reptile_type(), Some(ReptileType::Turtle));

        let other = Species::decode("other:Sugar Glider", None);
        assert_eq!(other.kind, PetKind::Other);
        assert_eq!(other.detail.as_deref(), Some("Sugar Glider"));
    }

    #[test]
    fn test_decode_prefers_type_column_for_bare_values() {
        assert_eq!(Species::decode("Cat", Some("cat")).kind, PetKind::Cat);
        assert_eq!(Species::decode("dog", None).kind, PetKind::Dog);
        let unknown = Species::decode("hamster", Some("hamster"));
        assert_eq!(unknown.kind, PetKind::Other);
        assert_eq!(unknown.detail.as_deref(), Some("hamster"));
    }

    #[test]
    fn test_label() {
        assert_eq!(Species::decode("reptile:iguana", None).label(), "Reptile (Iguana)");
        assert_eq!(Species::decode("dog", None).label(), "Dog");
    }

    #[test]
    fn test_every_breed_list_ends_with_mixed_and_other() {
        for kind in PetKind::ALL {
            let list = breeds_for(kind);
            assert_eq!(&list[list.len() - 2..], ["Mixed Breed", OTHER_BREED]);
        }
    }

    #[test]
    fn test_match_breed_case_insensitive() {
        assert_eq!(
            match_breed(PetKind::Dog, "golden retriever"),
            ("Golden Retriever".to_string(), None)
        );
        assert_eq!(
            match_breed(PetKind::Dog, "Aspin"),
            (OTHER_BREED.to_string(), Some("Aspin".to_string()))
        );
    }

    #[test]
    fn test_effective_breed() {
        assert_eq!(effective_breed("Other", "Aspin").as_deref(), Some("Aspin"));
        assert_eq!(effective_breed("Beagle", "ignored").as_deref(), Some("Beagle"));
        assert_eq!(effective_breed("", ""), None);
    }
}
