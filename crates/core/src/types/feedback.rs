//! Feedback categories and star ratings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a piece of feedback is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    #[default]
    General,
    Appointment,
    Veterinary,
    Grooming,
    Pharmacy,
    Website,
    Staff,
    Other,
}

impl FeedbackCategory {
    pub const ALL: [Self; 8] = [
        Self::General,
        Self::Appointment,
        Self::Veterinary,
        Self::Grooming,
        Self::Pharmacy,
        Self::Website,
        Self::Staff,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Appointment => "appointment",
            Self::Veterinary => "veterinary",
            Self::Grooming => "grooming",
            Self::Pharmacy => "pharmacy",
            Self::Website => "website",
            Self::Staff => "staff",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "General Feedback",
            Self::Appointment => "Appointment Service",
            Self::Veterinary => "Veterinary Care",
            Self::Grooming => "Pet Grooming",
            Self::Pharmacy => "Pharmacy Services",
            Self::Website => "Website Experience",
            Self::Staff => "Staff Service",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for FeedbackCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown feedback category: {s}"))
    }
}

/// Rating outside the 1-5 star range.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("rating must be between 1 and 5 (got {0})")]
pub struct RatingError(pub u8);

/// A 1-5 star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns `RatingError` when `stars` is outside 1-5.
    pub const fn new(stars: u8) -> Result<Self, RatingError> {
        if stars >= Self::MIN && stars <= Self::MAX {
            Ok(Self(stars))
        } else {
            Err(RatingError(stars))
        }
    }

    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
        assert_eq!(Rating::new(6), Err(RatingError(6)));
    }

    #[test]
    fn test_rating_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<Rating>("7").is_err());
        assert_eq!(serde_json::from_str::<Rating>("3").unwrap().stars(), 3);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "Pharmacy".parse::<FeedbackCategory>().unwrap(),
            FeedbackCategory::Pharmacy
        );
        assert!("billing".parse::<FeedbackCategory>().is_err());
    }
}
