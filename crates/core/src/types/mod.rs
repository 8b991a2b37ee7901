//! Core types for PawMilya.
//!
//! This module provides type-safe wrappers for the clinic's domain concepts.

pub mod age;
pub mod catalog;
pub mod email;
pub mod feedback;
pub mod id;
pub mod price;
pub mod species;
pub mod status;

pub use age::PetAge;
pub use catalog::{BloodTest, ServiceCategory, TimeSlot};
pub use email::{Email, EmailError};
pub use feedback::{FeedbackCategory, Rating, RatingError};
pub use id::*;
pub use price::Price;
pub use species::{
    OTHER_BREED, PetKind, ReptileType, Species, breeds_for, effective_breed, match_breed,
};
pub use status::*;
