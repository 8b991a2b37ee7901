//! Appointment booking: form validation, prefill and submission.
//!
//! Submission goes to the visitor's backend. When that is the remote store
//! and the connection test or the insert fails, the same record is appended
//! to the local appointments document instead and the outcome carries the
//! failure so the page can say so.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pawmilya_core::{
    AppointmentStatus, BloodTest, Email, PetKind, ProfileId, ServiceCategory, Species, TimeSlot,
    effective_breed, match_breed,
};

use crate::models::appointment::AppointmentDetails;
use crate::models::{Appointment, CurrentUser, NewAppointment, Pet};
use crate::store::{Backend, ClinicStore, LocalStore, StoreError};

/// Field-level validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub(crate) fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Errors that can occur when booking.
#[derive(Debug, Error)]
pub enum BookingError {
    /// One or more fields are invalid.
    #[error("{} field(s) need attention", .0.len())]
    Invalid(FieldErrors),
}

/// Raw booking form as posted, also kept in the session between review and
/// confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentForm {
    pub pet_name: String,
    pub species: String,
    pub reptile_type: String,
    pub other_species: String,
    pub breed: String,
    pub breed_other: String,
    pub weight: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub appointment_date: String,
    pub time_slot: String,
    pub blood_test: String,
    pub additional_info: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub pet_name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub weight: Option<String>,
    pub owner_name: String,
    pub email: Email,
    pub phone: String,
    pub service: ServiceCategory,
    pub appointment_date: NaiveDate,
    pub time_slot: TimeSlot,
    pub blood_test: BloodTest,
    pub additional_info: Option<String>,
}

pub(crate) fn filled(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl AppointmentForm {
    /// Empty form with the owner fields taken from the signed-in user.
    #[must_use]
    pub fn for_user(user: &CurrentUser) -> Self {
        Self {
            owner_name: user.name.clone(),
            email: user.email.to_string(),
            phone: user.phone.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Form prefilled from a registered pet.
    ///
    /// The stored species prefix is decoded into the species and its detail
    /// field, and a breed that is not on the species' list becomes "Other"
    /// with the stored text in the free-text field.
    #[must_use]
    pub fn from_pet(pet: &Pet, user: &CurrentUser) -> Self {
        let species = pet.decoded_species();
        let mut form = Self::for_user(user);
        form.pet_name.clone_from(&pet.name);
        form.species = species.kind.as_str().to_string();

        match species.kind {
            PetKind::Reptile => {
                form.reptile_type = species
                    .reptile_type()
                    .map(|r| r.as_str().to_string())
                    .or_else(|| species.detail.clone())
                    .unwrap_or_default();
            }
            PetKind::Other => form.other_species = species.detail.clone().unwrap_or_default(),
            _ => {}
        }

        if species.kind != PetKind::Reptile
            && let Some(stored) = pet.breed.as_deref().and_then(filled)
        {
            let (breed, other) = match_breed(species.kind, &stored);
            form.breed = breed;
            form.breed_other = other.unwrap_or_default();
        }
        form.weight = pet.weight.clone().unwrap_or_default();
        form
    }

    /// Whether `breed` of `species` is the selected breed option.
    #[must_use]
    pub fn is_breed_selected(&self, species: &str, breed: &str) -> bool {
        self.species == species && self.breed == breed
    }

    /// Same pet and owner, new date and time.
    #[must_use]
    pub fn rescheduled(&self) -> Self {
        Self {
            appointment_date: String::new(),
            time_slot: String::new(),
            ..self.clone()
        }
    }

    /// Validate against the catalogue. Dates before `today` are rejected.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Invalid` with a message per failing field.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidBooking, BookingError> {
        let mut errors = FieldErrors::default();

        let pet_name = filled(&self.pet_name);
        if pet_name.is_none() {
            errors.add("pet_name", "Pet name is required");
        }

        let kind = PetKind::parse(&self.species);
        if kind.is_none() {
            errors.add("species", "Please select a species");
        }

        let owner_name = filled(&self.owner_name);
        if owner_name.is_none() {
            errors.add("owner_name", "Owner name is required");
        }

        let email = Email::normalized(&self.email).ok();
        if email.is_none() {
            errors.add("email", "Please enter a valid email address");
        }

        let phone = filled(&self.phone);
        if phone.is_none() {
            errors.add("phone", "Phone number is required");
        }

        let service = ServiceCategory::from_label(&self.service);
        if service.is_none() {
            errors.add("service", "Please select a service");
        }

        let appointment_date = match NaiveDate::parse_from_str(self.appointment_date.trim(), "%Y-%m-%d") {
            Ok(date) if date < today => {
                errors.add("appointment_date", "Please choose today or a later date");
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("appointment_date", "Please choose a date");
                None
            }
        };

        let time_slot = self.time_slot.parse::<TimeSlot>().ok();
        if time_slot.is_none() {
            errors.add("time_slot", "Please select a time slot");
        }

        let blood_test = BloodTest::from_form(&self.blood_test);
        if blood_test.is_none() {
            errors.add("blood_test", "Please select a blood test option");
        }

        match (
            pet_name,
            kind,
            owner_name,
            email,
            phone,
            service,
            appointment_date,
            time_slot,
            blood_test,
        ) {
            (
                Some(pet_name),
                Some(kind),
                Some(owner_name),
                Some(email),
                Some(phone),
                Some(service),
                Some(appointment_date),
                Some(time_slot),
                Some(blood_test),
            ) if errors.is_empty() => {
                let species = Species::from_form(kind, &self.reptile_type, &self.other_species);
                let breed = if kind == PetKind::Reptile {
                    None
                } else {
                    effective_breed(&self.breed, &self.breed_other)
                };
                Ok(ValidBooking {
                    pet_name,
                    species,
                    breed,
                    weight: filled(&self.weight),
                    owner_name,
                    email,
                    phone,
                    service,
                    appointment_date,
                    time_slot,
                    blood_test,
                    additional_info: filled(&self.additional_info),
                })
            }
            _ => Err(BookingError::Invalid(errors)),
        }
    }
}

impl ValidBooking {
    /// Insert payload for the `appointments` table.
    #[must_use]
    pub fn to_new_appointment(&self, owner_id: Option<ProfileId>) -> NewAppointment {
        NewAppointment {
            owner_id,
            pet_name: self.pet_name.clone(),
            owner_name: self.owner_name.clone(),
            service: self.service.label().to_string(),
            appointment_date: self.appointment_date,
            time_slot: self.time_slot.label(),
            status: AppointmentStatus::Scheduled,
        }
    }

    /// Form fields kept alongside a local record.
    #[must_use]
    pub fn details(&self) -> AppointmentDetails {
        AppointmentDetails {
            pet_species: Some(self.species.encode()),
            breed: self.breed.clone(),
            weight: self.weight.clone(),
            owner_email: Some(self.email.to_string()),
            owner_phone: Some(self.phone.clone()),
            blood_test: Some(self.blood_test.as_str().to_string()),
            additional_info: self.additional_info.clone(),
        }
    }
}

/// Where a booking ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveLocation {
    Database,
    LocalStorage,
}

impl SaveLocation {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::LocalStorage => "local storage",
        }
    }
}

/// Result of a submission.
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub appointment: Appointment,
    pub saved_to: SaveLocation,
    /// Why the remote save failed, when it did.
    pub remote_failure: Option<String>,
}

/// What the success page and "change schedule" need after confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastBooking {
    pub form: AppointmentForm,
    pub appointment_id: String,
    pub saved_to: SaveLocation,
}

/// Submits validated bookings.
pub struct BookingService<'a> {
    backend: &'a Backend,
    local: &'a LocalStore,
}

impl<'a> BookingService<'a> {
    #[must_use]
    pub const fn new(backend: &'a Backend, local: &'a LocalStore) -> Self {
        Self { backend, local }
    }

    /// Save a booking for `owner`.
    ///
    /// There is no idempotency key: submitting twice books twice.
    ///
    /// # Errors
    ///
    /// Returns error only if the local document cannot be written.
    pub async fn submit(
        &self,
        booking: &ValidBooking,
        owner: &CurrentUser,
    ) -> Result<BookingOutcome, StoreError> {
        let new = booking.to_new_appointment(Some(owner.id.clone()));
        let details = booking.details();

        let remote = match self.backend {
            Backend::Remote(store) => store,
            Backend::Local(store) => {
                let appointment = store.insert_appointment(&new, &details).await?;
                tracing::info!(appointment_id = %appointment.id, "Appointment saved locally");
                return Ok(BookingOutcome {
                    appointment,
                    saved_to: SaveLocation::LocalStorage,
                    remote_failure: None,
                });
            }
        };

        let attempt = match remote.ping().await {
            Ok(()) => remote.insert_appointment(&new, &details).await,
            Err(e) => Err(e),
        };

        match attempt {
            Ok(appointment) => {
                tracing::info!(appointment_id = %appointment.id, "Appointment saved to remote store");
                Ok(BookingOutcome {
                    appointment,
                    saved_to: SaveLocation::Database,
                    remote_failure: None,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote appointment save failed, saving locally");
                let appointment = new.into_appointment(details, Utc::now());
                self.local.append_appointment(appointment.clone()).await?;
                Ok(BookingOutcome {
                    appointment,
                    saved_to: SaveLocation::LocalStorage,
                    remote_failure: Some(e.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pawmilya_core::{PetId, Role};
    use secrecy::SecretString;

    use crate::config::RemoteConfig;
    use crate::models::AccessToken;
    use crate::remote::RemoteClient;
    use crate::store::RemoteStore;

    fn today() -> NaiveDate {
        "2030-05-01".parse().unwrap()
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: ProfileId::new("u-1"),
            name: "Ana Reyes".to_string(),
            email: Email::parse("ana@example.com").unwrap(),
            role: Role::Customer,
            phone: Some("0917 555 0101".to_string()),
            address: None,
            is_admin: false,
            access_token: None,
        }
    }

    fn valid_form() -> AppointmentForm {
        AppointmentForm {
            pet_name: "Bantay".to_string(),
            species: "dog".to_string(),
            breed: "Other".to_string(),
            breed_other: "Aspin".to_string(),
            weight: "8 kg".to_string(),
            owner_name: "Ana Reyes".to_string(),
            email: "Ana@Example.com".to_string(),
            phone: "0917 555 0101".to_string(),
            service: "Vaccination".to_string(),
            appointment_date: "2030-05-01".to_string(),
            time_slot: "10:00 AM".to_string(),
            blood_test: "basic".to_string(),
            ..AppointmentForm::default()
        }
    }

    fn pet(kind: &str, species: &str, breed: Option<&str>) -> Pet {
        Pet {
            id: PetId::new("p-1"),
            owner_id: ProfileId::new("u-1"),
            name: "Mochi".to_string(),
            kind: kind.to_string(),
            species: species.to_string(),
            breed: breed.map(str::to_string),
            weight: Some("1.2 kg".to_string()),
            birth_date: "2022-01-01".parse().unwrap(),
            gender: "female".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_valid_form_maps_to_columns() {
        let booking = valid_form().validate(today()).unwrap();
        assert_eq!(booking.breed.as_deref(), Some("Aspin"));
        assert_eq!(booking.email.as_str(), "ana@example.com");

        let new = booking.to_new_appointment(Some(ProfileId::new("u-1")));
        assert_eq!(new.service, "Vaccination");
        assert_eq!(new.time_slot, "10:00 AM");
        assert_eq!(new.status, AppointmentStatus::Scheduled);
        assert_eq!(booking.details().blood_test.as_deref(), Some("basic"));
    }

    #[test]
    fn test_missing_fields_are_reported_per_field() {
        let form = AppointmentForm {
            email: "not-an-email".to_string(),
            appointment_date: "2030-04-30".to_string(),
            ..AppointmentForm::default()
        };
        let BookingError::Invalid(errors) = form.validate(today()).unwrap_err();
        for field in [
            "pet_name",
            "species",
            "owner_name",
            "email",
            "phone",
            "service",
            "appointment_date",
            "time_slot",
        ] {
            assert!(errors.get(field).is_some(), "expected error for {field}");
        }
        assert_eq!(
            errors.get("appointment_date"),
            Some("Please choose today or a later date")
        );
        assert!(errors.get("blood_test").is_none());
    }

    #[test]
    fn test_species_detail_only_counts_for_its_kind() {
        let form = AppointmentForm {
            species: "cat".to_string(),
            reptile_type: "iguana".to_string(),
            other_species: "axolotl".to_string(),
            ..valid_form()
        };
        let booking = form.validate(today()).unwrap();
        assert_eq!(booking.species.encode(), "cat");

        let form = AppointmentForm {
            species: "reptile".to_string(),
            reptile_type: "turtle".to_string(),
            ..valid_form()
        };
        let booking = form.validate(today()).unwrap();
        assert_eq!(booking.species.encode(), "reptile:turtle");
        assert!(booking.breed.is_none());
    }

    #[test]
    fn test_prefill_from_reptile_pet() {
        let form = AppointmentForm::from_pet(&pet("reptile", "reptile:iguana", None), &user());
        assert_eq!(form.species, "reptile");
        assert_eq!(form.reptile_type, "iguana");
        assert_eq!(form.weight, "1.2 kg");
        assert_eq!(form.owner_name, "Ana Reyes");
    }

    #[test]
    fn test_prefill_from_other_pet() {
        let form = AppointmentForm::from_pet(&pet("other", "other:hedgehog", None), &user());
        assert_eq!(form.species, "other");
        assert_eq!(form.other_species, "hedgehog");
    }

    #[test]
    fn test_prefill_breed_matching() {
        let form = AppointmentForm::from_pet(&pet("dog", "dog", Some("golden retriever")), &user());
        assert_eq!(form.breed, "Golden Retriever");
        assert_eq!(form.breed_other, "");

        let form = AppointmentForm::from_pet(&pet("dog", "dog", Some("Aspin")), &user());
        assert_eq!(form.breed, "Other");
        assert_eq!(form.breed_other, "Aspin");
    }

    #[test]
    fn test_rescheduled_clears_date_and_time() {
        let form = valid_form().rescheduled();
        assert!(form.appointment_date.is_empty());
        assert!(form.time_slot.is_empty());
        assert_eq!(form.pet_name, "Bantay");
    }

    #[tokio::test]
    async fn test_local_backend_saves_without_failure() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let backend = Backend::Local(local.clone());
        let booking = valid_form().validate(today()).unwrap();

        let outcome = BookingService::new(&backend, &local)
            .submit(&booking, &user())
            .await
            .unwrap();
        assert_eq!(outcome.saved_to, SaveLocation::LocalStorage);
        assert!(outcome.remote_failure.is_none());
        assert_eq!(local.local_appointments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local_document() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::new(dir.path());
        let client = RemoteClient::new(&RemoteConfig {
            url: "http://127.0.0.1:9".parse().unwrap(),
            anon_key: SecretString::from("k9Xv2LmQ8rT4wZ7p".to_string()),
        })
        .unwrap();
        let backend = Backend::Remote(RemoteStore::new(client, Some(AccessToken::new("t"))));
        let booking = valid_form().validate(today()).unwrap();

        let outcome = BookingService::new(&backend, &local)
            .submit(&booking, &user())
            .await
            .unwrap();
        assert_eq!(outcome.saved_to, SaveLocation::LocalStorage);
        assert!(outcome.remote_failure.is_some());

        let saved = local.local_appointments().await.unwrap();
        let record = saved.first().unwrap();
        assert_eq!(record.pet_name, "Bantay");
        assert_eq!(record.owner_id, Some(ProfileId::new("u-1")));
        assert_eq!(record.time_slot, "10:00 AM");
        assert_eq!(record.service, "Vaccination");
        assert_eq!(record.details.owner_email.as_deref(), Some("ana@example.com"));
    }
}
