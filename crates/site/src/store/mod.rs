//! Persistence for profiles, pets and appointments.
//!
//! [`ClinicStore`] is the single interface handlers use. Two backends
//! implement it:
//!
//! - [`RemoteStore`] - the hosted REST tables, on behalf of a signed-in user
//! - [`LocalStore`] - JSON documents in the site's data directory
//!
//! [`Backend`] picks one per request with a capability check: the remote
//! store is only used when it is configured and the visitor holds a remote
//! session. Everyone else, including local fallback accounts, works
//! against the local documents.
//!
//! # Documents
//!
//! - `local_users.json` - Local fallback accounts
//! - `local_pets.json` - Pets of local accounts
//! - `local_appointments.json` - Local bookings and failed remote saves
//! - `feedback.json` - Visitor feedback (never sent to the remote store)

pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use std::future::Future;

use thiserror::Error;

use pawmilya_core::{AppointmentId, AppointmentStatus, PetId, ProfileId};

use crate::models::appointment::AppointmentDetails;
use crate::models::{
    Appointment, CurrentUser, NewAppointment, NewPet, Pet, PetUpdate, Profile, ProfileUpdate,
};
use crate::remote::{RemoteClient, RemoteError};

/// Errors that can occur in either backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote store rejected or failed the request.
    #[error("remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// Reading or writing a local document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A local document is not valid JSON for its type.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (e.g., duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// One async interface over both backends.
///
/// Pet mutations and lookups are scoped to their owner. Appointment lists
/// come back newest first: by `created_at` for the back-office and by
/// `appointment_date` for an owner's own list.
pub trait ClinicStore: Send + Sync {
    fn list_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, StoreError>> + Send;

    fn get_profile(
        &self,
        id: &ProfileId,
    ) -> impl Future<Output = Result<Option<Profile>, StoreError>> + Send;

    fn update_profile(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_profile(&self, id: &ProfileId)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_pets(&self) -> impl Future<Output = Result<Vec<Pet>, StoreError>> + Send;

    fn list_pets_for_owner(
        &self,
        owner: &ProfileId,
    ) -> impl Future<Output = Result<Vec<Pet>, StoreError>> + Send;

    fn get_pet(
        &self,
        id: &PetId,
        owner: &ProfileId,
    ) -> impl Future<Output = Result<Option<Pet>, StoreError>> + Send;

    fn insert_pet(&self, pet: &NewPet) -> impl Future<Output = Result<Pet, StoreError>> + Send;

    fn update_pet(
        &self,
        id: &PetId,
        owner: &ProfileId,
        update: &PetUpdate,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_pet(
        &self,
        id: &PetId,
        owner: &ProfileId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_appointments(&self)
    -> impl Future<Output = Result<Vec<Appointment>, StoreError>> + Send;

    fn list_appointments_for_owner(
        &self,
        owner: &ProfileId,
    ) -> impl Future<Output = Result<Vec<Appointment>, StoreError>> + Send;

    fn recent_appointments(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Appointment>, StoreError>> + Send;

    fn insert_appointment(
        &self,
        appointment: &NewAppointment,
        details: &AppointmentDetails,
    ) -> impl Future<Output = Result<Appointment, StoreError>> + Send;

    fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Set the visitor's notes. With `owner`, only that owner's row is touched.
    fn update_appointment_notes(
        &self,
        id: &AppointmentId,
        notes: &str,
        owner: Option<&ProfileId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_appointment(
        &self,
        id: &AppointmentId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Connection test.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// The backend chosen for one request.
#[derive(Debug, Clone)]
pub enum Backend {
    Remote(RemoteStore),
    Local(LocalStore),
}

impl Backend {
    /// Capability check for a visitor.
    #[must_use]
    pub fn for_user(
        remote: Option<&RemoteClient>,
        local: &LocalStore,
        user: Option<&CurrentUser>,
    ) -> Self {
        match (remote, user.and_then(|u| u.access_token.as_ref())) {
            (Some(client), Some(token)) => {
                Self::Remote(RemoteStore::new(client.clone(), Some(token.clone())))
            }
            _ => Self::Local(local.clone()),
        }
    }

    /// Backend for background work with no visitor: the remote store under
    /// the anon key when configured.
    #[must_use]
    pub fn service(remote: Option<&RemoteClient>, local: &LocalStore) -> Self {
        remote.map_or_else(
            || Self::Local(local.clone()),
            |client| Self::Remote(RemoteStore::new(client.clone(), None)),
        )
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Where records land, as told to the visitor.
    #[must_use]
    pub const fn location(&self) -> &'static str {
        match self {
            Self::Remote(_) => "database",
            Self::Local(_) => "local storage",
        }
    }
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Self::Remote($store) => $call.await,
            Self::Local($store) => $call.await,
        }
    };
}

impl ClinicStore for Backend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        delegate!(self, s => s.list_profiles())
    }

    async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        delegate!(self, s => s.get_profile(id))
    }

    async fn update_profile(&self, id: &ProfileId, update: &ProfileUpdate) -> Result<(), StoreError> {
        delegate!(self, s => s.update_profile(id, update))
    }

    async fn delete_profile(&self, id: &ProfileId) -> Result<(), StoreError> {
        delegate!(self, s => s.delete_profile(id))
    }

    async fn list_pets(&self) -> Result<Vec<Pet>, StoreError> {
        delegate!(self, s => s.list_pets())
    }

    async fn list_pets_for_owner(&self, owner: &ProfileId) -> Result<Vec<Pet>, StoreError> {
        delegate!(self, s => s.list_pets_for_owner(owner))
    }

    async fn get_pet(&self, id: &PetId, owner: &ProfileId) -> Result<Option<Pet>, StoreError> {
        delegate!(self, s => s.get_pet(id, owner))
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError> {
        delegate!(self, s => s.insert_pet(pet))
    }

    async fn update_pet(
        &self,
        id: &PetId,
        owner: &ProfileId,
        update: &PetUpdate,
    ) -> Result<(), StoreError> {
        delegate!(self, s => s.update_pet(id, owner, update))
    }

    async fn delete_pet(&self, id: &PetId, owner: &ProfileId) -> Result<(), StoreError> {
        delegate!(self, s => s.delete_pet(id, owner))
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        delegate!(self, s => s.list_appointments())
    }

    async fn list_appointments_for_owner(
        &self,
        owner: &ProfileId,
    ) -> Result<Vec<Appointment>, StoreError> {
        delegate!(self, s => s.list_appointments_for_owner(owner))
    }

    async fn recent_appointments(&self, limit: usize) -> Result<Vec<Appointment>, StoreError> {
        delegate!(self, s => s.recent_appointments(limit))
    }

    async fn insert_appointment(
        &self,
        appointment: &NewAppointment,
        details: &AppointmentDetails,
    ) -> Result<Appointment, StoreError> {
        delegate!(self, s => s.insert_appointment(appointment, details))
    }

    async fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        delegate!(self, s => s.update_appointment_status(id, status))
    }

    async fn update_appointment_notes(
        &self,
        id: &AppointmentId,
        notes: &str,
        owner: Option<&ProfileId>,
    ) -> Result<(), StoreError> {
        delegate!(self, s => s.update_appointment_notes(id, notes, owner))
    }

    async fn delete_appointment(&self, id: &AppointmentId) -> Result<(), StoreError> {
        delegate!(self, s => s.delete_appointment(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        delegate!(self, s => s.ping())
    }
}
