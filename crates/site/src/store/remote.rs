//! [`ClinicStore`] over the hosted REST tables.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;

use pawmilya_core::{AppointmentId, AppointmentStatus, PetId, ProfileId};

use super::{ClinicStore, StoreError};
use crate::models::appointment::AppointmentDetails;
use crate::models::{
    AccessToken, Appointment, NewAppointment, NewPet, Pet, PetUpdate, Profile, ProfileUpdate,
};
use crate::remote::{Direction, RemoteClient, RemoteError, RestRequest};

const PROFILES: &str = "profiles";
const PETS: &str = "pets";
const APPOINTMENTS: &str = "appointments";

/// Remote tables, accessed on behalf of one visitor.
///
/// Each request is tried with the visitor's access token first and retried
/// once with the anon key if that fails. Inserts are never retried.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: RemoteClient,
    token: Option<AccessToken>,
}

impl RemoteStore {
    #[must_use]
    pub const fn new(client: RemoteClient, token: Option<AccessToken>) -> Self {
        Self { client, token }
    }

    #[must_use]
    pub const fn client(&self) -> &RemoteClient {
        &self.client
    }

    async fn fetch<T: DeserializeOwned>(&self, request: &RestRequest) -> Result<Vec<T>, StoreError> {
        if let Some(token) = &self.token {
            match self.client.fetch(request, Some(token)).await {
                Ok(rows) => return Ok(rows),
                Err(e) if !request.retries_with_anon_key() => return Err(e.into()),
                Err(e) => tracing::warn!(
                    table = request.table(),
                    error = %e,
                    "Session request failed, retrying with anon key"
                ),
            }
        }
        Ok(self.client.fetch(request, None).await?)
    }

    async fn execute(&self, request: &RestRequest) -> Result<(), StoreError> {
        if let Some(token) = &self.token {
            match self.client.execute(request, Some(token)).await {
                Ok(()) => return Ok(()),
                Err(e) if !request.retries_with_anon_key() => return Err(e.into()),
                Err(e) => tracing::warn!(
                    table = request.table(),
                    error = %e,
                    "Session request failed, retrying with anon key"
                ),
            }
        }
        Ok(self.client.execute(request, None).await?)
    }

    async fn fetch_one<T: DeserializeOwned>(&self, request: &RestRequest) -> Result<Option<T>, StoreError> {
        Ok(self.fetch(request).await?.into_iter().next())
    }

    async fn insert_one<T: DeserializeOwned>(&self, request: &RestRequest) -> Result<T, StoreError> {
        self.fetch_one(request).await?.ok_or_else(|| {
            StoreError::Remote(RemoteError::Parse(format!(
                "insert into {} returned no row",
                request.table()
            )))
        })
    }
}

impl ClinicStore for RemoteStore {
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let request = RestRequest::select(PROFILES).order("created_at", Direction::Desc);
        self.fetch(&request).await
    }

    async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        let request = RestRequest::select(PROFILES).eq("id", id).limit(1);
        self.fetch_one(&request).await
    }

    async fn update_profile(&self, id: &ProfileId, update: &ProfileUpdate) -> Result<(), StoreError> {
        let request = RestRequest::update(PROFILES, update)?.eq("id", id);
        self.execute(&request).await
    }

    async fn delete_profile(&self, id: &ProfileId) -> Result<(), StoreError> {
        let request = RestRequest::delete(PROFILES).eq("id", id);
        self.execute(&request).await
    }

    async fn list_pets(&self) -> Result<Vec<Pet>, StoreError> {
        let request = RestRequest::select(PETS).order("created_at", Direction::Desc);
        self.fetch(&request).await
    }

    async fn list_pets_for_owner(&self, owner: &ProfileId) -> Result<Vec<Pet>, StoreError> {
        let request = RestRequest::select(PETS)
            .eq("owner_id", owner)
            .order("created_at", Direction::Desc);
        self.fetch(&request).await
    }

    async fn get_pet(&self, id: &PetId, owner: &ProfileId) -> Result<Option<Pet>, StoreError> {
        let request = RestRequest::select(PETS)
            .eq("id", id)
            .eq("owner_id", owner)
            .limit(1);
        self.fetch_one(&request).await
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError> {
        let request = RestRequest::insert(PETS, pet)?;
        self.insert_one(&request).await
    }

    async fn update_pet(
        &self,
        id: &PetId,
        owner: &ProfileId,
        update: &PetUpdate,
    ) -> Result<(), StoreError> {
        let request = RestRequest::update(PETS, update)?
            .eq("id", id)
            .eq("owner_id", owner);
        self.execute(&request).await
    }

    async fn delete_pet(&self, id: &PetId, owner: &ProfileId) -> Result<(), StoreError> {
        let request = RestRequest::delete(PETS).eq("id", id).eq("owner_id", owner);
        self.execute(&request).await
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let request = RestRequest::select(APPOINTMENTS).order("created_at", Direction::Desc);
        self.fetch(&request).await
    }

    async fn list_appointments_for_owner(
        &self,
        owner: &ProfileId,
    ) -> Result<Vec<Appointment>, StoreError> {
        let request = RestRequest::select(APPOINTMENTS)
            .eq("owner_id", owner)
            .order("appointment_date", Direction::Desc);
        self.fetch(&request).await
    }

    async fn recent_appointments(&self, limit: usize) -> Result<Vec<Appointment>, StoreError> {
        let request = RestRequest::select(APPOINTMENTS)
            .order("created_at", Direction::Desc)
            .limit(limit);
        self.fetch(&request).await
    }

    async fn insert_appointment(
        &self,
        appointment: &NewAppointment,
        _details: &AppointmentDetails,
    ) -> Result<Appointment, StoreError> {
        let request = RestRequest::insert(APPOINTMENTS, appointment)?;
        self.insert_one(&request).await
    }

    async fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        let patch = json!({ "status": status, "updated_at": Utc::now() });
        let request = RestRequest::update(APPOINTMENTS, &patch)?.eq("id", id);
        self.execute(&request).await
    }

    async fn update_appointment_notes(
        &self,
        id: &AppointmentId,
        notes: &str,
        owner: Option<&ProfileId>,
    ) -> Result<(), StoreError> {
        let patch = json!({ "user_notes": notes, "updated_at": Utc::now() });
        let mut request = RestRequest::update(APPOINTMENTS, &patch)?.eq("id", id);
        if let Some(owner) = owner {
            request = request.eq("owner_id", owner);
        }
        self.execute(&request).await
    }

    async fn delete_appointment(&self, id: &AppointmentId) -> Result<(), StoreError> {
        let request = RestRequest::delete(APPOINTMENTS).eq("id", id);
        self.execute(&request).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.client.ping().await?)
    }
}
