//! Profiles, pets and appointments in local documents.

use chrono::Utc;

use pawmilya_core::{AppointmentId, AppointmentStatus, PetId, ProfileId};

use super::{APPOINTMENTS, LocalStore, PETS};
use crate::models::appointment::AppointmentDetails;
use crate::models::{Appointment, LocalUser, NewAppointment, NewPet, Pet, PetUpdate, Profile, ProfileUpdate};
use crate::store::{ClinicStore, StoreError};

impl LocalStore {
    /// Append a finished record, keeping its id. Used when a remote save
    /// fails and the booking falls back to the local document.
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be written.
    pub async fn append_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.modify(APPOINTMENTS, move |items: &mut Vec<Appointment>| {
            items.push(appointment);
            Ok(())
        })
        .await
    }

    /// Every local appointment record, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be read.
    pub async fn local_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let mut items: Vec<Appointment> = self.load(APPOINTMENTS).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update_appointment(
        &self,
        id: &AppointmentId,
        owner: Option<&ProfileId>,
        change: impl FnOnce(&mut Appointment) + Send,
    ) -> Result<(), StoreError> {
        self.modify(APPOINTMENTS, |items: &mut Vec<Appointment>| {
            let appointment = items
                .iter_mut()
                .find(|a| &a.id == id && owner.is_none_or(|o| a.owner_id.as_ref() == Some(o)))
                .ok_or(StoreError::NotFound)?;
            change(appointment);
            appointment.updated_at = Some(Utc::now());
            Ok(())
        })
        .await
    }
}

impl ClinicStore for LocalStore {
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.list_users().await?.iter().map(LocalUser::to_profile).collect())
    }

    async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        Ok(self.get_user(id).await?.map(|u| u.to_profile()))
    }

    async fn update_profile(&self, id: &ProfileId, update: &ProfileUpdate) -> Result<(), StoreError> {
        self.update_user(id, update).await.map(|_| ())
    }

    async fn delete_profile(&self, id: &ProfileId) -> Result<(), StoreError> {
        self.delete_user(id).await
    }

    async fn list_pets(&self) -> Result<Vec<Pet>, StoreError> {
        let mut pets: Vec<Pet> = self.load(PETS).await?;
        pets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pets)
    }

    async fn list_pets_for_owner(&self, owner: &ProfileId) -> Result<Vec<Pet>, StoreError> {
        let mut pets = self.list_pets().await?;
        pets.retain(|p| &p.owner_id == owner);
        Ok(pets)
    }

    async fn get_pet(&self, id: &PetId, owner: &ProfileId) -> Result<Option<Pet>, StoreError> {
        let pets: Vec<Pet> = self.load(PETS).await?;
        Ok(pets
            .into_iter()
            .find(|p| &p.id == id && &p.owner_id == owner))
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, StoreError> {
        let pet = pet.clone().into_pet(Utc::now());
        self.modify(PETS, move |pets: &mut Vec<Pet>| {
            pets.push(pet.clone());
            Ok(pet)
        })
        .await
    }

    async fn update_pet(
        &self,
        id: &PetId,
        owner: &ProfileId,
        update: &PetUpdate,
    ) -> Result<(), StoreError> {
        self.modify(PETS, |pets: &mut Vec<Pet>| {
            let pet = pets
                .iter_mut()
                .find(|p| &p.id == id && &p.owner_id == owner)
                .ok_or(StoreError::NotFound)?;
            update.apply(pet);
            Ok(())
        })
        .await
    }

    async fn delete_pet(&self, id: &PetId, owner: &ProfileId) -> Result<(), StoreError> {
        self.modify(PETS, |pets: &mut Vec<Pet>| {
            let before = pets.len();
            pets.retain(|p| !(&p.id == id && &p.owner_id == owner));
            if pets.len() == before {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        self.local_appointments().await
    }

    async fn list_appointments_for_owner(
        &self,
        owner: &ProfileId,
    ) -> Result<Vec<Appointment>, StoreError> {
        let mut items: Vec<Appointment> = self.load(APPOINTMENTS).await?;
        items.retain(|a| a.owner_id.as_ref() == Some(owner));
        items.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));
        Ok(items)
    }

    async fn recent_appointments(&self, limit: usize) -> Result<Vec<Appointment>, StoreError> {
        let mut items = self.local_appointments().await?;
        items.truncate(limit);
        Ok(items)
    }

    async fn insert_appointment(
        &self,
        appointment: &NewAppointment,
        details: &AppointmentDetails,
    ) -> Result<Appointment, StoreError> {
        let record = appointment
            .clone()
            .into_appointment(details.clone(), Utc::now());
        self.append_appointment(record.clone()).await?;
        Ok(record)
    }

    async fn update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        self.update_appointment(id, None, move |a| a.status = status).await
    }

    async fn update_appointment_notes(
        &self,
        id: &AppointmentId,
        notes: &str,
        owner: Option<&ProfileId>,
    ) -> Result<(), StoreError> {
        let notes = notes.to_string();
        self.update_appointment(id, owner, move |a| a.user_notes = Some(notes))
            .await
    }

    async fn delete_appointment(&self, id: &AppointmentId) -> Result<(), StoreError> {
        self.modify(APPOINTMENTS, |items: &mut Vec<Appointment>| {
            let before = items.len();
            items.retain(|a| &a.id != id);
            if items.len() == before {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_writable().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_pet(owner: &str, name: &str) -> NewPet {
        NewPet {
            owner_id: ProfileId::new(owner),
            name: name.to_string(),
            kind: "dog".to_string(),
            species: "dog".to_string(),
            breed: Some("Aspin".to_string()),
            weight: Some("8 kg".to_string()),
            birth_date: "2021-04-10".parse().unwrap(),
            gender: "male".to_string(),
        }
    }

    fn booking(owner: &str, date: &str) -> NewAppointment {
        NewAppointment {
            owner_id: Some(ProfileId::new(owner)),
            pet_name: "Bantay".to_string(),
            owner_name: "Juan".to_string(),
            service: "Vaccination".to_string(),
            appointment_date: date.parse().unwrap(),
            time_slot: "9:00 AM".to_string(),
            status: AppointmentStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn test_pet_mutations_are_owner_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let pet = store.insert_pet(&new_pet("u-1", "Bantay")).await.unwrap();
        let stranger = ProfileId::new("u-2");

        assert!(store.get_pet(&pet.id, &stranger).await.unwrap().is_none());
        assert!(matches!(
            store.delete_pet(&pet.id, &stranger).await,
            Err(StoreError::NotFound)
        ));

        let update = PetUpdate {
            weight: Some("9 kg".to_string()),
            ..PetUpdate::default()
        };
        store.update_pet(&pet.id, &pet.owner_id, &update).await.unwrap();
        let stored = store.get_pet(&pet.id, &pet.owner_id).await.unwrap().unwrap();
        assert_eq!(stored.weight.as_deref(), Some("9 kg"));
        assert_eq!(stored.breed.as_deref(), Some("Aspin"));

        store.delete_pet(&pet.id, &pet.owner_id).await.unwrap();
        assert!(store.list_pets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_appointments_sorted_by_date_desc() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let details = AppointmentDetails::default();
        store.insert_appointment(&booking("u-1", "2030-01-02"), &details).await.unwrap();
        store.insert_appointment(&booking("u-1", "2030-03-02"), &details).await.unwrap();
        store.insert_appointment(&booking("u-2", "2030-02-02"), &details).await.unwrap();

        let mine = store
            .list_appointments_for_owner(&ProfileId::new("u-1"))
            .await
            .unwrap();
        let dates: Vec<String> = mine.iter().map(|a| a.appointment_date.to_string()).collect();
        assert_eq!(dates, ["2030-03-02", "2030-01-02"]);
    }

    #[tokio::test]
    async fn test_notes_only_on_own_appointment() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let record = store
            .insert_appointment(&booking("u-1", "2030-01-02"), &AppointmentDetails::default())
            .await
            .unwrap();

        let other = ProfileId::new("u-2");
        assert!(matches!(
            store.update_appointment_notes(&record.id, "hi", Some(&other)).await,
            Err(StoreError::NotFound)
        ));
        store
            .update_appointment_notes(&record.id, "Allergic to chicken", record.owner_id.as_ref())
            .await
            .unwrap();
        store
            .update_appointment_status(&record.id, AppointmentStatus::Completed)
            .await
            .unwrap();

        let all = store.list_appointments().await.unwrap();
        let stored = all.first().unwrap();
        assert_eq!(stored.user_notes.as_deref(), Some("Allergic to chicken"));
        assert_eq!(stored.status, AppointmentStatus::Completed);
    }
}
