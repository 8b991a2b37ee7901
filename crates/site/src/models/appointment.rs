//! Booked clinic visits (`appointments` table and the local fallback copy).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pawmilya_core::{AppointmentId, AppointmentStatus, ProfileId};

/// A stored appointment row.
///
/// Rows saved to the local fallback document also carry the form fields the
/// remote table has no columns for; those live in [`AppointmentDetails`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(default)]
    pub owner_id: Option<ProfileId>,
    pub pet_name: String,
    #[serde(default)]
    pub owner_name: String,
    /// Service display label.
    pub service: String,
    pub appointment_date: NaiveDate,
    #[serde(default)]
    pub time_slot: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub user_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub details: AppointmentDetails,
}

/// Booking form fields kept only in local records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_test: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl Appointment {
    /// Scheduled and not in the past. Cancelled or completed visits never count.
    #[must_use]
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.status == AppointmentStatus::Scheduled && self.appointment_date >= today
    }

    /// Key used to count distinct clients: the owner id, else the email.
    #[must_use]
    pub fn client_key(&self) -> Option<String> {
        self.owner_id
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| self.details.owner_email.as_ref().map(|e| e.to_lowercase()))
    }

    /// Case-insensitive match on pet name, owner name, service or id.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || self.pet_name.to_lowercase().contains(&q)
            || self.owner_name.to_lowercase().contains(&q)
            || self.service.to_lowercase().contains(&q)
            || self.id.as_str().to_lowercase().contains(&q)
    }
}

/// Insert payload; field names are exactly the remote column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub owner_id: Option<ProfileId>,
    pub pet_name: String,
    pub owner_name: String,
    pub service: String,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub status: AppointmentStatus,
}

impl NewAppointment {
    /// Materialize a record with a generated id.
    #[must_use]
    pub fn into_appointment(self, details: AppointmentDetails, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id: AppointmentId::generate(),
            owner_id: self.owner_id,
            pet_name: self.pet_name,
            owner_name: self.owner_name,
            service: self.service,
            appointment_date: self.appointment_date,
            time_slot: self.time_slot,
            status: self.status,
            user_notes: None,
            created_at: Some(now),
            updated_at: Some(now),
            details,
        }
    }
}

/// Back-office list filter.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub search: String,
    pub status: Option<AppointmentStatus>,
    pub service: Option<String>,
}

impl AppointmentFilter {
    #[must_use]
    pub fn matches(&self, appointment: &Appointment) -> bool {
        appointment.matches_search(&self.search)
            && self.status.is_none_or(|s| appointment.status == s)
            && self
                .service
                .as_deref()
                .is_none_or(|s| appointment.service.eq_ignore_ascii_case(s))
    }
}
