//! Status and role enums for clinic entities.
//!
//! Values coming back from the remote store are not always consistently
//! cased, so every enum here parses case-insensitively while serializing to
//! its canonical column value.

use serde::{Deserialize, Serialize};

/// Appointment lifecycle: `scheduled` -> `completed` | `cancelled`.
///
/// Restricted to these three values by the remote table's check constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [Self; 3] = [Self::Scheduled, Self::Completed, Self::Cancelled];

    /// Column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human label for tables and badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the appointment can still happen.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid appointment status: {s}")),
        }
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Review state of a feedback entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FeedbackStatus {
    #[default]
    New,
    Reviewed,
    InProgress,
    Resolved,
}

impl FeedbackStatus {
    pub const ALL: [Self; 4] = [Self::New, Self::Reviewed, Self::InProgress, Self::Resolved];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reviewed => "reviewed",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Reviewed => "Reviewed",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "reviewed" => Ok(Self::Reviewed),
            "in_progress" | "in-progress" | "in progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(format!("invalid feedback status: {s}")),
        }
    }
}

impl TryFrom<String> for FeedbackStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Account role stored on a profile.
///
/// Anything that is not an admin spelling collapses to `Customer`, matching
/// how the back-office maps its role picker onto the `admin|customer` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

/// Role spellings treated as administrators.
pub const ADMIN_ROLE_NAMES: &[&str] = &["admin", "Admin", "administrator", "Administrator"];

impl Role {
    /// Map any role label onto the stored role.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if ADMIN_ROLE_NAMES.contains(&label.trim()) {
            Self::Admin
        } else {
            Self::Customer
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

/// Account standing as managed from the back-office users page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Suspended];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Suspended => "Suspended",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("invalid user status: {s}")),
        }
    }
}

impl TryFrom<String> for UserStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_status_parses_any_case() {
        assert_eq!(
            "Scheduled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Scheduled
        );
        assert_eq!(
            "CANCELLED".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!("pending".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_appointment_status_serializes_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Completed);
    }

    #[test]
    fn test_only_scheduled_is_open() {
        assert!(AppointmentStatus::Scheduled.is_open());
        assert!(!AppointmentStatus::Completed.is_open());
        assert!(!AppointmentStatus::Cancelled.is_open());
    }

    #[test]
    fn test_feedback_status_in_progress() {
        assert_eq!(
            serde_json::to_string(&FeedbackStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            "in_progress".parse::<FeedbackStatus>().unwrap(),
            FeedbackStatus::InProgress
        );
    }

    #[test]
    fn test_role_from_label() {
        for label in ADMIN_ROLE_NAMES {
            assert_eq!(Role::from_label(label), Role::Admin);
        }
        assert_eq!(Role::from_label("Veterinarian"), Role::Customer);
        assert_eq!(Role::from_label("Client"), Role::Customer);
        assert_eq!(Role::from_label("ADMIN"), Role::Customer);
    }

    #[test]
    fn test_role_deserializes_leniently() {
        let role: Role = serde_json::from_str("\"Administrator\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_user_status_roundtrip_labels() {
        assert_eq!("suspended".parse::<UserStatus>().unwrap(), UserStatus::Suspended);
        assert_eq!(
            serde_json::to_string(&UserStatus::Inactive).unwrap(),
            "\"Inactive\""
        );
    }
}
