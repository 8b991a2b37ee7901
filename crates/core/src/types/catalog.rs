//! The clinic's bookable catalogue: services, time slots and blood tests.

use serde::{Deserialize, Serialize, Serializer};

use super::price::Price;

/// A bookable service category.
///
/// Stored in the `appointments.service` column by its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ServiceCategory {
    GeneralConsultation,
    Vaccination,
    PetGrooming,
    DentalCare,
    Surgery,
    EmergencyCare,
    Hematology,
    PharmacyServices,
    DigitalXRay,
    BloodChemistry,
    Tonometry,
    SurgeryWithGasAnesthetic,
}

impl ServiceCategory {
    pub const ALL: [Self; 12] = [
        Self::GeneralConsultation,
        Self::Vaccination,
        Self::PetGrooming,
        Self::DentalCare,
        Self::Surgery,
        Self::EmergencyCare,
        Self::Hematology,
        Self::PharmacyServices,
        Self::DigitalXRay,
        Self::BloodChemistry,
        Self::Tonometry,
        Self::SurgeryWithGasAnesthetic,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralConsultation => "General Consultation",
            Self::Vaccination => "Vaccination",
            Self::PetGrooming => "Pet Grooming",
            Self::DentalCare => "Dental Care",
            Self::Surgery => "Surgery",
            Self::EmergencyCare => "Emergency Care",
            Self::Hematology => "Hematology",
            Self::PharmacyServices => "Pharmacy Services",
            Self::DigitalXRay => "Digital X-Ray",
            Self::BloodChemistry => "Blood Chemistry",
            Self::Tonometry => "Tonometry",
            Self::SurgeryWithGasAnesthetic => "Surgery with Gas Anesthetic Machine",
        }
    }

    /// Parse a stored label. Legacy kebab-case keys are accepted too.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let needle = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| {
                s.label().eq_ignore_ascii_case(needle)
                    || s.label().replace(' ', "-").eq_ignore_ascii_case(needle)
            })
            .or_else(|| match needle.to_ascii_lowercase().as_str() {
                "general-consultation" => Some(Self::GeneralConsultation),
                "grooming" => Some(Self::PetGrooming),
                "dental" => Some(Self::DentalCare),
                "emergency" => Some(Self::EmergencyCare),
                _ => None,
            })
    }

    /// Slug of the informational page describing this service, if any.
    #[must_use]
    pub const fn info_page(self) -> Option<&'static str> {
        match self {
            Self::GeneralConsultation | Self::EmergencyCare => Some("veterinary-care"),
            Self::Vaccination => Some("vaccination"),
            Self::PetGrooming => Some("pet-grooming"),
            Self::DentalCare => Some("dentistry"),
            Self::Surgery | Self::SurgeryWithGasAnesthetic => {
                Some("surgery-with-gas-anesthetic-machine")
            }
            Self::Hematology => Some("hematology"),
            Self::PharmacyServices => Some("pharmacy-services"),
            Self::DigitalXRay => Some("digital-xray"),
            Self::BloodChemistry => Some("blood-chemistry"),
            Self::Tonometry => Some("tonometry"),
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown service: {s}"))
    }
}

impl TryFrom<String> for ServiceCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for ServiceCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One of the nine hourly booking slots, 9:00 AM through 5:00 PM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot(u8);

impl TimeSlot {
    pub const FIRST_HOUR: u8 = 9;
    pub const LAST_HOUR: u8 = 17;

    /// Create a slot from a 24-hour clock hour.
    #[must_use]
    pub const fn from_hour(hour: u8) -> Option<Self> {
        if hour >= Self::FIRST_HOUR && hour <= Self::LAST_HOUR {
            Some(Self(hour))
        } else {
            None
        }
    }

    /// All bookable slots in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::FIRST_HOUR..=Self::LAST_HOUR).map(Self)
    }

    #[must_use]
    pub const fn hour(self) -> u8 {
        self.0
    }

    /// Label as shown on the form and stored in `time_slot`, e.g. `1:00 PM`.
    #[must_use]
    pub fn label(self) -> String {
        let (display, meridiem) = match self.0 {
            h @ 0..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{display}:00 {meridiem}")
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::all()
            .find(|slot| slot.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown time slot: {s}"))
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Optional blood work added to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BloodTest {
    #[default]
    None,
    Basic,
    Complete,
}

impl BloodTest {
    pub const ALL: [Self; 3] = [Self::None, Self::Basic, Self::Complete];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Complete => "complete",
        }
    }

    #[must_use]
    pub fn price(self) -> Option<Price> {
        match self {
            Self::None => None,
            Self::Basic => Some(Price::pesos(1200)),
            Self::Complete => Some(Price::pesos(2500)),
        }
    }

    /// Form label, e.g. `Basic Blood Chemistry - ₱1,200`.
    #[must_use]
    pub fn label(self) -> String {
        match (self, self.price()) {
            (Self::Basic, Some(price)) => format!("Basic Blood Chemistry - {price}"),
            (Self::Complete, Some(price)) => format!("Complete Blood Chemistry - {price}"),
            _ => "No blood test needed".to_string(),
        }
    }

    /// Parse a form value; blank means none.
    #[must_use]
    pub fn from_form(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "basic" => Some(Self::Basic),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_time_slots() {
        let labels: Vec<String> = TimeSlot::all().map(TimeSlot::label).collect();
        assert_eq!(
            labels,
            [
                "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM",
                "4:00 PM", "5:00 PM"
            ]
        );
    }

    #[test]
    fn test_time_slot_parse() {
        assert_eq!("1:00 PM".parse::<TimeSlot>().unwrap().hour(), 13);
        assert!("6:00 PM".parse::<TimeSlot>().is_err());
        assert!(TimeSlot::from_hour(8).is_none());
    }

    #[test]
    fn test_service_stored_by_label() {
        let json = serde_json::to_string(&ServiceCategory::DigitalXRay).unwrap();
        assert_eq!(json, "\"Digital X-Ray\"");
        let parsed: ServiceCategory =
            serde_json::from_str("\"Surgery with Gas Anesthetic Machine\"").unwrap();
        assert_eq!(parsed, ServiceCategory::SurgeryWithGasAnesthetic);
    }

    #[test]
    fn test_service_accepts_legacy_keys() {
        assert_eq!(
            ServiceCategory::from_label("grooming"),
            Some(ServiceCategory::PetGrooming)
        );
        assert_eq!(ServiceCategory::from_label("haircut"), None);
    }

    #[test]
    fn test_blood_test_labels() {
        assert_eq!(BloodTest::Basic.label(), "Basic Blood Chemistry - ₱1,200");
        assert_eq!(BloodTest::Complete.label(), "Complete Blood Chemistry - ₱2,500");
        assert_eq!(BloodTest::from_form(""), Some(BloodTest::None));
    }
}
