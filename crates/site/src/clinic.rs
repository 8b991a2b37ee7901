//! Fixed clinic details shown on pages and in confirmation emails.

pub const NAME: &str = "PawMilya Veterinary Clinic";

/// Street address lines.
pub const ADDRESS_LINES: [&str; 3] = [
    "Casa Vallejo Bldg.2, 2nd Floor",
    "Baguio",
    "2600 Benguet",
];

pub const PHONE: &str = "0998 551 4890";

pub const HOURS: &str = "Monday to Friday: 8:00 AM - 12:00 PM & 2:00 PM - 5:00 PM";

/// Reminders printed on every confirmation.
pub const REMINDERS: [&str; 4] = [
    "Please arrive 10-15 minutes before your scheduled appointment time",
    "Bring any relevant medical records or previous test results",
    "If your pet is on medication, please bring the medication or a list",
    "For first-time visits, please bring your pet's vaccination records",
];
