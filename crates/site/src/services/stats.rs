//! Dashboard and feedback statistics.

use std::collections::HashSet;

use pawmilya_core::{AppointmentStatus, FeedbackStatus};

use crate::models::{Appointment, Feedback};

/// Admin dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_appointments: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_pets: usize,
    pub active_clients: usize,
}

impl AdminStats {
    /// Count appointments by status and unique clients.
    ///
    /// Clients are keyed by owner id, falling back to the booking email.
    #[must_use]
    pub fn compute(appointments: &[Appointment], total_pets: usize) -> Self {
        let mut stats = Self {
            total_appointments: appointments.len(),
            total_pets,
            ..Self::default()
        };
        let mut clients = HashSet::new();

        for appointment in appointments {
            match appointment.status {
                AppointmentStatus::Scheduled => stats.scheduled += 1,
                AppointmentStatus::Completed => stats.completed += 1,
                AppointmentStatus::Cancelled => stats.cancelled += 1,
            }
            if let Some(key) = appointment.client_key() {
                clients.insert(key);
            }
        }

        stats.active_clients = clients.len();
        stats
    }
}

/// Feedback summary for the admin feedback page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackStats {
    pub total: usize,
    /// Mean rating, already rounded to one decimal. Zero when empty.
    pub average_rating: f64,
    /// Count per star, index 0 is one star.
    pub distribution: [usize; 5],
    pub new_count: usize,
    pub resolved_count: usize,
}

impl FeedbackStats {
    #[must_use]
    pub fn compute(feedback: &[Feedback]) -> Self {
        let mut stats = Self {
            total: feedback.len(),
            ..Self::default()
        };
        let mut sum = 0u32;

        for entry in feedback {
            let stars = entry.rating.stars();
            sum += u32::from(stars);
            if let Some(slot) = stats.distribution.get_mut(usize::from(stars.saturating_sub(1))) {
                *slot += 1;
            }
            match entry.status {
                FeedbackStatus::New => stats.new_count += 1,
                FeedbackStatus::Resolved => stats.resolved_count += 1,
                FeedbackStatus::Reviewed | FeedbackStatus::InProgress => {}
            }
        }

        if let Ok(count) = u32::try_from(feedback.len())
            && count > 0
        {
            let mean = f64::from(sum) / f64::from(count);
            stats.average_rating = (mean * 10.0).round() / 10.0;
        }
        stats
    }

    /// Share of entries with `stars`, as a whole percentage for bar widths.
    #[must_use]
    pub fn percent(&self, stars: u8) -> usize {
        let count = self
            .distribution
            .get(usize::from(stars.saturating_sub(1)))
            .copied()
            .unwrap_or(0);
        if self.total == 0 {
            0
        } else {
            count * 100 / self.total
        }
    }
}
