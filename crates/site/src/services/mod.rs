//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Login (remote then local), local signup, profile updates
//! - `booking` - Appointment form validation and submission with local fallback
//! - `email` - Appointment confirmation emails
//! - `feed` - Admin appointment list snapshot with periodic refresh
//! - `pets` - Pet add and edit forms
//! - `stats` - Dashboard and feedback statistics

pub mod auth;
pub mod booking;
pub mod email;
pub mod feed;
pub mod pets;
pub mod stats;

pub use auth::{AdminPolicy, AuthError, AuthService};
pub use booking::{AppointmentForm, BookingError, BookingOutcome, BookingService, LastBooking};
pub use email::{Confirmation, EmailError, EmailService};
pub use feed::AppointmentFeed;
pub use pets::PetForm;
pub use stats::{AdminStats, FeedbackStats};
