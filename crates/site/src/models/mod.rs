//! Domain models for the site.
//!
//! Field names follow the remote table columns so the same structs serialize
//! to the REST interface and to the local fallback documents.

pub mod appointment;
pub mod feedback;
pub mod flash;
pub mod local_user;
pub mod pet;
pub mod profile;
pub mod session;

pub use appointment::{Appointment, AppointmentFilter, NewAppointment};
pub use feedback::{Feedback, FeedbackFilter, NewFeedback};
pub use flash::{Flash, FlashKind};
pub use local_user::{LocalUser, NewLocalUser};
pub use pet::{NewPet, Pet, PetUpdate};
pub use profile::{Profile, ProfileUpdate};
pub use session::{AccessToken, CurrentUser, SessionIdentity, keys};
