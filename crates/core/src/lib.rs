//! PawMilya Core - Shared domain types.
//!
//! This crate provides the types used across all PawMilya components:
//! - `site` - Public clinic site, booking flow, account area and admin back-office
//! - `cli` - Command-line tools for the local fallback store and remote checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Anything that needs "today" takes it as an argument.
//!
//! # Modules
//!
//! - [`types`] - Email, IDs, statuses, the service catalogue, species and pet age

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

#[doc(hidden)]
pub mod __private {
    pub use uuid::Uuid;
}
