//! Locally held bookings.
//!
//! Bookings land here when the hosted backend is not configured or rejected
//! the insert. Staff use this list to re-enter them.

use pawmilya_site::store::LocalStore;

use super::CommandError;

/// Print the local appointments, soonest first.
///
/// # Errors
///
/// Returns error if the appointments document cannot be read.
#[allow(clippy::print_stdout)]
pub async fn list_local(store: &LocalStore) -> Result<(), CommandError> {
    let mut appointments = store.local_appointments().await?;
    appointments.sort_by(|a, b| {
        a.appointment_date
            .cmp(&b.appointment_date)
            .then_with(|| a.time_slot.cmp(&b.time_slot))
    });

    for a in &appointments {
        println!(
            "{}  {} {:<9}  {:<24}  {:<16}  {:<20}  {}",
            a.id,
            a.appointment_date,
            a.time_slot,
            a.service,
            a.pet_name,
            a.owner_name,
            a.status.label()
        );
    }
    tracing::info!(
        "{} local appointment(s) in {}",
        appointments.len(),
        store.dir().display()
    );
    Ok(())
}
