//! Admin back-office.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin) and
//! works against the backend chosen for the signed-in administrator. List
//! pages degrade to an empty table with a notice when the backend fails;
//! mutations report the outcome with a flash and redirect back.

pub mod appointments;
pub mod dashboard;
pub mod feedback;
pub mod pets;
pub mod records;
pub mod users;

use std::str::FromStr;

use tower_sessions::Session;

use crate::models::Flash;
use crate::store::StoreError;
use crate::views::set_flash;

/// Parse an optional filter value; blank or unknown means "all".
pub(crate) fn filter_value<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .and_then(|v| v.parse().ok())
}

/// Notice shown above a table whose data could not be loaded.
pub(crate) fn load_notice(what: &str, error: &StoreError) -> String {
    tracing::warn!(error = %error, "Failed to load {what}");
    format!("Could not load {what}. Showing nothing until the data source is reachable.")
}

/// Flash the outcome of a back-office mutation.
pub(crate) async fn report(
    session: &Session,
    result: Result<(), StoreError>,
    done: &str,
    action: &str,
) {
    let flash = match result {
        Ok(()) => Flash::success("Saved", done),
        Err(StoreError::NotFound) => Flash::error("Not found", "That record no longer exists."),
        Err(e) => {
            tracing::warn!(error = %e, action, "Admin update failed");
            Flash::error("Update failed", format!("Could not {action}. Please try again."))
        }
    };
    set_flash(session, flash).await;
}

#[cfg(test)]
mod tests {
    use pawmilya_core::{AppointmentStatus, FeedbackCategory};

    use super::*;

    #[test]
    fn test_filter_value() {
        assert_eq!(
            filter_value::<AppointmentStatus>(Some("completed")),
            Some(AppointmentStatus::Completed)
        );
        assert_eq!(filter_value::<AppointmentStatus>(Some("all")), None);
        assert_eq!(filter_value::<AppointmentStatus>(Some("  ")), None);
        assert_eq!(filter_value::<FeedbackCategory>(Some("bogus")), None);
        assert_eq!(filter_value::<FeedbackCategory>(None), None);
    }
}
