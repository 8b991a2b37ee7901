//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the fingerprinted stylesheet URL.
///
/// Falls back to the plain file when the build could not hash it.
///
/// Usage in templates: `{{ ""|css_path }}`
#[askama::filter_fn]
pub fn css_path(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(stylesheet_url(env!("CSS_HASH")))
}

fn stylesheet_url(hash: &str) -> String {
    if hash.is_empty() {
        "/static/css/site.css".to_string()
    } else {
        format!("/static/css/derived/site.{hash}.css")
    }
}

/// Formats an ISO date (`2030-05-01`) as `May 1, 2030`. Other input is
/// returned unchanged.
///
/// Usage in templates: `{{ appointment.appointment_date|long_date }}`
#[askama::filter_fn]
pub fn long_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(format_long_date(&raw))
}

fn format_long_date(raw: &str) -> String {
    raw.parse::<chrono::NaiveDate>()
        .map_or_else(|_| raw.to_string(), |d| d.format("%B %-d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_url() {
        assert_eq!(stylesheet_url(""), "/static/css/site.css");
        assert_eq!(stylesheet_url("abcd1234"), "/static/css/derived/site.abcd1234.css");
    }

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date("2030-05-01"), "May 1, 2030");
        assert_eq!(format_long_date("soon"), "soon");
    }
}
