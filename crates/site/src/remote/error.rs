//! Remote store error types.

use serde::Deserialize;
use thiserror::Error;

/// PostgREST error codes meaning the table (or the row for a single-object
/// request) does not exist.
const TABLE_NOT_FOUND_CODES: &[&str] = &["PGRST116", "PGRST205", "42P01"];

/// Postgres `insufficient_privilege`, raised by row-level security.
const PERMISSION_DENIED_CODE: &str = "42501";

/// Errors that can occur when talking to the remote store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The table does not exist (or is not exposed).
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Rejected by authentication or row-level security.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No remote store is configured.
    #[error("Remote store is not configured")]
    NotConfigured,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    // GoTrue spells these differently.
    msg: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
}

impl RemoteError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.code.or(parsed.error_code);
        let message = parsed
            .message
            .or(parsed.msg)
            .or(parsed.error_description)
            .unwrap_or_else(|| body.trim().to_string());

        if code
            .as_deref()
            .is_some_and(|c| TABLE_NOT_FOUND_CODES.contains(&c))
        {
            return Self::TableNotFound(message);
        }
        if code.as_deref() == Some(PERMISSION_DENIED_CODE) || status == 401 || status == 403 {
            return Self::PermissionDenied(message);
        }

        Self::Api {
            status,
            code,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_not_found_codes() {
        let err = RemoteError::from_response(
            404,
            r#"{"code":"PGRST205","message":"Could not find the table 'public.pets'"}"#,
        );
        assert!(matches!(err, RemoteError::TableNotFound(_)));

        let err = RemoteError::from_response(406, r#"{"code":"PGRST116","message":"0 rows"}"#);
        assert!(matches!(err, RemoteError::TableNotFound(_)));
    }

    #[test]
    fn test_permission_denied_by_code_or_status() {
        let err = RemoteError::from_response(
            400,
            r#"{"code":"42501","message":"new row violates row-level security policy"}"#,
        );
        assert!(matches!(err, RemoteError::PermissionDenied(m) if m.contains("row-level")));

        let err = RemoteError::from_response(401, "Invalid API key");
        assert!(matches!(err, RemoteError::PermissionDenied(m) if m == "Invalid API key"));
    }

    #[test]
    fn test_gotrue_error_message() {
        let err = RemoteError::from_response(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert!(
            matches!(err, RemoteError::Api { status: 400, message, .. } if message == "Invalid login credentials")
        );
    }
}
