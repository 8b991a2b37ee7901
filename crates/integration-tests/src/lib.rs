//! Integration tests for the PawMilya clinic site.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pawmilya-integration-tests
//! ```
//!
//! No external services are needed. Each test builds the full router over a
//! temporary data directory and drives it with [`tower::ServiceExt::oneshot`].
//! Remote success paths run against [`MockRemote`], a small in-process
//! stand-in for the hosted REST and identity endpoints.
//!
//! # Test Categories
//!
//! - `public_pages` - Content pages, health checks, headers
//! - `auth_flow` - Local signup, login, logout and protected routes
//! - `booking_local` - Booking with only the local store
//! - `booking_remote` - Booking against the mock remote, including failure fallback
//! - `account_area` - Pets, autofill and the upcoming list
//! - `admin_area` - Back-office access and updates
//! - `feedback` - Feedback submission and review

mod mock_remote;

pub use mock_remote::MockRemote;

use std::path::PathBuf;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use tempfile::TempDir;
use tower::ServiceExt;

use pawmilya_site::config::{RemoteConfig, SiteConfig};
use pawmilya_site::middleware::session::SESSION_COOKIE_NAME;
use pawmilya_site::state::AppState;

/// Path of the site crate, for its content and static directories.
#[must_use]
pub fn site_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../site")
}

/// A booking date that is always in the future.
#[must_use]
pub fn tomorrow() -> String {
    (chrono::Local::now().date_naive() + chrono::Days::new(1))
        .format("%Y-%m-%d")
        .to_string()
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Target of a redirect, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Assert a `303 See Other` to `path`.
    #[track_caller]
    pub fn assert_redirect(&self, path: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location(), Some(path));
    }
}

/// The site under test plus one visitor's session cookie.
pub struct TestApp {
    router: Router,
    state: AppState,
    cookie: Option<String>,
    _data: TempDir,
}

impl TestApp {
    /// Site running on the local store only.
    #[must_use]
    pub fn local() -> Self {
        Self::build(None)
    }

    /// Site configured with a hosted backend.
    #[must_use]
    pub fn with_remote(remote: RemoteConfig) -> Self {
        Self::build(Some(remote))
    }

    fn build(remote: Option<RemoteConfig>) -> Self {
        let data = tempfile::tempdir().expect("Failed to create data dir");
        let mut config =
            SiteConfig::local(data.path().join("data"), site_dir().join("content"));
        config.static_dir = site_dir().join("static");
        config.remote = remote;

        let state = AppState::new(config).expect("Failed to build app state");
        Self {
            router: pawmilya_site::app(state.clone()),
            state,
            cookie: None,
            _data: data,
        }
    }

    /// Shared state, for inspecting the stores directly.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Forget the session cookie, as a new visitor would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty());
        self.send(request.expect("Failed to build request")).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body));
        self.send(request.expect("Failed to build request")).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Some(pair) = value.to_str().ok().and_then(|v| v.split(';').next()) else {
                continue;
            };
            if let Some(id) = pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")) {
                self.cookie = (!id.is_empty()).then(|| pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    // =========================================================================
    // Flows
    // =========================================================================

    /// Create a local account; the visitor stays signed in.
    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> TestResponse {
        self.post_form(
            "/signup",
            &[
                ("name", name),
                ("email", email),
                ("password", password),
                ("confirm_password", password),
            ],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Fill the booking form, review it and confirm.
    ///
    /// Returns the confirm response (a redirect to the success page).
    pub async fn book(&mut self, fields: &[(&str, &str)]) -> TestResponse {
        let review = self.post_form("/appointment", fields).await;
        assert_eq!(review.status, StatusCode::OK, "review failed: {}", review.body);
        self.post_form("/appointment/confirm", &[]).await
    }
}

/// A complete booking form for a dog.
#[must_use]
pub fn booking_fields(date: &str) -> Vec<(&'static str, String)> {
    vec![
        ("pet_name", "Mochi".to_string()),
        ("species", "dog".to_string()),
        ("reptile_type", String::new()),
        ("other_species", String::new()),
        ("breed", "Shih Tzu".to_string()),
        ("breed_other", String::new()),
        ("weight", "6 kg".to_string()),
        ("owner_name", "Ana Reyes".to_string()),
        ("email", "ana@example.com".to_string()),
        ("phone", "0917 555 0101".to_string()),
        ("service", "Vaccination".to_string()),
        ("appointment_date", date.to_string()),
        ("time_slot", "10:00 AM".to_string()),
        ("blood_test", "basic".to_string()),
        ("additional_info", "First visit".to_string()),
    ]
}

/// Borrow owned form pairs for [`TestApp::post_form`].
#[must_use]
pub fn as_pairs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}
