//! In-process stand-in for the hosted backend.
//!
//! Serves the subset of the REST table and identity endpoints the site uses:
//!
//! ```text
//! POST   /auth/v1/token?grant_type=password
//! POST   /auth/v1/logout
//! GET    /rest/v1/{table}?col=eq.value&order=...&limit=n
//! POST   /rest/v1/{table}[?on_conflict=col]
//! PATCH  /rest/v1/{table}?col=eq.value
//! DELETE /rest/v1/{table}?col=eq.value
//! ```
//!
//! Every request body sent to a table is recorded so tests can check the
//! exact column names the site writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use pawmilya_site::config::RemoteConfig;

const ANON_KEY: &str = "mock-anon-key-7f3a9c2e1b";

/// Query keys that are not column filters.
const RESERVED_PARAMS: &[&str] = &["select", "order", "limit", "on_conflict"];

#[derive(Debug, Clone)]
struct MockUser {
    id: String,
    email: String,
    password: String,
    name: String,
}

#[derive(Debug, Default)]
struct MockData {
    users: Vec<MockUser>,
    tables: HashMap<String, Vec<Value>>,
    writes: Vec<(String, Value)>,
    failing: bool,
    reject_session_tokens: bool,
}

type Shared = Arc<Mutex<MockData>>;

fn lock(shared: &Shared) -> MutexGuard<'_, MockData> {
    shared.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// A running mock backend.
pub struct MockRemote {
    url: Url,
    data: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl MockRemote {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let data = Shared::default();
        let router = Router::new()
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/logout", post(logout))
            .route(
                "/rest/v1/{table}",
                axum::routing::get(select)
                    .post(insert)
                    .patch(update)
                    .delete(remove)
                    .layer(middleware::from_fn_with_state(data.clone(), authorize)),
            )
            .with_state(data.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock remote");
        let addr = listener.local_addr().expect("Mock remote has no address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            url: Url::parse(&format!("http://{addr}/")).expect("Invalid mock URL"),
            data,
            server,
        }
    }

    /// Site configuration pointing at this mock.
    #[must_use]
    pub fn config(&self) -> RemoteConfig {
        RemoteConfig {
            url: self.url.clone(),
            anon_key: SecretString::from(ANON_KEY),
        }
    }

    /// Register an identity-provider account. Returns its id.
    pub fn add_user(&self, email: &str, password: &str, name: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        lock(&self.data).users.push(MockUser {
            id: id.clone(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        });
        id
    }

    /// Put a row straight into a table.
    pub fn seed(&self, table: &str, row: Value) {
        lock(&self.data)
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Current rows of a table.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.data)
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Bodies of every insert sent to `table`, as received.
    #[must_use]
    pub fn inserts(&self, table: &str) -> Vec<Value> {
        lock(&self.data)
            .writes
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Make every table request answer `503 Service Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        lock(&self.data).failing = failing;
    }

    /// Answer `401` to table requests carrying a user access token. Requests
    /// under the anon key still go through.
    pub fn set_reject_session_tokens(&self, reject: bool) {
        lock(&self.data).reject_session_tokens = reject;
    }
}

impl Drop for MockRemote {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Identity endpoints
// =============================================================================

#[derive(Deserialize)]
struct PasswordGrant {
    email: String,
    password: String,
}

async fn token(State(data): State<Shared>, Json(grant): Json<PasswordGrant>) -> Response {
    let user = lock(&data)
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(&grant.email) && u.password == grant.password)
        .cloned();

    match user {
        Some(user) => Json(json!({
            "access_token": format!("token-{}", user.id),
            "token_type": "bearer",
            "user": {
                "id": user.id,
                "email": user.email,
                "user_metadata": { "name": user.name },
            },
        }))
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            })),
        )
            .into_response(),
    }
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

// =============================================================================
// Table endpoints
// =============================================================================

async fn authorize(State(data): State<Shared>, request: Request, next: Next) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let reject = lock(&data).reject_session_tokens;

    if reject && bearer.as_deref() != Some(ANON_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": "PGRST301", "message": "JWT expired" })),
        )
            .into_response();
    }
    next.run(request).await
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "service unavailable" })),
    )
        .into_response()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `eq.` filters from the query string.
fn filters(params: &[(String, String)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
        .filter_map(|(k, v)| v.strip_prefix("eq.").map(|v| (k.clone(), v.to_string())))
        .collect()
}

fn matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters
        .iter()
        .all(|(column, expected)| row.get(column).is_some_and(|v| as_text(v) == *expected))
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn select(
    State(data): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let data = lock(&data);
    if data.failing {
        return unavailable();
    }

    let filters = filters(&params);
    let limit = param(&params, "limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let rows: Vec<Value> = data
        .tables
        .get(&table)
        .map(|rows| {
            rows.iter()
                .rev()
                .filter(|row| matches(row, &filters))
                .take(limit)
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Json(rows).into_response()
}

async fn insert(
    State(data): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&data);
    if data.failing {
        return unavailable();
    }

    let incoming = match body {
        Value::Array(rows) => rows,
        row => vec![row],
    };
    let conflict = param(&params, "on_conflict").map(str::to_string);
    let now = chrono::Utc::now().to_rfc3339();

    let mut stored = Vec::with_capacity(incoming.len());
    for row in incoming {
        data.writes.push((table.clone(), row.clone()));

        let mut row = row;
        if let Value::Object(map) = &mut row {
            map.entry("id")
                .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
            map.entry("created_at")
                .or_insert_with(|| Value::String(now.clone()));
        }

        let rows = data.tables.entry(table.clone()).or_default();
        if let Some(column) = &conflict {
            let key = row.get(column).map(as_text);
            rows.retain(|existing| existing.get(column).map(as_text) != key);
        }
        rows.push(row.clone());
        stored.push(row);
    }

    (StatusCode::CREATED, Json(stored)).into_response()
}

async fn update(
    State(data): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    Json(patch): Json<Value>,
) -> Response {
    let mut data = lock(&data);
    if data.failing {
        return unavailable();
    }

    let filters = filters(&params);
    if let (Some(rows), Value::Object(patch)) = (data.tables.get_mut(&table), patch) {
        for row in rows.iter_mut().filter(|row| matches(row, &filters)) {
            if let Value::Object(map) = row {
                for (k, v) in &patch {
                    map.insert(k.clone(), v.clone());
                }
            }
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn remove(
    State(data): State<Shared>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut data = lock(&data);
    if data.failing {
        return unavailable();
    }

    let filters = filters(&params);
    if let Some(rows) = data.tables.get_mut(&table) {
        rows.retain(|row| !matches(row, &filters));
    }
    StatusCode::NO_CONTENT.into_response()
}
