//! Client for the hosted backend's REST and identity endpoints.
//!
//! Every request carries the anonymous key as `apikey`. The `Authorization`
//! bearer is the signed-in user's access token when one is available, else
//! the anonymous key itself; row-level security decides what each can see.
//!
//! # Example
//!
//! ```rust,ignore
//! use pawmilya_site::remote::{Direction, RemoteClient, RestRequest};
//!
//! let client = RemoteClient::new(&config.remote)?;
//! let request = RestRequest::select("appointments")
//!     .eq("owner_id", user.id)
//!     .order("appointment_date", Direction::Desc);
//! let rows: Vec<Appointment> = client.fetch(&request, user.access_token.as_ref()).await?;
//! ```

mod auth;
mod error;
mod request;

pub use auth::{RemoteSession, RemoteUser, UserMetadata};
pub use error::RemoteError;
pub use request::{Direction, RestRequest};

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::RemoteConfig;
use crate::models::AccessToken;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Table used for connection checks.
const PING_TABLE: &str = "appointments";

/// Client for the remote store.
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    client: reqwest::Client,
    base: Url,
    anon_key: SecretString,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl RemoteClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        // `Url::join` drops the last path segment unless it ends in a slash.
        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(RemoteClientInner {
                client,
                base,
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    /// Project base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.inner
            .base
            .join(path)
            .map_err(|e| RemoteError::Parse(format!("invalid endpoint {path}: {e}")))
    }

    fn table_url(&self, request: &RestRequest) -> Result<Url, RemoteError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", request.table()))?;
        if !request.query().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query());
        }
        Ok(url)
    }

    fn bearer<'a>(&'a self, token: Option<&'a AccessToken>) -> &'a str {
        token.map_or_else(|| self.inner.anon_key.expose_secret(), AccessToken::expose)
    }

    async fn send(
        &self,
        request: &RestRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response, RemoteError> {
        let url = self.table_url(request)?;

        let mut builder = self
            .inner
            .client
            .request(request.method(), url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(self.bearer(token));
        if let Some(prefer) = request.prefer() {
            builder = builder.header("Prefer", prefer);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_response(status.as_u16(), &body));
        }

        Ok(response)
    }

    /// Run a request that returns rows (selects and inserts).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the rows do not decode as `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        request: &RestRequest,
        token: Option<&AccessToken>,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self.send(request, token).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }

    /// Run a request whose response body is not needed.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute(
        &self,
        request: &RestRequest,
        token: Option<&AccessToken>,
    ) -> Result<(), RemoteError> {
        self.send(request, token).await.map(|_| ())
    }

    /// Connection test: read one id from the appointments table.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or rejects the anon key.
    pub async fn ping(&self) -> Result<(), RemoteError> {
        let request = RestRequest::select(PING_TABLE).columns("id").limit(1);
        self.fetch::<serde_json::Value>(&request, None)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(url: &str) -> RemoteClient {
        RemoteClient::new(&RemoteConfig {
            url: Url::parse(url).unwrap(),
            anon_key: SecretString::from("k9Xv2LmQ8rT4wZ7p".to_string()),
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_keeps_base_path() {
        let client = client("http://127.0.0.1:54321/project");
        let request = RestRequest::select("pets").eq("owner_id", "u 1");
        let url = client.table_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:54321/project/rest/v1/pets?select=*&owner_id=eq.u+1"
        );
    }

    #[test]
    fn test_table_url_without_query() {
        let client = client("https://clinic.example.co");
        let request = RestRequest::delete("pets");
        let url = client.table_url(&request).unwrap();
        assert_eq!(url.as_str(), "https://clinic.example.co/rest/v1/pets");
    }

    #[test]
    fn test_bearer_falls_back_to_anon_key() {
        let client = client("https://clinic.example.co");
        assert_eq!(client.bearer(None), "k9Xv2LmQ8rT4wZ7p");
        let token = AccessToken::new("user-token");
        assert_eq!(client.bearer(Some(&token)), "user-token");
    }
}
