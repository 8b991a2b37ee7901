//! Password sign-in and sign-out against the identity endpoints.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use pawmilya_core::ProfileId;

use super::{RemoteClient, RemoteError};
use crate::models::AccessToken;

/// A session issued by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSession {
    pub access_token: AccessToken,
    pub user: RemoteUser,
}

/// Claims about the signed-in user.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    pub id: ProfileId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Free-form metadata set at signup; only `name` is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

impl RemoteClient {
    /// Exchange an email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Api` for rejected credentials and transport
    /// errors when the provider is unreachable.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RemoteSession, RemoteError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .inner
            .client
            .post(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .json(&PasswordGrant { email, password })
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_response(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }

    /// Revoke the session behind `token`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn sign_out(&self, token: &AccessToken) -> Result<(), RemoteError> {
        let url = self.endpoint("auth/v1/logout")?;

        let response = self
            .inner
            .client
            .post(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(token.expose())
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_response(status.as_u16(), &body));
        }

        Ok(())
    }
}
