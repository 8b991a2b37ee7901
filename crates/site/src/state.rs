//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::content::{ContentError, ContentStore};
use crate::models::CurrentUser;
use crate::remote::RemoteClient;
use crate::services::{AdminPolicy, AppointmentFeed, AuthService, EmailService};
use crate::store::{Backend, LocalStore};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    #[error("SMTP configuration error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("remote client error: {0}")]
    Remote(#[from] crate::remote::RemoteError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    local: LocalStore,
    remote: Option<RemoteClient>,
    admin_policy: AdminPolicy,
    content: ContentStore,
    email: EmailService,
    feed: AppointmentFeed,
}

impl AppState {
    /// Build state from configuration: open the local store, load content
    /// and set up the optional remote and SMTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be read or a client cannot be built.
    pub fn new(config: SiteConfig) -> Result<Self, StateError> {
        let local = LocalStore::new(config.data_dir.clone());
        let remote = config.remote.as_ref().map(RemoteClient::new).transpose()?;
        let admin_policy = AdminPolicy::new(&config.admin_emails);
        let content = ContentStore::load(&config.content_dir)?;
        let email = EmailService::new(config.email.as_ref())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                local,
                remote,
                admin_policy,
                content,
                email,
                feed: AppointmentFeed::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// The local fallback store.
    #[must_use]
    pub fn local(&self) -> &LocalStore {
        &self.inner.local
    }

    /// The remote client, when configured.
    #[must_use]
    pub fn remote(&self) -> Option<&RemoteClient> {
        self.inner.remote.as_ref()
    }

    #[must_use]
    pub fn admin_policy(&self) -> &AdminPolicy {
        &self.inner.admin_policy
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Admin appointment list snapshot.
    #[must_use]
    pub fn feed(&self) -> &AppointmentFeed {
        &self.inner.feed
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.local(), self.remote(), self.admin_policy())
    }

    /// Store for requests made on behalf of `user`.
    #[must_use]
    pub fn backend_for(&self, user: Option<&CurrentUser>) -> Backend {
        Backend::for_user(self.remote(), self.local(), user)
    }

    /// Store for background work with no visitor.
    #[must_use]
    pub fn service_backend(&self) -> Backend {
        Backend::service(self.remote(), self.local())
    }
}
