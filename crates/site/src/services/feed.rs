//! In-process snapshot of the appointment list for the admin back-office.
//!
//! A background task refreshes the snapshot on a fixed interval. Admin pages
//! read the snapshot and refresh it on demand. A snapshot taken from one
//! backend is never served for another.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::models::Appointment;
use crate::store::{Backend, ClinicStore, StoreError};

/// Appointments as fetched at `fetched_at`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub appointments: Arc<Vec<Appointment>>,
    pub fetched_at: DateTime<Utc>,
    /// `Backend::location` of the store the list came from.
    pub source: &'static str,
}

/// Shared appointment list snapshot.
#[derive(Clone, Default)]
pub struct AppointmentFeed {
    inner: Arc<RwLock<Option<Snapshot>>>,
}

impl std::fmt::Debug for AppointmentFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppointmentFeed").finish_non_exhaustive()
    }
}

impl AppointmentFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if one has been taken.
    pub async fn current(&self) -> Option<Snapshot> {
        self.inner.read().await.clone()
    }

    /// Fetch a fresh list from `backend` and store it.
    ///
    /// # Errors
    ///
    /// Returns error if the backend read fails; the previous snapshot is kept.
    #[instrument(skip(self, backend), fields(source = backend.location()))]
    pub async fn refresh(&self, backend: &Backend) -> Result<Snapshot, StoreError> {
        let appointments = backend.list_appointments().await?;
        let snapshot = Snapshot {
            appointments: Arc::new(appointments),
            fetched_at: Utc::now(),
            source: backend.location(),
        };
        tracing::debug!(count = snapshot.appointments.len(), "Appointment snapshot refreshed");
        *self.inner.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Snapshot for `backend`, refreshing when missing, stale for another
    /// backend, or when `force` is set.
    ///
    /// # Errors
    ///
    /// Returns error if a required refresh fails.
    pub async fn get(&self, backend: &Backend, force: bool) -> Result<Snapshot, StoreError> {
        if !force
            && let Some(snapshot) = self.current().await
            && snapshot.source == backend.location()
        {
            return Ok(snapshot);
        }
        self.refresh(backend).await
    }

    /// Drop the snapshot so the next read refetches. Called after mutations.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }

    /// Refresh from `backend` every `every` until the runtime shuts down.
    pub fn spawn_refresh(&self, backend: Backend, every: Duration) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = feed.refresh(&backend).await {
                    tracing::warn!(error = %e, "Scheduled appointment refresh failed");
                }
            }
        })
    }
}
