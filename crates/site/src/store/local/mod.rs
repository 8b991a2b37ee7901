//! [`ClinicStore`](super::ClinicStore) over JSON documents on disk.
//!
//! Each document is a JSON array. A missing file reads as empty. Writes go
//! to a temporary file that is then renamed over the original, and every
//! read-modify-write holds the store's lock so concurrent requests cannot
//! lose each other's changes.

mod accounts;
mod clinic;
mod feedback;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::StoreError;

pub(crate) const USERS: &str = "local_users.json";
pub(crate) const PETS: &str = "local_pets.json";
pub(crate) const APPOINTMENTS: &str = "local_appointments.json";
pub(crate) const FEEDBACK: &str = "feedback.json";

/// Local fallback store rooted at a data directory.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<LocalStoreInner>,
}

struct LocalStoreInner {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("dir", &self.inner.dir)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(LocalStoreInner {
                dir: dir.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    fn path(&self, document: &str) -> PathBuf {
        self.inner.dir.join(document)
    }

    /// Read a whole document.
    pub(crate) async fn load<T: DeserializeOwned>(&self, document: &str) -> Result<Vec<T>, StoreError> {
        read_document(&self.path(document)).await
    }

    /// Read, change and write back a document under the store lock.
    pub(crate) async fn modify<T, R, F>(&self, document: &str, change: F) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R, StoreError> + Send,
    {
        let path = self.path(document);
        let _guard = self.inner.lock.lock().await;

        let mut items = read_document(&path).await?;
        let result = change(&mut items)?;
        write_document(&path, &items).await?;

        Ok(result)
    }

    /// Check that documents can be written.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the data directory is not writable.
    pub async fn check_writable(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.inner.dir).await?;
        let probe = self.path(".write-check");
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await?;
        Ok(())
    }
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn write_document<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(items)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
