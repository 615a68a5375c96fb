//! Upload and one-time download operations.
//!
//! [`ShareService`] is the only entry point API crates use. It owns no HTTP concerns: callers
//! pass raw bytes and names in, and map [`ShareError`] variants onto their own status codes.

use crate::config::{CoreConfig, StoreKind};
use crate::constants::MAX_ID_ATTEMPTS;
use crate::{ShareError, ShareResult};
use chrono::{DateTime, Utc};
use dropshare_files::{ArtifactStore, DiskStore, MemoryStore, StoreError, StoredArtifact};
use dropshare_id::{IdGenerator, RandomIdGenerator};
use dropshare_types::{DisplayName, StoredName};
use std::sync::Arc;

/// A delivered artifact. The artifact no longer exists in storage.
#[derive(Debug, Clone)]
pub struct Download {
    pub stored_name: StoredName,
    pub bytes: Vec<u8>,
}

/// Store / retrieve-and-purge service over a shared [`ArtifactStore`].
///
/// Cheap to clone; clones share the same store and id generator.
#[derive(Clone, Debug)]
pub struct ShareService {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn ArtifactStore>,
    ids: Arc<dyn IdGenerator>,
}

impl ShareService {
    /// Opens the store selected by `cfg` with the default random id generator.
    ///
    /// # Errors
    ///
    /// Returns `ShareError::Storage` if the disk storage root cannot be opened or created.
    pub fn open(cfg: Arc<CoreConfig>) -> ShareResult<Self> {
        let store: Arc<dyn ArtifactStore> = match cfg.store_kind() {
            StoreKind::Disk => Arc::new(DiskStore::open(cfg.upload_dir())?),
            StoreKind::Memory => Arc::new(MemoryStore::new()),
        };
        tracing::info!(
            kind = ?cfg.store_kind(),
            upload_dir = %cfg.upload_dir().display(),
            "artifact store ready"
        );
        Ok(Self::with_parts(cfg, store, Arc::new(RandomIdGenerator)))
    }

    /// Builds a service from explicit parts.
    pub fn with_parts(
        cfg: Arc<CoreConfig>,
        store: Arc<dyn ArtifactStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self { cfg, store, ids }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Cleans up after a previous crash. Call once at startup, before serving requests.
    pub fn recover(&self) -> ShareResult<usize> {
        Ok(self.store.recover()?)
    }

    /// Stores an uploaded payload under a fresh opaque name.
    ///
    /// The client-supplied `original_name` is sanitised into a single path component. A new id
    /// is generated for every attempt; an attempt that hits an existing name is retried with a
    /// fresh id, up to [`MAX_ID_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// - `MissingFile` if the payload is empty
    /// - `TooLarge` if the payload exceeds the configured limit
    /// - `IdSpaceExhausted` if every attempt collided
    /// - `Storage` if the write failed
    pub fn store(&self, original_name: Option<&str>, payload: &[u8]) -> ShareResult<StoredArtifact> {
        if payload.is_empty() {
            return Err(ShareError::MissingFile);
        }

        let size = payload.len() as u64;
        let limit = self.cfg.max_upload_bytes();
        if size > limit {
            return Err(ShareError::TooLarge { size, limit });
        }

        let display = DisplayName::sanitise(original_name.unwrap_or_default());

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let name = StoredName::new(&self.ids.next_id(), &display);
            match self.store.put_new(&name, payload) {
                Ok(artifact) => {
                    tracing::info!(name = %name, size, "artifact stored");
                    return Ok(artifact);
                }
                Err(StoreError::AlreadyExists(_)) => {
                    tracing::warn!(name = %name, attempt, "opaque id collision, regenerating");
                }
                Err(e) => return Err(ShareError::Storage(e)),
            }
        }

        Err(ShareError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Retrieves and deletes an artifact. See [`ShareService::retrieve_at`].
    pub fn retrieve(&self, requested: Option<&str>) -> ShareResult<Download> {
        self.retrieve_at(requested, Utc::now())
    }

    /// Retrieves and deletes an artifact, judging expiry against `now`.
    ///
    /// The requested name is validated before storage is touched. The artifact is removed only
    /// after its bytes were read; an expired artifact is removed as well but reported as not
    /// found.
    ///
    /// # Errors
    ///
    /// - `MissingName` if no name (or an empty one) was supplied
    /// - `InvalidName` if the name is unsafe or could never have been issued
    /// - `NotFound` if it does not exist, was already delivered, or has expired
    /// - `Storage` if reading or deleting failed; the artifact is kept in that case
    pub fn retrieve_at(&self, requested: Option<&str>, now: DateTime<Utc>) -> ShareResult<Download> {
        let requested = requested.unwrap_or_default();
        if requested.is_empty() {
            return Err(ShareError::MissingName);
        }

        let name = StoredName::parse(requested)?;
        let taken = self.store.take(&name)?;

        if self.is_expired(&taken.artifact, now) {
            tracing::info!(name = %name, "discarded expired artifact on retrieval");
            return Err(ShareError::NotFound(name.to_string()));
        }

        tracing::info!(name = %name, size = taken.bytes.len(), "artifact delivered");
        Ok(Download {
            stored_name: name,
            bytes: taken.bytes,
        })
    }

    /// Returns when `artifact` expires, or `None` if expiry is disabled.
    pub fn expires_at(&self, artifact: &StoredArtifact) -> Option<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(self.cfg.artifact_ttl()?).ok()?;
        artifact.created_at.checked_add_signed(ttl)
    }

    pub fn is_expired(&self, artifact: &StoredArtifact, now: DateTime<Utc>) -> bool {
        self.expires_at(artifact)
            .is_some_and(|expires_at| expires_at <= now)
    }

    /// Lists pending artifacts, oldest first.
    pub fn list(&self) -> ShareResult<Vec<StoredArtifact>> {
        let mut artifacts = self.store.list()?;
        artifacts.sort_by_key(|a| a.created_at);
        Ok(artifacts)
    }

    /// Deletes expired artifacts. See [`ShareService::sweep_expired_at`].
    pub fn sweep_expired(&self) -> ShareResult<usize> {
        self.sweep_expired_at(Utc::now())
    }

    /// Deletes every artifact that has expired by `now` and returns how many were removed.
    ///
    /// A no-op when expiry is disabled.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> ShareResult<usize> {
        if self.cfg.artifact_ttl().is_none() {
            return Ok(0);
        }

        let mut removed = 0;
        for artifact in self.store.list()? {
            if !self.is_expired(&artifact, now) {
                continue;
            }
            // A concurrent download may have taken it already.
            if self.store.remove(&artifact.stored_name)? {
                tracing::debug!(name = %artifact.stored_name, "swept expired artifact");
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "expired artifacts swept");
        }
        Ok(removed)
    }
}
