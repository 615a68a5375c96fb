//! Filesystem-backed artifact store
//!
//! This module provides [`DiskStore`], the default [`ArtifactStore`] implementation. Artifacts
//! live as plain files in a single flat storage root, named by their [`StoredName`].
//!
//! # Exclusive Create
//!
//! Payloads are first written to a temporary file in `.staging/` and then persisted under the
//! final name with a no-clobber link/rename. The persist either creates the name atomically or
//! fails with `AlreadyExists`, so two writers can never overwrite each other and a reader never
//! sees a half-written artifact.
//!
//! # Claim, Read, Unlink
//!
//! A take first renames the artifact into `.claims/` under a unique claim name. `rename(2)` is
//! atomic: of several concurrent takes exactly one moves the file, the rest get `ENOENT` and
//! report not-found. The winner reads the claimed file and only then unlinks it. If the read or
//! the unlink fails, the claim is renamed back so the artifact can be retried.
//!
//! # Recovery
//!
//! A crash can leave files behind in `.staging/` (interrupted uploads) and `.claims/`
//! (interrupted downloads that never reached the client). [`DiskStore::recover`] discards the
//! former and restores the latter. It must only run while no other process is using the root.

use crate::{
    ArtifactStore, StoreError, StoreResult, StoredArtifact, TakenArtifact, CLAIMS_DIR_NAME,
    STAGING_DIR_NAME,
};
use chrono::{DateTime, Utc};
use dropshare_types::StoredName;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Filesystem-backed [`ArtifactStore`] rooted at a single directory.
#[derive(Debug)]
pub struct DiskStore {
    /// Canonicalised storage root
    root: PathBuf,
}

/// Counts of working files handled by [`DiskStore::recover`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pub discarded_staging: usize,
    pub restored_claims: usize,
}

impl DiskStore {
    /// Opens (creating if necessary) a storage root.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if:
    /// - The root path exists but is not a directory
    /// - The root or its working directories cannot be created
    /// - Path canonicalisation fails
    pub fn open(root: &Path) -> StoreResult<Self> {
        if root.exists() && !root.is_dir() {
            return Err(StoreError::InvalidRoot(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        fs::create_dir_all(root).map_err(|e| {
            StoreError::InvalidRoot(format!("Cannot create {}: {}", root.display(), e))
        })?;

        let root = root.canonicalize().map_err(|e| {
            StoreError::InvalidRoot(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        let store = Self { root };
        for dir in [store.staging_dir(), store.claims_dir()] {
            fs::create_dir_all(&dir).map_err(|e| {
                io_context(e, format!("Failed to create working directory {}", dir.display()))
            })?;
        }

        tracing::debug!(root = %store.root.display(), "disk store opened");
        Ok(store)
    }

    /// Returns the canonicalised storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discards interrupted writes and restores interrupted claims.
    ///
    /// A restored claim is an artifact that was renamed out of the root by a download that never
    /// completed, so it was not delivered and becomes available again.
    pub fn recover(&self) -> StoreResult<Recovery> {
        let mut recovery = Recovery::default();

        for entry in fs::read_dir(self.staging_dir())? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)?;
                recovery.discarded_staging += 1;
            }
        }

        for entry in fs::read_dir(self.claims_dir())? {
            let entry = entry?;
            let claim_name = entry.file_name();
            let Some(stored) = claim_name
                .to_str()
                .and_then(|n| n.split_once('.'))
                .and_then(|(_, rest)| StoredName::parse(rest).ok())
            else {
                tracing::warn!(claim = ?claim_name, "skipping unrecognised claim file");
                continue;
            };

            let target = self.artifact_path(&stored);
            if target.exists() {
                tracing::warn!(name = %stored, "claim shadowed by live artifact, leaving in place");
                continue;
            }
            fs::rename(entry.path(), &target)?;
            recovery.restored_claims += 1;
        }

        if recovery != Recovery::default() {
            tracing::info!(
                discarded_staging = recovery.discarded_staging,
                restored_claims = recovery.restored_claims,
                "recovered disk store working files"
            );
        }
        Ok(recovery)
    }

    fn artifact_path(&self, name: &StoredName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Unique path under `.claims/`: `<32 hex>.<stored_name>`.
    fn claim_path(&self, name: &StoredName) -> PathBuf {
        self.claims_dir()
            .join(format!("{}.{}", uuid::Uuid::new_v4().simple(), name))
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }

    fn claims_dir(&self) -> PathBuf {
        self.root.join(CLAIMS_DIR_NAME)
    }

    /// Puts a claimed artifact back under its stored name.
    fn release_claim(&self, claim: &Path, source: &Path) {
        if let Err(e) = fs::rename(claim, source) {
            tracing::error!(
                claim = %claim.display(),
                error = %e,
                "failed to release claim; artifact stays in claims until recovery"
            );
        }
    }
}

impl ArtifactStore for DiskStore {
    fn put_new(&self, name: &StoredName, payload: &[u8]) -> StoreResult<StoredArtifact> {
        let target = self.artifact_path(name);

        let mut staged = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(self.staging_dir())
            .map_err(|e| io_context(e, "Failed to create staging file"))?;

        staged
            .write_all(payload)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| io_context(e, format!("Failed to write staging file for {}", name)))?;

        // On failure the staged file is dropped and deleted.
        let file = staged.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                StoreError::AlreadyExists(name.to_string())
            } else {
                io_context(e.error, format!("Failed to persist {}", target.display()))
            }
        })?;

        let created_at = file
            .metadata()
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(StoredArtifact::new(name, payload.len() as u64, created_at))
    }

    fn take(&self, name: &StoredName) -> StoreResult<TakenArtifact> {
        let source = self.artifact_path(name);
        let claim = self.claim_path(name);

        if let Err(e) = fs::rename(&source, &claim) {
            if e.kind() == ErrorKind::NotFound {
                return Err(StoreError::NotFound(name.to_string()));
            }
            return Err(io_context(e, format!("Failed to claim {}", source.display())));
        }

        let read = fs::metadata(&claim).and_then(|meta| {
            if !meta.is_file() {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    "artifact is not a regular file",
                ));
            }
            fs::read(&claim).map(|bytes| (meta, bytes))
        });

        let (meta, bytes) = match read {
            Ok(ok) => ok,
            Err(e) => {
                self.release_claim(&claim, &source);
                return Err(io_context(e, format!("Failed to read {}", name)));
            }
        };

        if let Err(e) = fs::remove_file(&claim) {
            self.release_claim(&claim, &source);
            return Err(io_context(e, format!("Failed to delete {}", name)));
        }

        let created_at = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(TakenArtifact {
            artifact: StoredArtifact::new(name, bytes.len() as u64, created_at),
            bytes,
        })
    }

    fn remove(&self, name: &StoredName) -> StoreResult<bool> {
        match fs::remove_file(self.artifact_path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_context(e, format!("Failed to delete {}", name))),
        }
    }

    fn contains(&self, name: &StoredName) -> StoreResult<bool> {
        match fs::metadata(self.artifact_path(name)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StoreResult<Vec<StoredArtifact>> {
        let mut artifacts = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }

            let name = match StoredName::parse(file_name) {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(file = file_name, error = %e, "skipping foreign file in storage root");
                    continue;
                }
            };

            // Taken between read_dir and metadata.
            let meta = match entry.metadata() {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            let created_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            artifacts.push(StoredArtifact::new(&name, meta.len(), created_at));
        }

        Ok(artifacts)
    }

    fn recover(&self) -> StoreResult<usize> {
        let recovery = DiskStore::recover(self)?;
        Ok(recovery.discarded_staging + recovery.restored_claims)
    }
}

fn io_context(e: std::io::Error, context: impl std::fmt::Display) -> StoreError {
    StoreError::Io(std::io::Error::new(
        e.kind(),
        format!("{}: {}", context, e),
    ))
}
