//! Dropshare artifact storage
//!
//! This crate provides the key-value store behind the one-time download lifecycle: artifacts
//! are created exclusively under a [`StoredName`] and taken (read, then removed) at most once.
//!
//! ## Design Principles
//!
//! - Creation is compare-and-swap: [`ArtifactStore::put_new`] fails with
//!   [`StoreError::AlreadyExists`] instead of overwriting
//! - A partially written artifact is never visible under its final name
//! - [`ArtifactStore::take`] removes the artifact only after its bytes were read successfully
//! - Of several concurrent takes of one name, exactly one wins
//!
//! ## Disk Layout
//!
//! The [`DiskStore`] keeps a flat storage root; the directory listing is the index:
//!
//! ```text
//! uploads/
//! ├── .staging/                 # in-flight writes, cleared by recover
//! ├── .claims/                  # artifacts mid-delivery, restored by recover
//! ├── V1StGXR8Z5-report.pdf
//! └── 9fQk2LmZp0-photo.jpg
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use dropshare_files::{ArtifactStore, DiskStore};
//! use dropshare_id::OpaqueId;
//! use dropshare_types::{DisplayName, StoredName};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DiskStore::open(Path::new("uploads"))?;
//! let name = StoredName::new(&OpaqueId::generate(), &DisplayName::sanitise("notes.txt"));
//!
//! store.put_new(&name, b"hello")?;
//! let taken = store.take(&name)?;
//! assert_eq!(taken.bytes, b"hello");
//! # Ok(())
//! # }
//! ```

mod artifact;
mod constants;
mod disk;
mod memory;

pub use artifact::{StoredArtifact, TakenArtifact};
pub use constants::{CLAIMS_DIR_NAME, STAGING_DIR_NAME};
pub use disk::{DiskStore, Recovery};
pub use dropshare_types::{DisplayName, StoredName};
pub use memory::MemoryStore;

/// Errors that can occur during artifact storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage root does not exist and cannot be created, or is not a directory
    #[error("Invalid storage root: {0}")]
    InvalidRoot(String),

    /// An artifact with this name is already stored
    #[error("Artifact already exists: {0}")]
    AlreadyExists(String),

    /// No artifact with this name is stored (never created or already taken)
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// The in-memory index lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-value storage for pending artifacts.
///
/// Implementations are shared between request handlers and must be safe to call from many
/// threads at once. All operations are blocking.
pub trait ArtifactStore: Send + Sync + std::fmt::Debug {
    /// Stores `payload` under `name` unless the name is already taken.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] if an artifact with the same name exists; nothing is
    /// written in that case.
    fn put_new(&self, name: &StoredName, payload: &[u8]) -> StoreResult<StoredArtifact>;

    /// Reads and removes the artifact stored under `name`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the artifact does not exist or another caller took it first.
    /// Any other error leaves the artifact in place.
    fn take(&self, name: &StoredName) -> StoreResult<TakenArtifact>;

    /// Removes the artifact without reading it. Returns `false` if it was not present.
    fn remove(&self, name: &StoredName) -> StoreResult<bool>;

    /// Returns true if an artifact is currently stored under `name`.
    fn contains(&self, name: &StoredName) -> StoreResult<bool>;

    /// Lists all pending artifacts in no particular order.
    fn list(&self) -> StoreResult<Vec<StoredArtifact>>;

    /// Cleans up working state left behind by a crashed process and returns the number of
    /// entries handled. Only safe while no other process shares the store.
    fn recover(&self) -> StoreResult<usize> {
        Ok(0)
    }
}
