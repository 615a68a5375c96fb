//! In-process artifact store.
//!
//! Keeps payloads in a map behind a single mutex. Exclusive create and at-most-once take fall
//! out of doing the check and the mutation under the same lock. Contents are lost on restart.

use crate::{ArtifactStore, StoreError, StoreResult, StoredArtifact, TakenArtifact};
use chrono::{DateTime, Utc};
use dropshare_types::StoredName;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct Entry {
    name: StoredName,
    bytes: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl Entry {
    fn artifact(&self) -> StoredArtifact {
        StoredArtifact::new(&self.name, self.bytes.len() as u64, self.created_at)
    }
}

/// [`ArtifactStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl ArtifactStore for MemoryStore {
    fn put_new(&self, name: &StoredName, payload: &[u8]) -> StoreResult<StoredArtifact> {
        let mut entries = self.entries()?;
        if entries.contains_key(name.as_str()) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }

        let entry = Entry {
            name: name.clone(),
            bytes: payload.to_vec(),
            created_at: Utc::now(),
        };
        let artifact = entry.artifact();
        entries.insert(name.as_str().to_owned(), entry);
        Ok(artifact)
    }

    fn take(&self, name: &StoredName) -> StoreResult<TakenArtifact> {
        let entry = self
            .entries()?
            .remove(name.as_str())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        Ok(TakenArtifact {
            artifact: entry.artifact(),
            bytes: entry.bytes,
        })
    }

    fn remove(&self, name: &StoredName) -> StoreResult<bool> {
        Ok(self.entries()?.remove(name.as_str()).is_some())
    }

    fn contains(&self, name: &StoredName) -> StoreResult<bool> {
        Ok(self.entries()?.contains_key(name.as_str()))
    }

    fn list(&self) -> StoreResult<Vec<StoredArtifact>> {
        Ok(self.entries()?.values().map(Entry::artifact).collect())
    }
}
