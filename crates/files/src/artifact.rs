use chrono::{DateTime, Utc};
use dropshare_id::OpaqueId;
use dropshare_types::StoredName;

/// Metadata for a pending artifact.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Random id prefix of the stored name
    pub opaque_id: OpaqueId,

    /// Full storage key, `<opaque_id>-<original_name>`
    pub stored_name: StoredName,

    /// Sanitised client-supplied file name
    pub original_name: String,

    /// Size of the payload in bytes
    pub size_bytes: u64,

    /// When the artifact was written. For the disk store this is the file modification time.
    pub created_at: DateTime<Utc>,
}

impl StoredArtifact {
    pub(crate) fn new(name: &StoredName, size_bytes: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            opaque_id: name.opaque_id().clone(),
            stored_name: name.clone(),
            original_name: name.display_name().to_owned(),
            size_bytes,
            created_at,
        }
    }
}

/// An artifact removed from the store together with its payload.
#[derive(Debug, Clone)]
pub struct TakenArtifact {
    pub artifact: StoredArtifact,
    pub bytes: Vec<u8>,
}
