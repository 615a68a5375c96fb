//! Opaque artifact identifiers.
//!
//! Every stored artifact is addressed by a short random token, the *opaque id*, which is
//! prefixed to the sanitised upload name to form the on-disk file name.
//!
//! ## Canonical opaque id form
//! - Length: 10
//! - Characters: `0-9`, `a-z` and `A-Z` only
//! - Example: `V1StGXR8Z5`
//!
//! Notes:
//! - The alphabet deliberately excludes `-`, so the first `-` in a stored name always separates
//!   the id from the display name.
//! - Ids are drawn from a cryptographically secure RNG. 62^10 is large, but collisions are
//!   still possible: callers must create artifacts exclusively and ask for a fresh id on
//!   conflict rather than trusting uniqueness.
//! - Externally supplied ids are validated with [`OpaqueId::parse`]; anything outside the
//!   canonical form is rejected.

mod service;

pub use service::{IdGenerator, OpaqueId, RandomIdGenerator, OPAQUE_ID_LEN};

/// Error type for opaque id operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for opaque id operations.
pub type IdResult<T> = Result<T, IdError>;
