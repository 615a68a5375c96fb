//! Working directory names inside a disk storage root.
//!
//! Both start with `.`, which no valid stored name may do, so they can never collide with an
//! artifact or be requested for download.

/// Directory holding writes that have not been persisted under their final name yet.
pub const STAGING_DIR_NAME: &str = ".staging";

/// Directory holding artifacts that have been claimed by a download in progress.
pub const CLAIMS_DIR_NAME: &str = ".claims";
