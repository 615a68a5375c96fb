//! Constants used throughout the Dropshare core crate.

/// Default storage root when no explicit directory is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default upper bound for a single upload payload (100 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Default interval between expiry sweeps, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Number of fresh opaque ids tried before a store operation gives up.
pub const MAX_ID_ATTEMPTS: usize = 8;
