//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Core
//! code never reads environment variables itself; binaries read them and hand the raw values to
//! the `*_from_env_value` parsers below.

use crate::constants::{
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_UPLOAD_DIR,
};
use crate::{ShareError, ShareResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which [`dropshare_files::ArtifactStore`] implementation backs the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    /// Files in the upload directory (survives restarts)
    #[default]
    Disk,
    /// Process memory (lost on restart)
    Memory,
}

impl FromStr for StoreKind {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" => Ok(StoreKind::Disk),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ShareError::InvalidConfig(format!(
                "unknown store kind '{}' (expected 'disk' or 'memory')",
                other
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    upload_dir: PathBuf,
    store_kind: StoreKind,
    max_upload_bytes: u64,
    artifact_ttl: Option<Duration>,
    sweep_interval: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `artifact_ttl` of `None` disables expiry entirely.
    pub fn new(
        upload_dir: PathBuf,
        store_kind: StoreKind,
        max_upload_bytes: u64,
        artifact_ttl: Option<Duration>,
        sweep_interval: Duration,
    ) -> ShareResult<Self> {
        if max_upload_bytes == 0 {
            return Err(ShareError::InvalidConfig(
                "max_upload_bytes must be greater than zero".into(),
            ));
        }

        if sweep_interval.is_zero() {
            return Err(ShareError::InvalidConfig(
                "sweep_interval must be greater than zero".into(),
            ));
        }

        Ok(Self {
            upload_dir,
            store_kind,
            max_upload_bytes,
            artifact_ttl: artifact_ttl.filter(|ttl| !ttl.is_zero()),
            sweep_interval,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store_kind
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn artifact_ttl(&self) -> Option<Duration> {
        self.artifact_ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            store_kind: StoreKind::Disk,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            artifact_ttl: None,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_u64(name: &str, value: &str) -> ShareResult<u64> {
    value.parse::<u64>().map_err(|e| {
        ShareError::InvalidConfig(format!("{} must be a non-negative integer: {}", name, e))
    })
}

/// Parse the upload directory. Blank or missing values fall back to [`DEFAULT_UPLOAD_DIR`].
pub fn upload_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
}

/// Parse the store kind. Blank or missing values select [`StoreKind::Disk`].
pub fn store_kind_from_env_value(value: Option<String>) -> ShareResult<StoreKind> {
    non_blank(value)
        .map(|v| v.parse::<StoreKind>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse the maximum upload size in bytes.
pub fn max_upload_bytes_from_env_value(value: Option<String>) -> ShareResult<u64> {
    match non_blank(value) {
        Some(v) => parse_u64("DROPSHARE_MAX_UPLOAD_BYTES", &v),
        None => Ok(DEFAULT_MAX_UPLOAD_BYTES),
    }
}

/// Parse the artifact TTL in seconds. Missing, blank or `0` disables expiry.
pub fn artifact_ttl_from_env_value(value: Option<String>) -> ShareResult<Option<Duration>> {
    let secs = match non_blank(value) {
        Some(v) => parse_u64("DROPSHARE_ARTIFACT_TTL_SECS", &v)?,
        None => return Ok(None),
    };
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Parse the sweep interval in seconds.
pub fn sweep_interval_from_env_value(value: Option<String>) -> ShareResult<Duration> {
    let secs = match non_blank(value) {
        Some(v) => parse_u64("DROPSHARE_SWEEP_INTERVAL_SECS", &v)?,
        None => DEFAULT_SWEEP_INTERVAL_SECS,
    };
    Ok(Duration::from_secs(secs))
}
