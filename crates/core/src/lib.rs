//! # Dropshare Core
//!
//! Core business logic for the one-time file sharing service.
//!
//! This crate owns the artifact lifecycle:
//! - Store: sanitise the upload name, pick a fresh opaque id, create the artifact exclusively
//! - Retrieve-and-purge: validate the requested name, take the artifact at most once
//! - Expiry: optional TTL with a sweep over pending artifacts
//!
//! **No API concerns**: HTTP routing, status codes and JSON bodies belong in `api-rest` and
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod service;

pub use config::{CoreConfig, StoreKind};
pub use constants::DEFAULT_UPLOAD_DIR;
pub use dropshare_files::{StoreError, StoredArtifact};
pub use dropshare_types::{NameError, StoredName};
pub use error::{ShareError, ShareResult};
pub use service::{Download, ShareService};
