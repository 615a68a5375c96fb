//! # API Shared
//!
//! Shared wire definitions for the Dropshare HTTP API.
//!
//! Contains:
//! - JSON request/response types (`types` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and by clients that want typed responses.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
