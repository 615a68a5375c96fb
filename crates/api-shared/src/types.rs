//! JSON bodies exchanged with browser clients.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Multipart form field that carries the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Successful upload: the stored name to embed in the download link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    /// `<opaque_id>-<sanitised original name>`
    #[schema(example = "V1StGXR8Z5-report.pdf")]
    pub filename: String,
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    #[schema(example = "File not found or already deleted")]
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Multipart upload form, documented for OpenAPI only.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Query string of `GET /download`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Stored name returned by the upload
    pub file: Option<String>,
}
