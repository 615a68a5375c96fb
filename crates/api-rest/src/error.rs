//! Mapping of core errors onto HTTP responses.

use api_shared::ErrorRes;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use dropshare_core::{ShareError, StoreError};
use std::fmt;

/// Which endpoint an error came from; prefixes 500 messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Download,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Upload => f.write_str("File upload"),
            Operation::Download => f.write_str("File download"),
        }
    }
}

/// A failed request, rendered as `{ "error": ... }` with the matching status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(op: Operation, err: ShareError) -> Self {
        let (status, message) = match &err {
            ShareError::MissingFile => (StatusCode::BAD_REQUEST, "No file uploaded".to_string()),
            ShareError::MissingName => (StatusCode::BAD_REQUEST, "File not specified".to_string()),
            ShareError::InvalidName(_) => {
                (StatusCode::BAD_REQUEST, "Invalid file name".to_string())
            }
            ShareError::TooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "File too large".to_string())
            }
            ShareError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "File not found or already deleted".to_string(),
            ),
            ShareError::IdSpaceExhausted { .. }
            | ShareError::Storage(_)
            | ShareError::InvalidConfig(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} failed: {}", op, client_reason(&err)),
            ),
        };

        if status.is_server_error() {
            tracing::error!("{} error: {:?}", op, err);
        } else {
            tracing::debug!("{} rejected: {}", op, err);
        }

        Self { status, message }
    }

    /// A failure outside the core service, such as a panicked blocking task.
    pub fn internal(op: Operation, err: impl fmt::Display) -> Self {
        tracing::error!("{} internal error: {}", op, err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{} failed: internal error", op),
        }
    }

    /// Maps a multipart parsing failure. Oversized bodies are 413; anything else means the
    /// form did not deliver a usable file.
    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::debug!("upload body over limit: {}", err);
            return Self {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "File too large".into(),
            };
        }
        tracing::debug!("malformed multipart body: {}", err);
        Self::new(Operation::Upload, ShareError::MissingFile)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Server-side failure summary for clients. Storage errors carry filesystem paths, which stay
/// in the log.
fn client_reason(err: &ShareError) -> String {
    match err {
        ShareError::Storage(StoreError::Io(e)) => format!("storage I/O error ({})", e.kind()),
        ShareError::Storage(StoreError::LockPoisoned) => "storage unavailable".into(),
        ShareError::Storage(_) => "storage error".into(),
        ShareError::IdSpaceExhausted { .. } => "no free file name".into(),
        ShareError::InvalidConfig(_) => "server misconfigured".into(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorRes::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropshare_core::StoredName;

    #[test]
    fn test_client_errors_keep_fixed_messages() {
        let cases = [
            (ShareError::MissingFile, StatusCode::BAD_REQUEST, "No file uploaded"),
            (ShareError::MissingName, StatusCode::BAD_REQUEST, "File not specified"),
            (
                ShareError::NotFound("x".into()),
                StatusCode::NOT_FOUND,
                "File not found or already deleted",
            ),
            (
                ShareError::TooLarge { size: 2, limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large",
            ),
        ];

        for (err, status, message) in cases {
            let api = ApiError::new(Operation::Download, err);
            assert_eq!(api.status(), status);
            assert_eq!(api.message(), message);
        }
    }

    #[test]
    fn test_invalid_name_is_bad_request() {
        let err = StoredName::parse("../etc/passwd").unwrap_err();
        let api = ApiError::new(Operation::Download, ShareError::InvalidName(err));
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.message(), "Invalid file name");
    }

    #[test]
    fn test_storage_errors_are_server_errors_without_paths() {
        let io = std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "Failed to persist /srv/dropshare/uploads/V1StGXR8Z5-a.txt: permission denied",
        );
        let api = ApiError::new(Operation::Upload, ShareError::Storage(StoreError::Io(io)));
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.message().starts_with("File upload failed:"));
        assert!(api.message().contains("storage I/O error"));
        assert!(!api.message().contains("/srv"));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let api = ApiError::internal(Operation::Download, "task 7 panicked at /build/src/lib.rs");
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message(), "File download failed: internal error");
    }
}
