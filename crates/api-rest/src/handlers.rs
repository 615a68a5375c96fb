//! Request handlers.
//!
//! Storage calls are blocking filesystem I/O, so every handler hands them to the blocking pool
//! and only does request parsing and response building on the async side.

use crate::{ApiError, AppState, Operation};
use api_shared::{DownloadQuery, HealthRes, HealthService, UploadRes, UPLOAD_FIELD_NAME};
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State,
    },
    http::{header, HeaderValue},
    response::{IntoResponse, Json, Response},
};
use dropshare_core::{NameError, ShareError};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = api_shared::UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadRes),
        (status = 400, description = "No file uploaded", body = api_shared::ErrorRes),
        (status = 413, description = "File too large", body = api_shared::ErrorRes),
        (status = 500, description = "Storage failure", body = api_shared::ErrorRes)
    )
)]
/// Store an uploaded file and return its one-time name
///
/// Reads the first multipart field named `file`, stores its bytes under a fresh opaque name and
/// returns that name. The whole body is received before anything is written, so a client that
/// disconnects mid-upload leaves nothing behind.
///
/// # Returns
/// * `Ok(Json<UploadRes>)` - The stored name to embed in the download link
///
/// # Errors
/// Returns:
/// - `400 Bad Request` if the body is not multipart, has no `file` field, or the file is empty
/// - `413 Payload Too Large` if the file exceeds the configured limit
/// - `500 Internal Server Error` if storage fails
#[axum::debug_handler]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadRes>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("upload without multipart body: {}", e);
        ApiError::new(Operation::Upload, ShareError::MissingFile)
    })?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;
        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(ApiError::new(Operation::Upload, ShareError::MissingFile));
    };

    let share = state.share.clone();
    let artifact = tokio::task::spawn_blocking(move || share.store(file_name.as_deref(), &bytes))
        .await
        .map_err(|e| ApiError::internal(Operation::Upload, e))?
        .map_err(|e| ApiError::new(Operation::Upload, e))?;

    Ok(Json(UploadRes {
        filename: artifact.stored_name.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "File contents as application/octet-stream; the file is deleted"),
        (status = 400, description = "File not specified or invalid name", body = api_shared::ErrorRes),
        (status = 404, description = "File not found or already deleted", body = api_shared::ErrorRes),
        (status = 500, description = "Storage failure; the file is kept", body = api_shared::ErrorRes)
    )
)]
/// Deliver a stored file once and delete it
///
/// The artifact is removed from storage as soon as its bytes have been read, before the response
/// is sent. A client that disconnects mid-transfer has therefore consumed the link.
///
/// # Errors
/// Returns:
/// - `400 Bad Request` if the query string is malformed, or `file` is missing, empty, or not a
///   name this service could have issued
/// - `404 Not Found` if the file never existed, was already downloaded, or has expired
/// - `500 Internal Server Error` if the file could not be read; it stays available
#[axum::debug_handler]
pub async fn download(
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| {
        ApiError::new(
            Operation::Download,
            ShareError::InvalidName(NameError::Malformed(e.body_text())),
        )
    })?;

    let share = state.share.clone();
    let download = tokio::task::spawn_blocking(move || share.retrieve(query.file.as_deref()))
        .await
        .map_err(|e| ApiError::internal(Operation::Download, e))?
        .map_err(|e| ApiError::new(Operation::Download, e))?;

    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", download.stored_name))
            .map_err(|e| ApiError::internal(Operation::Download, e))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}
