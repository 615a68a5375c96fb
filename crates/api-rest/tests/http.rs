use api_rest::{router, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use dropshare_core::{CoreConfig, ShareService, StoreKind};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "dropshare-test-boundary";

fn app_with_limit(temp: &TempDir, max_upload_bytes: u64) -> Router {
    let cfg = CoreConfig::new(
        temp.path().join("uploads"),
        StoreKind::Disk,
        max_upload_bytes,
        None,
        Duration::from_secs(60),
    )
    .unwrap();
    let share = ShareService::open(Arc::new(cfg)).unwrap();
    router(AppState::new(share))
}

fn app(temp: &TempDir) -> Router {
    app_with_limit(temp, 1024 * 1024)
}

fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                field, name
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn download_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn upload(app: &Router, filename: &str, content: &[u8]) -> String {
    let response = app
        .clone()
        .oneshot(upload_request(multipart_body("file", Some(filename), content)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["filename"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(download_request("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ok"], true);
}

#[tokio::test]
async fn test_upload_then_download_round_trip() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);
    let content = b"hello world\n\x00\xff binary tail";

    let name = upload(&app, "notes.txt", content).await;
    assert_eq!(name.len(), 10 + 1 + "notes.txt".len());
    assert!(name.ends_with("-notes.txt"));

    let response = app
        .clone()
        .oneshot(download_request(&format!("/download?file={}", name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"{}\"", name).as_str()
    );
    assert_eq!(body_bytes(response).await, content);
}

#[tokio::test]
async fn test_second_download_is_not_found() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);
    let name = upload(&app, "once.bin", b"payload").await;
    let uri = format!("/download?file={}", name);

    let first = app.clone().oneshot(download_request(&uri)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(download_request(&uri)).await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(second).await["error"],
        "File not found or already deleted"
    );
}

#[tokio::test]
async fn test_identical_uploads_get_distinct_names() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let first = upload(&app, "same.txt", b"same").await;
    let second = upload(&app, "same.txt", b"same").await;
    assert_ne!(first, second);

    for name in [first, second] {
        let response = app
            .clone()
            .oneshot(download_request(&format!("/download?file={}", name)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"same");
    }
}

#[tokio::test]
async fn test_upload_path_components_are_stripped() {
    let temp = TempDir::new().unwrap();
    let name = upload(&app(&temp), "../../etc/passwd", b"x").await;
    assert!(name.ends_with("-passwd"));
    assert!(!name.contains('/'));
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(upload_request(multipart_body("comment", None, b"just text")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_with_empty_file_is_bad_request() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(upload_request(multipart_body("file", Some("empty.txt"), b"")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_without_multipart_body_is_bad_request() {
    let temp = TempDir::new().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app(&temp).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let temp = TempDir::new().unwrap();
    let app = app_with_limit(&temp, 16);

    let response = app
        .clone()
        .oneshot(upload_request(multipart_body("file", Some("big.bin"), &[7u8; 64])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"], "File too large");

    let accepted = upload(&app, "small.bin", &[7u8; 16]).await;
    assert!(accepted.ends_with("-small.bin"));
}

#[tokio::test]
async fn test_download_without_name_is_bad_request() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    for uri in ["/download", "/download?file="] {
        let response = app.clone().oneshot(download_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body_json(response).await["error"], "File not specified");
    }
}

#[tokio::test]
async fn test_download_path_traversal_is_rejected() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("secret.txt"), b"do not leak").unwrap();
    let app = app(&temp);

    for uri in [
        "/download?file=..%2Fsecret.txt",
        "/download?file=..%2F..%2Fetc%2Fpasswd",
        "/download?file=AAAAAAAAAA-..%2Fsecret.txt",
        "/download?file=.staging",
    ] {
        let response = app.clone().oneshot(download_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body_json(response).await["error"], "Invalid file name");
    }

    assert!(temp.path().join("secret.txt").exists());
}

#[tokio::test]
async fn test_download_unknown_name_is_not_found() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(download_request("/download?file=AAAAAAAAAA-missing.txt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_downloads_deliver_once() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);
    let name = upload(&app, "race.txt", b"only one winner").await;
    let uri = format!("/download?file={}", name);

    let first = tokio::spawn(app.clone().oneshot(download_request(&uri)));
    let second = tokio::spawn(app.clone().oneshot(download_request(&uri)));
    let (first, second) = tokio::join!(first, second);

    let mut statuses = [
        first.unwrap().unwrap().status(),
        second.unwrap().unwrap().status(),
    ];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::NOT_FOUND]);
}

#[tokio::test]
async fn test_malformed_download_query_gets_json_error() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(download_request("/download?file=a&file=b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(body_json(response).await["error"], "Invalid file name");
}
