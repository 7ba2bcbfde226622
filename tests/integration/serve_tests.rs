//! Upload host integration tests.
//!
//! Tests verify:
//! - Uploaded files round-trip byte for byte through the upload host
//! - Missing files and directory paths are 404
//! - Path traversal cannot escape the upload directory
//! - Only the upload host serves files

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{
    authorized_upload, body_bytes, body_string, file_name_from_url, get, TestServer, MAIN_HOST,
    UPLOAD_HOST,
};

// =============================================================================
// Round Trip
// =============================================================================

#[tokio::test]
async fn test_upload_then_download() {
    let server = TestServer::new();

    let response = server
        .router
        .clone()
        .oneshot(authorized_upload("a.txt", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let url = body_string(response).await;
    let name = file_name_from_url(&url).to_string();

    // No credentials on the download
    let response = server
        .router
        .clone()
        .oneshot(get(UPLOAD_HOST, &format!("/{}", name)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body_bytes(response).await, b"hello");
}

#[tokio::test]
async fn test_binary_round_trip() {
    let server = TestServer::new();
    let content: Vec<u8> = (0..50_000u32).map(|i| (i * 31 % 256) as u8).collect();

    let response = server
        .router
        .clone()
        .oneshot(authorized_upload("image.png", &content))
        .await
        .unwrap();
    let url = body_string(response).await;
    let name = file_name_from_url(&url).to_string();

    let response = server
        .router
        .clone()
        .oneshot(get(UPLOAD_HOST, &format!("/{}", name)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(body_bytes(response).await, content);
}

#[tokio::test]
async fn test_round_trip_without_extension() {
    let server = TestServer::new();

    let response = server
        .router
        .clone()
        .oneshot(authorized_upload("data", b"no extension"))
        .await
        .unwrap();
    let url = body_string(response).await;
    let name = file_name_from_url(&url).to_string();
    assert!(name.ends_with('.'));

    let response = server
        .router
        .clone()
        .oneshot(get(UPLOAD_HOST, &format!("/{}", name)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"no extension");
}

#[tokio::test]
async fn test_head_on_upload_host() {
    let server = TestServer::new();
    std::fs::write(server.upload_dir().join("abc.txt"), b"hello").unwrap();

    let request = Request::builder()
        .method("HEAD")
        .uri("/abc.txt")
        .header("host", UPLOAD_HOST)
        .body(Body::empty())
        .unwrap();

    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-length"], "5");
    assert!(body_bytes(response).await.is_empty());
}

// =============================================================================
// Not Found
// =============================================================================

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let server = TestServer::new();

    let response = server
        .router
        .clone()
        .oneshot(get(UPLOAD_HOST, "/missing.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_string(response).await;
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_upload_host_root_is_not_listed() {
    let server = TestServer::new();
    std::fs::write(server.upload_dir().join("abc.txt"), b"hello").unwrap();

    // The liveness route belongs to the main host only
    let response = server
        .router
        .clone()
        .oneshot(get(UPLOAD_HOST, "/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let server = TestServer::new();

    for path in ["/../Cargo.toml", "/%2e%2e/%2e%2e/etc/passwd", "/..%2fsecret"] {
        let response = server
            .router
            .clone()
            .oneshot(get(UPLOAD_HOST, path))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
    }
}

// =============================================================================
// Host Routing
// =============================================================================

#[tokio::test]
async fn test_main_host_does_not_serve_files() {
    let server = TestServer::new();
    std::fs::write(server.upload_dir().join("abc.txt"), b"hello").unwrap();

    let response = server
        .router
        .clone()
        .oneshot(get(MAIN_HOST, "/abc.txt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_host_without_port() {
    let server = TestServer::new();
    std::fs::write(server.upload_dir().join("abc.txt"), b"hello").unwrap();

    let response = server
        .router
        .clone()
        .oneshot(get("i.localhost", "/abc.txt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"hello");
}

#[tokio::test]
async fn test_upload_accepted_on_upload_host() {
    let server = TestServer::new();

    // POST is not a file request, so it reaches the upload route on any host
    let mut request = authorized_upload("a.txt", b"hello");
    request
        .headers_mut()
        .insert("host", UPLOAD_HOST.parse().unwrap());

    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
