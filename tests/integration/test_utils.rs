//! Test utilities for integration tests.
//!
//! Provides a router over a temporary upload directory and a small
//! multipart body builder.

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;

use picdrop::{
    create_router, Credentials, HostPattern, RouterConfig, StaticResolver, UploadProcessor,
};

pub const TEST_USER: &str = "uploader";
pub const TEST_PASSWORD: &str = "s3cret";
pub const TEST_UPLOAD_URL: &str = "http://i.localhost:8080/";
pub const MAIN_HOST: &str = "localhost:8080";
pub const UPLOAD_HOST: &str = "i.localhost:8080";

const BOUNDARY: &str = "----picdrop-test-boundary-7MA4YWxkTrZu0gW";

// =============================================================================
// Test Server
// =============================================================================

/// A router over its own temporary upload directory.
pub struct TestServer {
    pub router: Router,
    dir: TempDir,
}

impl TestServer {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp upload dir");
        let processor = UploadProcessor::new(dir.path());
        let resolver = StaticResolver::new(dir.path(), HostPattern::default());
        let config = RouterConfig::new(
            Credentials::new(TEST_USER, TEST_PASSWORD),
            TEST_UPLOAD_URL,
        )
        .with_tracing(false);

        Self {
            router: create_router(processor, resolver, config),
            dir,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Files currently in the upload directory, sorted by name.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }
}

// =============================================================================
// Multipart Bodies
// =============================================================================

/// One part of a multipart body.
pub enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        filename: &'a str,
        content: &'a [u8],
    },
}

/// Encode parts as a `multipart/form-data` body.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn basic_auth(username: &str, password: &str) -> String {
    Credentials::new(username, password).to_basic_header()
}

/// `POST /upload` on the main host with the given parts and auth header.
pub fn upload_request(parts: &[Part<'_>], authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("host", MAIN_HOST)
        .header("content-type", multipart_content_type());

    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }

    builder.body(Body::from(multipart_body(parts))).unwrap()
}

/// `POST /upload` with valid credentials and a single file part.
pub fn authorized_upload(filename: &str, content: &[u8]) -> Request<Body> {
    upload_request(
        &[Part::File {
            name: "file",
            filename,
            content,
        }],
        Some(&basic_auth(TEST_USER, TEST_PASSWORD)),
    )
}

/// `GET` a path on the given host.
pub fn get(host: &str, path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("host", host)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_string(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Split a returned URL into its stored filename.
pub fn file_name_from_url(url: &str) -> &str {
    url.strip_prefix(TEST_UPLOAD_URL)
        .expect("response URL starts with the upload URL")
}
