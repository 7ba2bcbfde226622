//! HTTP request handlers.
//!
//! # Endpoints
//!
//! - `GET /` - Liveness check (plain text)
//! - `GET /health` - Health check (JSON)
//! - `POST /upload` - Store an uploaded file, respond with its public URL

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use tracing::{debug, error, info};

use super::auth::Identity;
use crate::error::{ResolveError, UploadError};
use crate::upload::UploadProcessor;

/// Body of the `GET /` liveness response.
pub const LIVENESS_TEXT: &str = "FeelsDankMan";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Writes uploads into the upload directory
    pub processor: Arc<UploadProcessor>,

    /// Public base URL prepended to stored filenames
    pub upload_url: Arc<str>,
}

impl AppState {
    pub fn new(processor: UploadProcessor, upload_url: impl Into<String>) -> Self {
        Self {
            processor: Arc::new(processor),
            upload_url: Arc::from(upload_url.into()),
        }
    }

    /// Public URL of a stored file.
    ///
    /// Plain concatenation: the base URL is expected to end with `/`.
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}{}", self.upload_url, file_name)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "no_file", "invalid_multipart", "io_error", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Build the JSON error response, logging 5xx at ERROR and 4xx at DEBUG.
fn error_response(status: StatusCode, error_type: &str, message: String) -> Response {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }

    let body = ErrorResponse::with_status(error_type, message, status);
    (status, Json(body)).into_response()
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            UploadError::NoFile => (StatusCode::BAD_REQUEST, "no_file"),
            UploadError::Multipart(_) => (StatusCode::BAD_REQUEST, "invalid_multipart"),
            UploadError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        };

        error_response(status, error_type, self.to_string())
    }
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        match &self {
            ResolveError::NotFound { .. } => {
                error_response(StatusCode::NOT_FOUND, "not_found", self.to_string())
            }
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle liveness requests.
///
/// # Endpoint
///
/// `GET /`
pub async fn root_handler() -> &'static str {
    LIVENESS_TEXT
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle upload requests.
///
/// # Endpoint
///
/// `POST /upload` (Basic authentication required)
///
/// # Request
///
/// `multipart/form-data` with one file field. Other fields are ignored, and
/// so are file fields after the first.
///
/// # Response
///
/// `200 OK` with a `text/plain` body holding the public URL of the stored
/// file, e.g. `http://i.localhost:8080/m5x2k1q0.png`.
///
/// # Errors
///
/// - `400 Bad Request`: No file part, or the body is not valid multipart
/// - `401 Unauthorized`: Missing or wrong credentials (from the auth middleware)
/// - `500 Internal Server Error`: The file could not be written
pub async fn upload_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<String, UploadError> {
    let stored = state.processor.process(multipart).await?;

    info!(
        user = %identity.name,
        name = %stored.name,
        bytes = stored.size,
        "Upload stored"
    );

    Ok(state.public_url(&stored.name))
}

/// Handle requests that match no route.
pub async fn not_found_handler(uri: Uri) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("No route for {}", uri.path()),
    )
}

// =============================================================================
// Tests
// =============================================================================
