//! Serving uploaded files from the upload virtual host.
//!
//! Requests whose Host matches the configured [`HostPattern`] are answered
//! straight from the upload directory and never reach the application routes.
//! Path handling is delegated to [`ServeDir`]: percent-decoding, rejection of
//! `..` components, content-type from extension and conditional GET headers
//! all come from there. Directories are never listed or indexed.
//!
//! ```text
//! GET http://i.example.com/m5x2k1q0.png
//!        │
//!        ▼
//! virtual_host_middleware ── host matches? ──► StaticResolver ──► <upload_dir>/m5x2k1q0.png
//!        │ no
//!        ▼
//!   application routes
//! ```

use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;

use super::vhost::{request_host, HostPattern};
use crate::error::ResolveError;

/// Resolves requests on the upload host to files in the upload directory.
///
/// Read-only: nothing here writes to the directory.
#[derive(Clone)]
pub struct StaticResolver {
    root: PathBuf,
    host: HostPattern,
    serve_dir: ServeDir,
}

impl StaticResolver {
    /// Create a resolver serving `root` on hosts matching `host`.
    pub fn new(root: impl Into<PathBuf>, host: HostPattern) -> Self {
        let root = root.into();
        let serve_dir = ServeDir::new(&root).append_index_html_on_directories(false);

        Self {
            root,
            host,
            serve_dir,
        }
    }

    /// The directory files are served from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn host_pattern(&self) -> &HostPattern {
        &self.host
    }

    /// Whether this resolver should answer `request`.
    ///
    /// Only `GET` and `HEAD` on a matching host qualify.
    pub fn handles(&self, request: &Request) -> bool {
        matches!(*request.method(), Method::GET | Method::HEAD)
            && request_host(request).is_some_and(|host| self.host.matches(host))
    }

    /// Serve the file the request path points at.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NotFound`] when the path does not name a regular file
    /// inside the upload directory, including paths that try to escape it.
    pub async fn resolve(&self, request: Request) -> Result<Response, ResolveError> {
        let path = request.uri().path().to_string();

        let response = match self.serve_dir.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound { path });
        }

        debug!(path = %path, status = response.status().as_u16(), "Served upload");
        Ok(response.map(Body::new))
    }
}

/// Middleware routing upload-host requests to the [`StaticResolver`].
///
/// Requests that do not qualify (other hosts, other methods) continue to the
/// application routes unchanged.
pub async fn virtual_host_middleware(
    State(resolver): State<StaticResolver>,
    request: Request,
    next: Next,
) -> Response {
    if !resolver.handles(&request) {
        return next.run(request).await;
    }

    match resolver.resolve(request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
