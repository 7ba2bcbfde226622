//! Router configuration.
//!
//! # Route Structure
//!
//! ```text
//! GET|HEAD <any path> on the upload host  - Uploaded file (public)
//! GET  /                                  - Liveness text (public)
//! GET  /health                            - Health check (public)
//! POST /upload                            - Store a file (Basic auth)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use picdrop::server::auth::Credentials;
//! use picdrop::server::routes::{create_router, RouterConfig};
//! use picdrop::server::static_files::StaticResolver;
//! use picdrop::server::vhost::HostPattern;
//! use picdrop::upload::UploadProcessor;
//!
//! let processor = UploadProcessor::new("i");
//! let resolver = StaticResolver::new("i", HostPattern::default());
//! let config = RouterConfig::new(
//!     Credentials::new("uploader", "hunter2"),
//!     "http://i.localhost:8080/",
//! );
//!
//! let router = create_router(processor, resolver, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use http::{header::SERVER, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use super::auth::{basic_auth_middleware, BasicAuth, Credentials};
use super::handlers::{
    health_handler, not_found_handler, root_handler, upload_handler, AppState,
};
use super::static_files::{virtual_host_middleware, StaticResolver};
use crate::upload::UploadProcessor;

/// Default realm announced in the Basic auth challenge.
pub const DEFAULT_AUTH_REALM: &str = "picdrop";

/// Default public base URL for uploaded files.
pub const DEFAULT_UPLOAD_URL: &str = "http://i.localhost:8080/";

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Credentials accepted on the upload endpoint
    pub credentials: Credentials,

    /// Realm announced in the `WWW-Authenticate` challenge
    pub auth_realm: String,

    /// Public base URL prepended to stored filenames
    pub upload_url: String,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - The realm is `picdrop`
    /// - Tracing is enabled
    pub fn new(credentials: Credentials, upload_url: impl Into<String>) -> Self {
        Self {
            credentials,
            auth_realm: DEFAULT_AUTH_REALM.to_string(),
            upload_url: upload_url.into(),
            enable_tracing: true,
        }
    }

    /// Set the Basic auth realm.
    pub fn with_auth_realm(mut self, realm: impl Into<String>) -> Self {
        self.auth_realm = realm.into();
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The virtual host middleware wraps everything, so `GET`/`HEAD` requests on
/// the upload host are answered from the upload directory before routing.
/// Every other request goes through the routes below it.
pub fn create_router(
    processor: UploadProcessor,
    resolver: StaticResolver,
    config: RouterConfig,
) -> Router {
    let app_state = AppState::new(processor, config.upload_url.clone());
    let auth = BasicAuth::new(config.credentials.clone(), config.auth_realm.clone());
    debug!(realm = auth.realm(), "Basic authentication required on /upload");

    // Uploads have no size cap, so the default body limit is lifted here
    let upload_routes = Router::new()
        .route("/upload", post(upload_handler))
        .route_layer(middleware::from_fn_with_state(auth, basic_auth_middleware))
        .layer(DefaultBodyLimit::disable())
        .with_state(app_state);

    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler));

    let router = Router::new()
        .merge(upload_routes)
        .merge(public_routes)
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            resolver,
            virtual_host_middleware,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            SERVER,
            server_header(),
        ));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// `Server` header value, `picdrop/<version>`.
fn server_header() -> HeaderValue {
    HeaderValue::from_static(concat!("picdrop/", env!("CARGO_PKG_VERSION")))
}

// =============================================================================
// Tests
// =============================================================================
