//! HTTP server layer for picdrop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   POST /upload (main host)        GET /{file} (upload host)     │
//! │                                                                 │
//! │  ┌───────────┐  ┌──────────┐  ┌──────────────┐  ┌───────────┐   │
//! │  │ handlers  │  │   auth   │  │ static_files │  │  routes   │   │
//! │  │ (upload)  │  │ (basic)  │  │ + vhost      │  │ (router)  │   │
//! │  └───────────┘  └──────────┘  └──────────────┘  └───────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod static_files;
pub mod vhost;

pub use auth::{
    basic_auth_middleware, validate, AuthError, AuthRejection, BasicAuth, Credentials, Identity,
};
pub use handlers::{
    health_handler, not_found_handler, root_handler, upload_handler, AppState, ErrorResponse,
    HealthResponse, LIVENESS_TEXT,
};
pub use routes::{create_router, RouterConfig, DEFAULT_AUTH_REALM, DEFAULT_UPLOAD_URL};
pub use static_files::{virtual_host_middleware, StaticResolver};
pub use vhost::{request_host, strip_port, HostPattern, DEFAULT_UPLOAD_HOST_PATTERN};
