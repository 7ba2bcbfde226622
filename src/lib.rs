//! # picdrop
//!
//! A minimal image/file host. Clients upload files with a Basic-authenticated
//! multipart `POST /upload`; each file is stored under a generated name and
//! served back, without authentication, from a virtual subdomain such as
//! `i.example.com`.
//!
//! ## Features
//!
//! - **Streaming uploads**: The file part is copied to disk in fixed-size
//!   chunks, yielding to the scheduler periodically so large uploads do not
//!   starve other requests
//! - **Generated names**: `<base36 millis>.<extension>`, no index or metadata
//! - **Virtual host serving**: Requests on the upload host are answered
//!   straight from the upload directory
//!
//! ## Architecture
//!
//! - [`upload`] - Multipart processing and file persistence
//! - [`storage`] - Filename generation and the yielding stream copy
//! - [`server`] - Axum router, Basic auth, virtual host file serving
//! - [`config`] - CLI and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use picdrop::{create_router, Credentials, HostPattern, RouterConfig, StaticResolver, UploadProcessor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let processor = UploadProcessor::new("i");
//!     let resolver = StaticResolver::new("i", HostPattern::default());
//!     let config = RouterConfig::new(
//!         Credentials::new("uploader", "hunter2"),
//!         "http://i.localhost:8080/",
//!     );
//!
//!     let router = create_router(processor, resolver, config);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod upload;

// Re-export commonly used types
pub use config::Config;
pub use error::{ResolveError, UploadError};
pub use server::{
    basic_auth_middleware, create_router, health_handler, root_handler, upload_handler, validate,
    virtual_host_middleware, AppState, AuthError, BasicAuth, Credentials, ErrorResponse,
    HealthResponse, HostPattern, Identity, RouterConfig, StaticResolver,
};
pub use storage::{
    copy_with_yield, extension_of, generate_file_name, prepare_upload_dir, CopyOptions,
    CopyStats, StoredFile,
};
pub use upload::UploadProcessor;
