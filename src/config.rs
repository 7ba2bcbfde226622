//! Configuration management for picdrop.
//!
//! Every option can be given on the command line or through an environment
//! variable with the `PICDROP_` prefix:
//!
//! - `PICDROP_HOST` - Server bind address (default: 0.0.0.0)
//! - `PICDROP_PORT` - Server port (default: 8080)
//! - `PICDROP_AUTH_USER` - Basic auth username (required)
//! - `PICDROP_AUTH_PASSWORD` - Basic auth password (required)
//! - `PICDROP_AUTH_REALM` - Basic auth realm (default: picdrop)
//! - `PICDROP_UPLOAD_URL` - Public base URL of uploaded files (default: http://i.localhost:8080/)
//! - `PICDROP_UPLOAD_DIR` - Upload directory, created if missing (default: i)
//! - `PICDROP_UPLOAD_HOST` - Host pattern serving uploads (default: `i\..+`)
//! - `PICDROP_COPY_BUFFER_SIZE` - Upload copy buffer in bytes (default: 8192)
//! - `PICDROP_YIELD_THRESHOLD` - Bytes copied between scheduler yields (default: 4 MiB)

use std::path::PathBuf;

use clap::Parser;

use crate::server::{
    Credentials, HostPattern, DEFAULT_AUTH_REALM, DEFAULT_UPLOAD_HOST_PATTERN, DEFAULT_UPLOAD_URL,
};
use crate::storage::{CopyOptions, DEFAULT_COPY_BUFFER_SIZE, DEFAULT_YIELD_THRESHOLD};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default upload directory, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "i";

const MIN_COPY_BUFFER_SIZE: usize = 512;
const MAX_COPY_BUFFER_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// picdrop - a minimal image host.
///
/// Accepts Basic-authenticated multipart uploads on `POST /upload` and serves
/// them back from a virtual subdomain.
#[derive(Parser, Debug, Clone)]
#[command(name = "picdrop")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PICDROP_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PICDROP_PORT")]
    pub port: u16,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Username accepted on the upload endpoint.
    #[arg(long, env = "PICDROP_AUTH_USER")]
    pub auth_user: String,

    /// Password accepted on the upload endpoint.
    #[arg(long, env = "PICDROP_AUTH_PASSWORD", hide_env_values = true)]
    pub auth_password: String,

    /// Realm announced in the Basic auth challenge.
    #[arg(long, default_value = DEFAULT_AUTH_REALM, env = "PICDROP_AUTH_REALM")]
    pub auth_realm: String,

    // =========================================================================
    // Upload Configuration
    // =========================================================================
    /// Public base URL of uploaded files.
    ///
    /// The stored filename is appended verbatim, so this should end with `/`.
    #[arg(long, default_value = DEFAULT_UPLOAD_URL, env = "PICDROP_UPLOAD_URL")]
    pub upload_url: String,

    /// Directory uploads are written to and served from.
    #[arg(long, default_value = DEFAULT_UPLOAD_DIR, env = "PICDROP_UPLOAD_DIR")]
    pub upload_dir: PathBuf,

    /// Regular expression matching the host that serves uploads.
    ///
    /// Matched against the whole host name, port excluded.
    #[arg(long, default_value = DEFAULT_UPLOAD_HOST_PATTERN, env = "PICDROP_UPLOAD_HOST")]
    pub upload_host: String,

    /// Read buffer size in bytes for writing uploads.
    #[arg(long, default_value_t = DEFAULT_COPY_BUFFER_SIZE, env = "PICDROP_COPY_BUFFER_SIZE")]
    pub copy_buffer_size: usize,

    /// Bytes copied between scheduler yields during an upload (0 = never yield).
    #[arg(long, default_value_t = DEFAULT_YIELD_THRESHOLD, env = "PICDROP_YIELD_THRESHOLD")]
    pub yield_threshold: u64,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth_user.is_empty() {
            return Err("Auth user is required. Set --auth-user or PICDROP_AUTH_USER".to_string());
        }
        // Basic auth splits user and password at the first colon
        if self.auth_user.contains(':') {
            return Err("Auth user must not contain ':'".to_string());
        }
        if self.auth_password.is_empty() {
            return Err(
                "Auth password is required. Set --auth-password or PICDROP_AUTH_PASSWORD"
                    .to_string(),
            );
        }
        if self.auth_realm.contains('"') {
            return Err("Auth realm must not contain '\"'".to_string());
        }

        match url::Url::parse(&self.upload_url) {
            Ok(url) if url.cannot_be_a_base() => {
                return Err(format!("Upload URL is not a base URL: {}", self.upload_url));
            }
            Ok(_) => {}
            Err(e) => return Err(format!("Invalid upload URL '{}': {}", self.upload_url, e)),
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err("Upload directory must not be empty".to_string());
        }

        self.host_pattern()
            .map_err(|e| format!("Invalid upload host pattern '{}': {}", self.upload_host, e))?;

        if self.copy_buffer_size < MIN_COPY_BUFFER_SIZE
            || self.copy_buffer_size > MAX_COPY_BUFFER_SIZE
        {
            return Err("copy_buffer_size must be between 512B and 16MB".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured Basic auth credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.auth_user, &self.auth_password)
    }

    /// Copy tuning for uploads.
    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions::new(self.copy_buffer_size, self.yield_threshold)
    }

    /// Compile the upload host pattern.
    pub fn host_pattern(&self) -> Result<HostPattern, regex::Error> {
        HostPattern::new(&self.upload_host)
    }
}

// =============================================================================
// Tests
// =============================================================================
