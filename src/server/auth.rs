//! HTTP Basic authentication for the upload endpoint.
//!
//! A single username/password pair is configured at startup. Requests to
//! protected routes must carry it in an `Authorization: Basic` header:
//!
//! ```text
//! Authorization: Basic base64("{username}:{password}")
//! ```
//!
//! Requests without valid credentials are answered with `401 Unauthorized`
//! and a `WWW-Authenticate` challenge, and never reach the handler.
//!
//! # Example
//!
//! ```rust
//! use picdrop::server::auth::{validate, Credentials};
//!
//! let configured = Credentials::new("uploader", "hunter2");
//!
//! let identity = validate(&Credentials::new("uploader", "hunter2"), &configured);
//! assert_eq!(identity.unwrap().name, "uploader");
//!
//! assert!(validate(&Credentials::new("uploader", "wrong"), &configured).is_none());
//! ```

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::handlers::ErrorResponse;

// =============================================================================
// Types
// =============================================================================

/// A username/password pair.
///
/// Two pairs are equal only if both fields match byte for byte.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse the value of an `Authorization` header.
    ///
    /// The scheme name is case-insensitive. The decoded payload is split at
    /// the first `:`, so passwords may contain colons.
    pub fn from_basic_header(value: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = value
            .trim()
            .split_once(' ')
            .ok_or(AuthError::MalformedCredentials)?;

        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::MalformedCredentials);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MalformedCredentials)?;

        Ok(Self::new(username, password))
    }

    /// Encode as an `Authorization` header value.
    pub fn to_basic_header(&self) -> String {
        let payload = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(payload))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The username that was presented
    pub name: String,
}

/// Check presented credentials against the configured pair.
///
/// Returns the identity of the presented username when both fields match,
/// `None` otherwise.
pub fn validate(presented: &Credentials, configured: &Credentials) -> Option<Identity> {
    let username_ok = presented
        .username
        .as_bytes()
        .ct_eq(configured.username.as_bytes());
    let password_ok = presented
        .password
        .as_bytes()
        .ct_eq(configured.password.as_bytes());

    if bool::from(username_ok & password_ok) {
        Some(Identity {
            name: presented.username.clone(),
        })
    } else {
        None
    }
}

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header
    MissingCredentials,

    /// Header present but not valid Basic credentials
    MalformedCredentials,

    /// Credentials do not match the configured pair
    InvalidCredentials,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Missing credentials"),
            AuthError::MalformedCredentials => write!(f, "Malformed Basic credentials"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
        }
    }
}

impl AuthError {
    fn error_type(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::MalformedCredentials => "malformed_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
        }
    }
}

/// Authentication failure paired with the realm to challenge for.
#[derive(Debug, Clone)]
pub struct AuthRejection {
    pub error: AuthError,
    pub realm: String,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;
        let error_type = self.error.error_type();
        let message = self.error.to_string();

        // Wrong credentials may be a guessing attempt; a missing header is
        // just a client that has not authenticated yet
        match self.error {
            AuthError::InvalidCredentials => {
                warn!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
            _ => {
                debug!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
        }

        let challenge = format!("Basic realm=\"{}\", charset=\"UTF-8\"", self.realm);
        let error_response = ErrorResponse::with_status(error_type, message, status);
        let mut response = (status, Json(error_response)).into_response();

        if let Ok(value) = HeaderValue::from_str(&challenge) {
            response.headers_mut().insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}

// =============================================================================
// Basic Authentication
// =============================================================================

/// Basic authenticator holding the configured credentials.
#[derive(Clone)]
pub struct BasicAuth {
    credentials: Credentials,
    realm: String,
}

impl BasicAuth {
    pub fn new(credentials: Credentials, realm: impl Into<String>) -> Self {
        Self {
            credentials,
            realm: realm.into(),
        }
    }

    /// The realm announced in the `WWW-Authenticate` challenge.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Authenticate a raw `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let header = header.ok_or(AuthError::MissingCredentials)?;
        let presented = Credentials::from_basic_header(header)?;
        validate(&presented, &self.credentials).ok_or(AuthError::InvalidCredentials)
    }

    fn reject(&self, error: AuthError) -> AuthRejection {
        AuthRejection {
            error,
            realm: self.realm.clone(),
        }
    }
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Axum middleware enforcing Basic authentication.
///
/// On success the [`Identity`] is stored in the request extensions, where
/// handlers can pick it up with `Extension<Identity>`.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::post};
/// use picdrop::server::auth::{BasicAuth, Credentials, basic_auth_middleware};
///
/// let auth = BasicAuth::new(Credentials::new("user", "pass"), "picdrop");
/// let app = Router::new()
///     .route("/upload", post(upload_handler))
///     .route_layer(middleware::from_fn_with_state(auth, basic_auth_middleware));
/// ```
pub async fn basic_auth_middleware(
    State(auth): State<BasicAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| auth.reject(AuthError::MalformedCredentials))?,
        ),
        None => None,
    };

    let identity = auth
        .authenticate(header)
        .map_err(|error| auth.reject(error))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
