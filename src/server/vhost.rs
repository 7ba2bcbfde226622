//! Virtual host matching for the upload-serving subdomain.
//!
//! The pattern is a regular expression that must match the whole host name.
//! Ports are stripped before matching, so `i\..+` matches both
//! `i.example.com` and `i.example.com:8080`.

use axum::extract::Request;
use http::header::HOST;
use regex::Regex;

/// Default pattern: any host whose first label is `i`.
pub const DEFAULT_UPLOAD_HOST_PATTERN: &str = r"i\..+";

/// Host pattern identifying the upload-serving virtual host.
#[derive(Debug, Clone)]
pub struct HostPattern {
    source: String,
    regex: Regex,
}

impl HostPattern {
    /// Compile a pattern. The expression is anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as configured, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `host` (optionally carrying a port) matches.
    pub fn matches(&self, host: &str) -> bool {
        self.regex.is_match(strip_port(host))
    }
}

impl Default for HostPattern {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_HOST_PATTERN).expect("default host pattern is valid")
    }
}

/// Remove a trailing `:port` from a host, keeping IPv6 brackets intact.
pub fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Host a request was sent to.
///
/// Reads the `Host` header, falling back to the URI authority (HTTP/2
/// requests carry the host there).
pub fn request_host(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().authority().map(|authority| authority.as_str()))
}
