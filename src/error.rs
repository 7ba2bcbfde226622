use thiserror::Error;

/// Errors that can occur while accepting an upload
#[derive(Debug, Error)]
pub enum UploadError {
    /// The multipart body contained no file part (maps to HTTP 400)
    #[error("No file part in multipart body")]
    NoFile,

    /// The multipart body could not be decoded
    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    /// Creating or writing the destination file failed.
    ///
    /// Bytes already written stay on disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from resolving a file on the upload host
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No file under the upload directory matches the request path
    #[error("File not found: {path}")]
    NotFound { path: String },
}
