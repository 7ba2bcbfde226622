//! Upload processing: multipart body in, stored file out.
//!
//! ```text
//! multipart ──► first file part ──► generate name ──► create file ──► copy
//!           └─► other parts: dropped unread
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use futures_util::TryStreamExt;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

use crate::error::UploadError;
use crate::storage::{copy_with_yield, generate_file_name, CopyOptions, CopyStats, StoredFile};

/// Persists uploaded files into the upload directory.
///
/// The processor holds no per-request state; one instance is shared by all
/// upload requests.
#[derive(Debug, Clone)]
pub struct UploadProcessor {
    upload_dir: PathBuf,
    copy_options: CopyOptions,
}

impl UploadProcessor {
    /// Create a processor writing into `upload_dir` with default copy tuning.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self::with_copy_options(upload_dir, CopyOptions::default())
    }

    pub fn with_copy_options(upload_dir: impl Into<PathBuf>, copy_options: CopyOptions) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            copy_options,
        }
    }

    /// The directory uploads are written to.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn copy_options(&self) -> CopyOptions {
        self.copy_options
    }

    /// Consume a multipart body and persist its first file part.
    ///
    /// A part counts as a file part when its `Content-Disposition` carries a
    /// `filename`. The first one is streamed to disk as soon as it is reached;
    /// every other part is dropped without reading its content. The body is
    /// consumed to the end either way.
    ///
    /// # Errors
    ///
    /// - [`UploadError::NoFile`] if the body has no file part (nothing is written)
    /// - [`UploadError::Multipart`] if the body cannot be decoded
    /// - [`UploadError::Io`] if the destination file cannot be created or written
    pub async fn process(&self, mut multipart: Multipart) -> Result<StoredFile, UploadError> {
        let mut stored: Option<StoredFile> = None;
        let mut discarded = 0usize;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let original_filename = match (&stored, field.file_name()) {
                (None, Some(name)) => name.to_string(),
                _ => {
                    discarded += 1;
                    continue;
                }
            };

            let reader = StreamReader::new(field.map_err(io::Error::other));
            let result = self.store(&original_filename, reader).await;
            stored = Some(result.map_err(body_read_error)?);
        }

        if discarded > 0 {
            debug!(discarded, "Discarded extra multipart parts");
        }

        stored.ok_or(UploadError::NoFile)
    }

    /// Write `reader` to a newly generated file in the upload directory.
    ///
    /// The name is generated from the current time and the extension of
    /// `original_filename`. The file is created exclusively, so a name that
    /// already exists fails with [`io::ErrorKind::AlreadyExists`] instead of
    /// replacing the earlier upload. A failed copy leaves the partial file in
    /// place.
    pub async fn store<R>(
        &self,
        original_filename: &str,
        reader: R,
    ) -> Result<StoredFile, UploadError>
    where
        R: AsyncRead,
    {
        self.store_at(SystemTime::now(), original_filename, reader)
            .await
    }

    async fn store_at<R>(
        &self,
        now: SystemTime,
        original_filename: &str,
        reader: R,
    ) -> Result<StoredFile, UploadError>
    where
        R: AsyncRead,
    {
        let name = generate_file_name(now, original_filename);
        let path = self.upload_dir.join(&name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                warn!(path = %path.display(), "Failed to create upload file: {}", e);
                e
            })?;

        let CopyStats { bytes, yields } =
            match copy_with_yield(reader, &mut file, self.copy_options).await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(path = %path.display(), "Upload copy aborted: {}", e);
                    // Land the chunks written so far before reporting
                    if let Err(flush_err) = file.flush().await {
                        warn!(path = %path.display(), "Failed to flush partial upload: {}", flush_err);
                    }
                    return Err(e.into());
                }
            };

        debug!(name = %name, bytes, yields, "Stored upload");

        Ok(StoredFile {
            name,
            path,
            size: bytes,
        })
    }
}

fn multipart_error(err: MultipartError) -> UploadError {
    UploadError::Multipart(err.body_text())
}

/// Reclassify a failed store whose error came from decoding the body.
///
/// Field stream errors reach the copy wrapped in an [`io::Error`]; those are
/// client faults (truncated body, aborted upload), not storage failures.
fn body_read_error(err: UploadError) -> UploadError {
    match err {
        UploadError::Io(io_err) => match io_err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
        {
            Some(multipart_err) => UploadError::Multipart(multipart_err.body_text()),
            None => UploadError::Io(io_err),
        },
        other => other,
    }
}
