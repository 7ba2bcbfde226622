//! Upload directory storage.
//!
//! Uploads live in a single flat directory. There is no index and no
//! metadata sidecar: the filename is the only record of an upload.
//!
//! ```text
//! i/
//! ├── m5x2k1q0.png
//! ├── m5x2k9fz.txt
//! └── m5x2lb03.
//! ```
//!
//! - [`naming`] - Stored filename generation (base-36 timestamp + extension)
//! - [`copy`] - Chunked copy that yields to the scheduler

pub mod copy;
pub mod naming;

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

pub use copy::{
    copy_with_yield, CopyOptions, CopyStats, DEFAULT_COPY_BUFFER_SIZE, DEFAULT_YIELD_THRESHOLD,
};
pub use naming::{epoch_millis, extension_of, generate_file_name, to_base36};

/// A file written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated filename (`<base36 millis>.<extension>`)
    pub name: String,

    /// Full path inside the upload directory
    pub path: PathBuf,

    /// Number of bytes written
    pub size: u64,
}

/// Create the upload directory (and missing parents) if it does not exist.
pub fn prepare_upload_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    std::fs::create_dir_all(dir)?;
    info!("Created upload directory {}", dir.display());
    Ok(())
}
