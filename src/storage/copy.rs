//! Chunked stream copy that yields to the scheduler.
//!
//! A large upload would otherwise keep a worker thread busy for as long as
//! the client keeps sending. The copy reads into a fixed-size buffer and
//! calls [`tokio::task::yield_now`] whenever the bytes copied since the last
//! yield reach the configured threshold.

use std::io;
use std::pin::pin;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default read buffer size (8 KiB).
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Default number of bytes copied between yields (4 MiB).
pub const DEFAULT_YIELD_THRESHOLD: u64 = 4 * 1024 * 1024;

/// Tuning for [`copy_with_yield`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Size of each read in bytes
    pub buffer_size: usize,

    /// Bytes copied between yields; 0 never yields
    pub yield_threshold: u64,
}

impl CopyOptions {
    pub fn new(buffer_size: usize, yield_threshold: u64) -> Self {
        Self {
            buffer_size,
            yield_threshold,
        }
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self::new(DEFAULT_COPY_BUFFER_SIZE, DEFAULT_YIELD_THRESHOLD)
    }
}

/// Outcome of a finished copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyStats {
    /// Total bytes written
    pub bytes: u64,

    /// Number of times the copy yielded to the scheduler
    pub yields: u64,
}

/// Copy `reader` into `writer` until EOF, then flush the writer.
///
/// Errors from either side abort the copy immediately. Whatever the writer
/// already accepted is not rolled back.
pub async fn copy_with_yield<R, W>(
    reader: R,
    writer: &mut W,
    options: CopyOptions,
) -> io::Result<CopyStats>
where
    R: AsyncRead,
    W: AsyncWrite + Unpin,
{
    let mut reader = pin!(reader);
    let mut buffer = vec![0u8; options.buffer_size.max(1)];
    let mut stats = CopyStats::default();
    let mut since_yield = 0u64;

    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }

        writer.write_all(&buffer[..read]).await?;
        stats.bytes += read as u64;
        since_yield += read as u64;

        if options.yield_threshold > 0 && since_yield >= options.yield_threshold {
            tokio::task::yield_now().await;
            stats.yields += 1;
            since_yield %= options.yield_threshold;
        }
    }

    writer.flush().await?;
    Ok(stats)
}
