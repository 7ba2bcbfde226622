//! Stored file naming.
//!
//! Uploads are stored as `<base36 millis>.<extension>`, where the timestamp
//! is the wall-clock time of the upload and the extension is taken verbatim
//! from the filename the client declared. Nothing about the content goes into
//! the name.

use std::time::{SystemTime, UNIX_EPOCH};

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Render a number in base 36 using `0-9a-z`.
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    // u64::MAX needs 13 base-36 digits
    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    // Every byte comes from BASE36_DIGITS
    digits.into_iter().map(char::from).collect()
}

/// Milliseconds since the Unix epoch. Clocks set before 1970 read as 0.
pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Extension of a client-declared filename.
///
/// Only the last path component is considered (both `/` and `\` separate
/// components), and the extension is whatever follows its last `.`. Returns
/// an empty string when there is no `.`. Case is preserved.
pub fn extension_of(original_filename: &str) -> &str {
    let base = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);

    match base.rsplit_once('.') {
        Some((_, extension)) => extension,
        None => "",
    }
}

/// Generate the stored name for an upload received at `time`.
///
/// The `.` separator is always present, so a filename without an extension
/// produces a name ending in `.`.
pub fn generate_file_name(time: SystemTime, original_filename: &str) -> String {
    format!(
        "{}.{}",
        to_base36(epoch_millis(time)),
        extension_of(original_filename)
    )
}
