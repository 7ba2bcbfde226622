//! Upload pipeline.
//!
//! The [`UploadProcessor`] turns an authenticated multipart request into a
//! file in the upload directory and reports the generated name. Building the
//! public URL from that name is left to the HTTP layer.

mod processor;

pub use processor::UploadProcessor;
