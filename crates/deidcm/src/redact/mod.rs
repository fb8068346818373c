//! Header redaction
//!
//! Two paths: the generic instance redactor (keep-list filtering or
//! recursive redact-list removal) and the DICOMDIR redactor
//! (length-preserving zero-fill, because the file carries byte offsets
//! into the records it indexes).

pub mod dicomdir;
pub mod instance;

pub use dicomdir::DicomDirRedactor;
pub use instance::InstanceRedactor;
