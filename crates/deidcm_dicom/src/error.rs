//! Error types for DICOM header parsing and writing

use std::io;
use thiserror::Error;

/// DICOM codec error type
#[derive(Error, Debug)]
pub enum DicomError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Not a DICOM stream: missing DICM magic after preamble")]
    BadMagic,

    #[error("Truncated stream: expected {expected} more bytes at offset {offset}")]
    Truncated { offset: u64, expected: usize },

    #[error("Unknown value representation {vr:?} for tag {tag}")]
    UnknownVr { tag: String, vr: [u8; 2] },

    #[error("Malformed sequence under tag {tag}: {reason}")]
    MalformedSequence { tag: String, reason: String },

    #[error("Value of tag {tag} is {len} bytes, too long for its length field")]
    ValueTooLong { tag: String, len: usize },

    #[error("Unknown tag keyword: {0}")]
    UnknownKeyword(String),

    #[error("Invalid tag literal: {0}")]
    InvalidTag(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DicomError>;
