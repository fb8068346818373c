//! Error types for the de-identification engine

use std::io;
use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum DeidError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Header error: {0}")]
    Header(#[from] deidcm_dicom::DicomError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Redaction error: {0}")]
    Redaction(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DeidError>;
