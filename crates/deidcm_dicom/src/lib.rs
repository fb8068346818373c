//! deidcm_dicom - DICOM header model and codec
//!
//! The in-memory data model (tags, VRs, elements, data sets), a small
//! standard-tag dictionary, the [`HeaderCodec`] capability trait, and
//! [`WireCodec`], an explicit-VR little-endian implementation of it.

pub mod codec;
pub mod dataset;
pub mod dict;
pub mod error;
pub mod tag;
pub mod vr;
pub mod wire;

pub use codec::HeaderCodec;
pub use dataset::{DataSet, Element, Value};
pub use error::{DicomError, Result};
pub use tag::Tag;
pub use vr::Vr;
pub use wire::{is_dicom_file, WireCodec};

/// Directory-record sequence tag in a DICOMDIR file.
pub const DIRECTORY_RECORD_SEQUENCE: Tag = Tag::new(0x0004, 0x1220);

/// Conventional file name of a directory-index file.
pub const DICOMDIR_NAME: &str = "DICOMDIR";
