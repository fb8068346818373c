//! deidcm - DICOM batch de-identifier
//!
//! Classifies filesystem items (files, directories, archives) as
//! DICOM-bearing and strips or zero-fills identifying header fields,
//! always working on copies of the originals.

pub mod archive;
pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod redact;

pub use classify::{classify, Classification};
pub use config::{PolicyMode, RunConfig};
pub use error::{DeidError, Result};
pub use pipeline::{Orchestrator, RunReport, BUNDLE_DIR_NAME, OUTPUT_SUFFIX};
pub use policy::TagPolicy;
