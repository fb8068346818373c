//! Header reader/writer capability
//!
//! The redaction engine consumes headers through this trait rather
//! than a concrete parser, so a different DICOM library can be slotted
//! in without touching the classification or redaction code.

use crate::dataset::DataSet;
use crate::error::Result;
use std::path::Path;

/// Read, write, and sniff header files.
///
/// Implementations must be shareable across a whole run; the engine
/// holds one instance behind an `Arc`.
pub trait HeaderCodec: Send + Sync {
    /// Parse the header at `path`.
    fn read(&self, path: &Path) -> Result<DataSet>;

    /// Serialize `dataset` to `path`, replacing the file contents.
    fn write(&self, path: &Path, dataset: &DataSet) -> Result<()>;

    /// Magic-preamble check. Never errors: unreadable or short files
    /// are simply not in the format.
    fn sniff(&self, path: &Path) -> bool;
}
