//! Item classification
//!
//! One item from the input root is classified as
//! `{is_directory, is_compressed, contains_dicom}`. Classification
//! never errors: ambiguous or unreadable cases degrade to `false`.
//! Nothing here mutates the item; archive contents are inspected in a
//! scratch directory that is removed on every path.

use crate::archive::{self, ArchiveFormat};
use deidcm_dicom::HeaderCodec;
use std::path::Path;
use tempfile::TempDir;
use tracing::warn;
use walkdir::WalkDir;

/// Classification of one input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Classification {
    pub is_directory: bool,
    pub is_compressed: bool,
    pub contains_dicom: bool,
}

/// Classify the item at `path`.
pub fn classify(path: &Path, codec: &dyn HeaderCodec) -> Classification {
    let is_directory = path.is_dir();

    if is_directory {
        return Classification {
            is_directory: true,
            is_compressed: false,
            contains_dicom: dir_contains_dicom(path, codec),
        };
    }

    let format = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(archive::sniff_format)
        .filter(|format| archive::probe(path, *format));

    match format {
        Some(format) => Classification {
            is_directory: false,
            is_compressed: true,
            contains_dicom: archive_contains_dicom(path, format, codec),
        },
        None => Classification {
            is_directory: false,
            is_compressed: false,
            contains_dicom: codec.sniff(path),
        },
    }
}

/// True iff at least one regular file beneath `dir` carries the magic
/// preamble. Unreadable entries are skipped.
fn dir_contains_dicom(dir: &Path, codec: &dyn HeaderCodec) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .any(|entry| codec.sniff(entry.path()))
}

/// Unpack into scratch and evaluate the result; the scratch directory
/// is dropped (and removed) on success and failure alike.
fn archive_contains_dicom(path: &Path, format: ArchiveFormat, codec: &dyn HeaderCodec) -> bool {
    let scratch = match TempDir::new() {
        Ok(scratch) => scratch,
        Err(e) => {
            warn!(item = %path.display(), error = %e, "no scratch space for archive inspection");
            return false;
        }
    };
    if let Err(e) = archive::unpack(path, scratch.path(), format) {
        warn!(item = %path.display(), error = %e, "archive did not unpack cleanly");
        return false;
    }
    dir_contains_dicom(scratch.path(), codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deidcm_dicom::WireCodec;
    use deidcm_test_utils::{sample_instance, write_instance, zip_dir, TestEnv};
    use std::fs;

    fn triple(class: Classification) -> (bool, bool, bool) {
        (
            class.is_directory,
            class.is_compressed,
            class.contains_dicom,
        )
    }

    #[test]
    fn test_plain_dicom_file() {
        let env = TestEnv::new();
        let path = env.write_input_instance("scan.dcm", &sample_instance("DOE^JOHN"));
        assert_eq!(triple(classify(&path, &WireCodec)), (false, false, true));
    }

    #[test]
    fn test_plain_non_dicom_file() {
        let env = TestEnv::new();
        let path = env.write_input_file("notes.txt", b"just text");
        assert_eq!(triple(classify(&path, &WireCodec)), (false, false, false));
    }

    #[test]
    fn test_zero_byte_file() {
        let env = TestEnv::new();
        let path = env.write_input_file("empty.dcm", b"");
        assert_eq!(triple(classify(&path, &WireCodec)), (false, false, false));
    }

    #[test]
    fn test_directory_with_one_dicom_file() {
        let env = TestEnv::new();
        env.write_input_instance("series/scan.dcm", &sample_instance("DOE^JOHN"));
        env.write_input_file("series/readme.txt", b"nothing");
        let dir = env.input_dir.join("series");
        assert_eq!(triple(classify(&dir, &WireCodec)), (true, false, true));
    }

    #[test]
    fn test_directory_with_no_dicom() {
        let env = TestEnv::new();
        env.write_input_file("series/readme.txt", b"nothing");
        let dir = env.input_dir.join("series");
        assert_eq!(triple(classify(&dir, &WireCodec)), (true, false, false));
    }

    #[test]
    fn test_zip_containing_dicom() {
        let env = TestEnv::new();
        env.write_input_instance("staging/scan.dcm", &sample_instance("DOE^JOHN"));
        let archive = env.input_dir.join("study.zip");
        zip_dir(&env.input_dir.join("staging"), &archive);
        assert_eq!(triple(classify(&archive, &WireCodec)), (false, true, true));
    }

    #[test]
    fn test_zip_containing_directory() {
        let env = TestEnv::new();
        env.write_input_instance(
            "staging/series/scan.dcm",
            &sample_instance("DOE^JOHN"),
        );
        let archive = env.input_dir.join("study.zip");
        zip_dir(&env.input_dir.join("staging"), &archive);
        assert_eq!(triple(classify(&archive, &WireCodec)), (false, true, true));
    }

    #[test]
    fn test_corrupt_zip_is_not_compressed() {
        let env = TestEnv::new();
        let path = env.write_input_file("broken.zip", b"not really a zip");
        assert_eq!(triple(classify(&path, &WireCodec)), (false, false, false));
    }

    #[test]
    fn test_detection_leaves_no_scratch_residue() {
        let env = TestEnv::new();
        env.write_input_instance("staging/scan.dcm", &sample_instance("DOE^JOHN"));
        let archive = env.input_dir.join("study.zip");
        zip_dir(&env.input_dir.join("staging"), &archive);
        classify(&archive, &WireCodec);
        // the input tree is untouched apart from what the test created
        let names: Vec<_> = fs::read_dir(&env.input_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"staging".to_string()));
        assert!(names.contains(&"study.zip".to_string()));
    }
}
