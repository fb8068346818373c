//! Test fixtures for the deidcm workspace.
//!
//! Builders for representative headers (instances with nested
//! sequences, DICOMDIR structures with offset-bearing records) and
//! helpers to materialize them as files or zip archives in a temp tree.

use deidcm_dicom::{DataSet, Element, Tag, Value, Vr, WireCodec, DIRECTORY_RECORD_SEQUENCE};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const PATIENT_NAME: Tag = Tag::new(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag::new(0x0010, 0x0020);
pub const PATIENT_BIRTH_DATE: Tag = Tag::new(0x0010, 0x0030);
pub const REFERENCED_PATIENT_SEQUENCE: Tag = Tag::new(0x0008, 0x1120);
pub const SOP_INSTANCE_UID: Tag = Tag::new(0x0008, 0x0018);
pub const MODALITY: Tag = Tag::new(0x0008, 0x0060);
pub const ROWS: Tag = Tag::new(0x0028, 0x0010);
pub const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);

/// A plausible instance header: identifying fields, technical fields,
/// pixel data, private elements at the top level and inside a nested
/// sequence that also carries the patient name one level down.
pub fn sample_instance(patient_name: &str) -> DataSet {
    let nested: DataSet = [
        Element::text(PATIENT_NAME, Vr::Pn, patient_name),
        Element::text(PATIENT_ID, Vr::Lo, "PID-0001"),
        Element::text(Tag::new(0x0009, 0x0011), Vr::Lo, "VENDOR PRIVATE NESTED"),
    ]
    .into_iter()
    .collect();
    [
        Element::text(SOP_INSTANCE_UID, Vr::Ui, "1.2.826.0.1.3680043.2.1125.1"),
        Element::text(MODALITY, Vr::Cs, "CT"),
        Element::text(PATIENT_NAME, Vr::Pn, patient_name),
        Element::text(PATIENT_ID, Vr::Lo, "PID-0001"),
        Element::text(PATIENT_BIRTH_DATE, Vr::Da, "19700101"),
        Element::text(Tag::new(0x0009, 0x0010), Vr::Lo, "VENDOR PRIVATE"),
        Element::us(ROWS, 512),
        Element::sequence(REFERENCED_PATIENT_SEQUENCE, vec![nested]),
        Element::bytes(PIXEL_DATA, Vr::Ow, vec![0u8; 32]),
    ]
    .into_iter()
    .collect()
}

/// A header whose only occurrence of `target` sits `depth` sequence
/// levels down (depth 0 = top level).
pub fn instance_with_target_at_depth(target: Tag, depth: usize) -> DataSet {
    let mut current: DataSet = [
        Element::text(target, Vr::Pn, "BURIED^VALUE"),
        Element::text(MODALITY, Vr::Cs, "MR"),
    ]
    .into_iter()
    .collect();
    for _ in 0..depth {
        current = [
            Element::sequence(REFERENCED_PATIENT_SEQUENCE, vec![current]),
            Element::text(MODALITY, Vr::Cs, "MR"),
        ]
        .into_iter()
        .collect();
    }
    current
}

/// A DICOMDIR-shaped header: the `(0004,1220)` record sequence with a
/// patient-level and a study-level record (both carrying PHI fields and
/// byte-offset fields) plus lower-level records that must stay intact.
pub fn dicomdir_dataset() -> DataSet {
    let patient_record: DataSet = [
        Element::ul(Tag::new(0x0004, 0x1400), 1234),
        Element::text(Tag::new(0x0004, 0x1430), Vr::Cs, "PATIENT"),
        Element::text(PATIENT_NAME, Vr::Pn, "DOE^JOHN"),
        Element::text(PATIENT_ID, Vr::Lo, "PID-0001"),
        Element::text(PATIENT_BIRTH_DATE, Vr::Da, "19700101"),
    ]
    .into_iter()
    .collect();
    let study_record: DataSet = [
        Element::ul(Tag::new(0x0004, 0x1400), 5678),
        Element::text(Tag::new(0x0004, 0x1430), Vr::Cs, "STUDY"),
        Element::text(Tag::new(0x0008, 0x0020), Vr::Da, "20240115"),
        Element::text(Tag::new(0x0008, 0x0050), Vr::Sh, "ACC-9"),
    ]
    .into_iter()
    .collect();
    let series_record: DataSet = [
        Element::text(Tag::new(0x0004, 0x1430), Vr::Cs, "SERIES"),
        Element::text(MODALITY, Vr::Cs, "CT"),
    ]
    .into_iter()
    .collect();
    [
        Element::text(Tag::new(0x0004, 0x1130), Vr::Cs, "FILESET-1"),
        Element::sequence(
            DIRECTORY_RECORD_SEQUENCE,
            vec![patient_record, study_record, series_record],
        ),
    ]
    .into_iter()
    .collect()
}

/// Write a data set as a wire-format file at `path`.
pub fn write_instance(path: &Path, dataset: &DataSet) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    WireCodec::write_path(path, dataset).expect("write instance");
}

/// Zip the contents of `src_dir` (recursively, relative names) into
/// `dest`.
pub fn zip_dir(src_dir: &Path, dest: &Path) {
    let file = fs::File::create(dest).expect("create zip");
    let mut writer = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip_dir_inner(&mut writer, src_dir, src_dir, options);
    writer.finish().expect("finish zip");
}

fn zip_dir_inner(
    writer: &mut ZipWriter<fs::File>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    entries.sort();
    for path in entries {
        let rel = path
            .strip_prefix(root)
            .expect("relative path")
            .to_string_lossy()
            .replace('\\', "/");
        if path.is_dir() {
            writer.add_directory(format!("{rel}/"), options).expect("add dir");
            zip_dir_inner(writer, root, &path, options);
        } else {
            writer.start_file(rel, options).expect("start file");
            let content = fs::read(&path).expect("read file");
            writer.write_all(&content).expect("write entry");
        }
    }
}

/// A scratch input tree for orchestrator tests.
pub struct TestEnv {
    /// Temp directory (cleaned up on drop)
    _temp: TempDir,
    /// Input root handed to the orchestrator
    pub input_dir: PathBuf,
    /// Work directory where outputs materialize
    pub work_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let input_dir = temp.path().join("input");
        let work_dir = temp.path().join("work");
        fs::create_dir_all(&input_dir).expect("create input dir");
        fs::create_dir_all(&work_dir).expect("create work dir");
        Self {
            _temp: temp,
            input_dir,
            work_dir,
        }
    }

    /// Write an instance file under the input root.
    pub fn write_input_instance(&self, name: &str, dataset: &DataSet) -> PathBuf {
        let path = self.input_dir.join(name);
        write_instance(&path, dataset);
        path
    }

    /// Write an arbitrary (non-DICOM) file under the input root.
    pub fn write_input_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write file");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode helper for assertions on written output.
pub fn read_instance(path: &Path) -> DataSet {
    WireCodec::read_path(path).expect("read instance")
}

/// Text value of an element, for assertions.
pub fn text_of(dataset: &DataSet, tag: Tag) -> Option<String> {
    match dataset.get(tag).map(|e| &e.value) {
        Some(Value::Text(s)) => Some(s.clone()),
        _ => None,
    }
}
