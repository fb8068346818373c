//! Run orchestration
//!
//! Enumerates the input root, classifies each item, and dispatches it
//! to the matching redaction path. Originals are never touched:
//! files and directories are copied into the work directory first,
//! archives are unpacked into per-item scratch that is removed before
//! the next item starts. A failed item is logged and recorded; the
//! batch always runs to completion.

use crate::archive;
use crate::classify::classify;
use crate::config::RunConfig;
use crate::error::{DeidError, Result};
use crate::policy::TagPolicy;
use crate::redact::{DicomDirRedactor, InstanceRedactor};
use chrono::{DateTime, Utc};
use deidcm_dicom::{HeaderCodec, DICOMDIR_NAME};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{error, info};
use walkdir::WalkDir;

/// Suffix inserted into every output artifact name.
pub const OUTPUT_SUFFIX: &str = "_deidentified";

/// Bundle directory created inside the input root.
pub const BUNDLE_DIR_NAME: &str = "deidentified_output";

/// Which redaction path produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactKind {
    File,
    Directory,
    Archive,
    Index,
}

/// Terminal state of one processed item.
#[derive(Debug)]
pub enum ItemState {
    Redacted { kind: RedactKind, output: PathBuf },
    Skipped,
}

/// One failed item in the run report.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub reason: String,
}

/// Summary of a whole run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub total: usize,
    pub redacted: usize,
    pub skipped: usize,
    pub failed: Vec<ItemFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one de-identification run.
pub struct Orchestrator {
    config: RunConfig,
    instance_policy: TagPolicy,
    index_policy: TagPolicy,
    codec: Arc<dyn HeaderCodec>,
}

impl Orchestrator {
    /// Load both policy lists and build the orchestrator. Policy
    /// problems abort here, before any item is touched.
    pub fn new(config: RunConfig, codec: Arc<dyn HeaderCodec>) -> Result<Self> {
        let instance_override = match config.mode {
            crate::config::PolicyMode::Keep => config.keep_list.as_deref(),
            crate::config::PolicyMode::Redact => config.redact_list.as_deref(),
        };
        let instance_policy = TagPolicy::load(config.mode, instance_override)?;
        // the DICOMDIR path always works from the redact list
        let index_policy = TagPolicy::load(
            crate::config::PolicyMode::Redact,
            config.redact_list.as_deref(),
        )?;
        info!(
            mode = ?config.mode,
            instance_tags = instance_policy.len(),
            index_tags = index_policy.len(),
            "tag policies loaded"
        );
        Ok(Self {
            config,
            instance_policy,
            index_policy,
            codec,
        })
    }

    /// Process every item in the input root.
    pub fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        if self.config.clear_previous {
            self.clear_old_output()?;
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.input_dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name != BUNDLE_DIR_NAME {
                names.push(name);
            }
        }
        // enumeration order is not guaranteed; sort for log readability
        names.sort();
        info!(count = names.len(), input = %self.config.input_dir.display(), "processing items");

        let mut redacted = 0;
        let mut skipped = 0;
        let mut failed = Vec::new();
        for name in &names {
            let path = self.config.input_dir.join(name);
            match self.process_item(name, &path) {
                Ok(ItemState::Redacted { kind, output }) => {
                    info!(item = %name, ?kind, output = %output.display(), "deidentified");
                    redacted += 1;
                }
                Ok(ItemState::Skipped) => {
                    info!(item = %name, "no DICOM content, skipped");
                    skipped += 1;
                }
                Err(e) => {
                    error!(item = %name, error = %e, "item failed");
                    failed.push(ItemFailure {
                        item: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if self.config.bundle {
            self.bundle_outputs()?;
        }

        Ok(RunReport {
            total: names.len(),
            redacted,
            skipped,
            failed,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Classify one item and dispatch it.
    fn process_item(&self, name: &str, path: &Path) -> Result<ItemState> {
        let class = classify(path, self.codec.as_ref());
        info!(
            item = %name,
            is_directory = class.is_directory,
            is_compressed = class.is_compressed,
            contains_dicom = class.contains_dicom,
            "classified"
        );

        if name == DICOMDIR_NAME && !self.config.dicomdir_via_pipeline {
            let output = self.redact_index_item(path)?;
            return Ok(ItemState::Redacted {
                kind: RedactKind::Index,
                output,
            });
        }
        if !class.contains_dicom {
            return Ok(ItemState::Skipped);
        }
        if class.is_directory {
            let output = self.redact_directory_item(name, path)?;
            Ok(ItemState::Redacted {
                kind: RedactKind::Directory,
                output,
            })
        } else if class.is_compressed {
            let output = self.redact_archive_item(name, path)?;
            Ok(ItemState::Redacted {
                kind: RedactKind::Archive,
                output,
            })
        } else {
            let output = self.redact_file_item(name, path)?;
            Ok(ItemState::Redacted {
                kind: RedactKind::File,
                output,
            })
        }
    }

    /// Plain file: copy to the derived output path, redact the copy.
    /// A failed redaction removes the copy, so no un-redacted output
    /// survives the item.
    fn redact_file_item(&self, name: &str, path: &Path) -> Result<PathBuf> {
        let output = self.config.work_dir.join(derived_output_name(name));
        fs::copy(path, &output)?;
        if let Err(e) = self.redact_instance_at(&output) {
            let _ = fs::remove_file(&output);
            return Err(e);
        }
        Ok(output)
    }

    /// Directory: copy the subtree, then redact every DICOM file in
    /// the copy (DICOMDIR files via the dedicated path).
    fn redact_directory_item(&self, name: &str, path: &Path) -> Result<PathBuf> {
        let output = self.config.work_dir.join(format!("{name}{OUTPUT_SUFFIX}"));
        if let Err(e) = copy_tree(path, &output).and_then(|()| self.redact_tree(&output)) {
            let _ = fs::remove_dir_all(&output);
            return Err(e);
        }
        Ok(output)
    }

    /// Archive: unpack into per-item scratch, redact the scratch tree,
    /// repack in the original container format. Scratch is dropped
    /// before returning, on failure too.
    fn redact_archive_item(&self, name: &str, path: &Path) -> Result<PathBuf> {
        let (stem, suffix, format) = archive::split_archive_name(name)
            .ok_or_else(|| DeidError::UnsupportedFormat(name.to_string()))?;
        let scratch = TempDir::new()?;
        let staging = scratch.path().join("unpacked");
        archive::unpack(path, &staging, format)?;
        self.redact_tree(&staging)?;
        let output = self
            .config
            .work_dir
            .join(format!("{stem}{OUTPUT_SUFFIX}{suffix}"));
        if let Err(e) = archive::pack(&staging, &output, format) {
            let _ = fs::remove_file(&output);
            return Err(e);
        }
        Ok(output)
    }

    /// Top-level DICOMDIR item: copy, then length-preserving redact.
    fn redact_index_item(&self, path: &Path) -> Result<PathBuf> {
        let output = self
            .config
            .work_dir
            .join(format!("{DICOMDIR_NAME}{OUTPUT_SUFFIX}"));
        fs::copy(path, &output)?;
        if let Err(e) = self.redact_index_at(&output) {
            let _ = fs::remove_file(&output);
            return Err(e);
        }
        Ok(output)
    }

    /// Redact every DICOM file under `root`, in place. `root` is
    /// always a copy or scratch tree, never an original.
    fn redact_tree(&self, root: &Path) -> Result<()> {
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_index = path
                .file_name()
                .map(|n| n == DICOMDIR_NAME)
                .unwrap_or(false);
            if is_index && !self.config.dicomdir_via_pipeline {
                self.redact_index_at(path)?;
            } else if self.codec.sniff(path) {
                self.redact_instance_at(path)?;
            }
        }
        Ok(())
    }

    fn redact_instance_at(&self, path: &Path) -> Result<()> {
        let mut header = self.codec.read(path)?;
        InstanceRedactor::new(&self.instance_policy)
            .redact(&mut header, self.config.skip_private_tags);
        self.codec.write(path, &header)?;
        Ok(())
    }

    fn redact_index_at(&self, path: &Path) -> Result<()> {
        let mut header = self.codec.read(path)?;
        DicomDirRedactor::new(&self.index_policy).redact(&mut header)?;
        self.codec.write(path, &header)?;
        Ok(())
    }

    /// Remove output directories and stale derived artifacts from a
    /// previous run so a re-run starts clean.
    fn clear_old_output(&self) -> Result<()> {
        for dir in [
            self.config.work_dir.join(BUNDLE_DIR_NAME),
            self.config.input_dir.join(BUNDLE_DIR_NAME),
        ] {
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
        }
        if self.config.work_dir.is_dir() {
            for entry in fs::read_dir(&self.config.work_dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.contains(OUTPUT_SUFFIX) {
                    let path = entry.path();
                    if path.is_dir() {
                        fs::remove_dir_all(&path)?;
                    } else {
                        fs::remove_file(&path)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Move every derived artifact from the work dir into the bundle
    /// directory inside the input root.
    fn bundle_outputs(&self) -> Result<()> {
        let dest_dir = self.config.input_dir.join(BUNDLE_DIR_NAME);
        fs::create_dir_all(&dest_dir)?;
        for entry in fs::read_dir(&self.config.work_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.contains(OUTPUT_SUFFIX) {
                move_artifact(&entry.path(), &dest_dir.join(&name))?;
            }
        }
        info!(bundle = %dest_dir.display(), "outputs bundled");
        Ok(())
    }
}

/// `scan.dcm` -> `scan_deidentified.dcm`; archive suffixes are kept
/// whole (`study.tar.gz` -> `study_deidentified.tar.gz`); names
/// without an extension get the bare suffix (`DICOMDIR` ->
/// `DICOMDIR_deidentified`).
pub fn derived_output_name(name: &str) -> String {
    if let Some((stem, suffix, _)) = archive::split_archive_name(name) {
        return format!("{stem}{OUTPUT_SUFFIX}{suffix}");
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{OUTPUT_SUFFIX}.{ext}"),
        _ => format!("{name}{OUTPUT_SUFFIX}"),
    }
}

/// Recursive copy preserving relative layout.
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).map_err(|e| {
            DeidError::Io(io::Error::other(format!(
                "path {} escaped {}: {e}",
                entry.path().display(),
                src.display()
            )))
        })?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Rename, falling back to copy-and-remove across filesystems.
fn move_artifact(src: &Path, dest: &Path) -> Result<()> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    if src.is_dir() {
        copy_tree(src, dest)?;
        fs::remove_dir_all(src)?;
    } else {
        fs::copy(src, dest)?;
        fs::remove_file(src)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_output_name() {
        assert_eq!(derived_output_name("scan.dcm"), "scan_deidentified.dcm");
        assert_eq!(derived_output_name("study.zip"), "study_deidentified.zip");
        assert_eq!(
            derived_output_name("study.tar.gz"),
            "study_deidentified.tar.gz"
        );
        assert_eq!(derived_output_name("DICOMDIR"), "DICOMDIR_deidentified");
        assert_eq!(
            derived_output_name(".hidden"),
            ".hidden_deidentified"
        );
    }
}
