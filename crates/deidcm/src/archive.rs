//! Archive container handling
//!
//! Format detection is an explicit sniff by file-name suffix plus a
//! container probe that actually opens the archive, so corrupt or
//! misnamed files degrade to "not compressed" instead of driving
//! control flow through errors.

use crate::error::{DeidError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    Tar,
}

/// Recognized suffixes, longest first so `.tar.gz` wins over `.gz`.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".tar.gz", ArchiveFormat::TarGz),
    (".tgz", ArchiveFormat::TarGz),
    (".zip", ArchiveFormat::Zip),
    (".tar", ArchiveFormat::Tar),
];

/// Map a file name to a container format by suffix (case-insensitive).
pub fn sniff_format(name: &str) -> Option<ArchiveFormat> {
    split_archive_name(name).map(|(_, _, format)| format)
}

/// Split `study.tar.gz` into (`study`, `.tar.gz`, TarGz). Returns the
/// original-case stem and suffix so output names keep the input
/// spelling.
pub fn split_archive_name(name: &str) -> Option<(&str, &str, ArchiveFormat)> {
    let lower = name.to_ascii_lowercase();
    for (suffix, format) in SUFFIXES {
        if lower.ends_with(suffix) && name.len() > suffix.len() {
            let split = name.len() - suffix.len();
            return Some((&name[..split], &name[split..], *format));
        }
    }
    None
}

/// Open the container far enough to know it is intact. Any failure is
/// "not a valid archive", never an error.
pub fn probe(path: &Path, format: ArchiveFormat) -> bool {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    match format {
        ArchiveFormat::Zip => ZipArchive::new(file).is_ok(),
        ArchiveFormat::TarGz => {
            let mut archive = tar::Archive::new(GzDecoder::new(file));
            entries_readable(&mut archive)
        }
        ArchiveFormat::Tar => {
            let mut archive = tar::Archive::new(file);
            entries_readable(&mut archive)
        }
    }
}

fn entries_readable<R: std::io::Read>(archive: &mut tar::Archive<R>) -> bool {
    match archive.entries() {
        Ok(entries) => {
            let mut any = false;
            for entry in entries {
                if entry.is_err() {
                    return false;
                }
                any = true;
            }
            any
        }
        Err(_) => false,
    }
}

/// Unpack `path` into `dest`. Entry names are sanitized by the zip and
/// tar crates, so hostile archives cannot escape `dest`.
pub fn unpack(path: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    fs::create_dir_all(dest)?;
    let file = fs::File::open(path)?;
    match format {
        ArchiveFormat::Zip => {
            let mut archive = ZipArchive::new(file)?;
            archive.extract(dest)?;
        }
        ArchiveFormat::TarGz => {
            let mut archive = tar::Archive::new(GzDecoder::new(file));
            archive
                .unpack(dest)
                .map_err(|e| DeidError::Archive(format!("unpack {}: {e}", path.display())))?;
        }
        ArchiveFormat::Tar => {
            let mut archive = tar::Archive::new(file);
            archive
                .unpack(dest)
                .map_err(|e| DeidError::Archive(format!("unpack {}: {e}", path.display())))?;
        }
    }
    Ok(())
}

/// Pack the contents of `src_dir` (relative names, sorted for
/// determinism) into an archive at `dest`.
pub fn pack(src_dir: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let mut files = Vec::new();
    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(src_dir)
                .map_err(|e| DeidError::Archive(format!("relative path: {e}")))?
                .to_path_buf();
            files.push((rel, entry.path().to_path_buf()));
        }
    }

    // Canonical timestamps so repacking the same content is
    // byte-identical across runs.
    match format {
        ArchiveFormat::Zip => {
            let mut writer = ZipWriter::new(fs::File::create(dest)?);
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .last_modified_time(
                    zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
                        .map_err(|_| DeidError::Archive("invalid canonical date".to_string()))?,
                );
            for (rel, path) in &files {
                let name = rel.to_string_lossy().replace('\\', "/");
                writer.start_file(name, options)?;
                writer.write_all(&fs::read(path)?)?;
            }
            writer.finish()?;
        }
        ArchiveFormat::TarGz => {
            let encoder = GzEncoder::new(fs::File::create(dest)?, Compression::default());
            let mut builder = tar::Builder::new(encoder);
            for (rel, path) in &files {
                append_canonical(&mut builder, rel, path)?;
            }
            builder
                .into_inner()
                .and_then(|encoder| encoder.finish())
                .map_err(|e| DeidError::Archive(format!("finish {}: {e}", dest.display())))?;
        }
        ArchiveFormat::Tar => {
            let mut builder = tar::Builder::new(fs::File::create(dest)?);
            for (rel, path) in &files {
                append_canonical(&mut builder, rel, path)?;
            }
            builder
                .finish()
                .map_err(|e| DeidError::Archive(format!("finish {}: {e}", dest.display())))?;
        }
    }
    Ok(())
}

/// Append one file with a zeroed-out header (mtime 0, fixed mode) so
/// tar output does not depend on scratch-file metadata.
fn append_canonical<W: Write>(
    builder: &mut tar::Builder<W>,
    rel: &Path,
    path: &Path,
) -> Result<()> {
    let content = fs::read(path)?;
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_cksum();
    builder.append_data(&mut header, rel, content.as_slice())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sniff_by_suffix() {
        assert_eq!(sniff_format("study.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(sniff_format("STUDY.ZIP"), Some(ArchiveFormat::Zip));
        assert_eq!(sniff_format("study.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(sniff_format("study.tgz"), Some(ArchiveFormat::TarGz));
        assert_eq!(sniff_format("study.tar"), Some(ArchiveFormat::Tar));
        assert_eq!(sniff_format("study.dcm"), None);
        assert_eq!(sniff_format(".zip"), None);
    }

    #[test]
    fn test_split_keeps_original_spelling() {
        let (stem, suffix, format) = split_archive_name("Study.Tar.Gz").unwrap();
        assert_eq!(stem, "Study");
        assert_eq!(suffix, ".Tar.Gz");
        assert_eq!(format, ArchiveFormat::TarGz);
    }

    #[test]
    fn test_zip_roundtrip() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), b"alpha").unwrap();
        fs::write(src.join("sub/b.txt"), b"beta").unwrap();

        let archive = temp.path().join("out.zip");
        pack(&src, &archive, ArchiveFormat::Zip).unwrap();
        assert!(probe(&archive, ArchiveFormat::Zip));

        let dest = temp.path().join("dest");
        unpack(&archive, &dest, ArchiveFormat::Zip).unwrap();
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dest.join("sub/b.txt")).unwrap(), b"beta");
    }

    #[test]
    fn test_targz_roundtrip() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), b"alpha").unwrap();

        let archive = temp.path().join("out.tar.gz");
        pack(&src, &archive, ArchiveFormat::TarGz).unwrap();
        assert!(probe(&archive, ArchiveFormat::TarGz));

        let dest = temp.path().join("dest");
        unpack(&archive, &dest, ArchiveFormat::TarGz).unwrap();
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"alpha");
    }

    #[test]
    fn test_probe_rejects_corrupt_container() {
        let temp = TempDir::new().unwrap();
        let bogus = temp.path().join("bogus.zip");
        fs::write(&bogus, b"this is not a zip file").unwrap();
        assert!(!probe(&bogus, ArchiveFormat::Zip));
        assert!(!probe(&bogus, ArchiveFormat::TarGz));
        assert!(!probe(&temp.path().join("missing.zip"), ArchiveFormat::Zip));
    }
}
