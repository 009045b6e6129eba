//! Local archive handling
//!
//! Zipping folders for upload and unpacking downloaded model archives.
//!
//! # Supported Formats
//!
//! - **Zip** (.zip): zip crate, deflate
//! - **Tar.gz** (.tar.gz, .tgz): flate2 + tar
//! - **Tar** (.tar): tar crate
//!
//! These functions do blocking file I/O. Async callers run them through
//! `tokio::task::spawn_blocking`.

use crate::error::{Result, ZenodoError};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive formats `extract_archive` understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    Tar,
}

impl ArchiveFormat {
    /// Detect the format from the file name suffix
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy();

        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Zip every regular file below `folder` into a sibling `<folder>.zip`
///
/// Member names are paths relative to `folder` with `/` separators.
/// Returns the path of the written archive.
pub fn zip_folder(folder: impl AsRef<Path>) -> Result<PathBuf> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(ZenodoError::NotADirectory(folder.display().to_string()));
    }

    // "." and ".." have no file name to derive a sibling from
    let folder = if folder.file_name().is_none() {
        folder.canonicalize()?
    } else {
        folder.to_path_buf()
    };
    let zip_path = folder.with_extension("zip");

    let mut writer = ZipWriter::new(BufWriter::new(File::create(&zip_path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0usize;

    for entry in WalkDir::new(&folder).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(&folder)
            .map_err(anyhow::Error::from)?;
        let member = member_name(relative);

        debug!(member = %member, "Adding file to archive");
        writer.start_file(member, options)?;
        let mut source = File::open(entry.path())?;
        std::io::copy(&mut source, &mut writer)?;
        count += 1;
    }

    writer.finish()?.flush()?;

    info!(archive = %zip_path.display(), files = count, "Folder zipped");
    Ok(zip_path)
}

fn member_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extract `archive` into `dest` and return the member names it held
///
/// Unsupported formats are logged and yield an empty list.
pub fn extract_archive(archive: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<Vec<String>> {
    let archive = archive.as_ref();
    let dest = dest.as_ref();

    let Some(format) = ArchiveFormat::detect(archive) else {
        warn!(archive = %archive.display(), "Unsupported archive format");
        return Ok(Vec::new());
    };

    if !archive.is_file() {
        return Err(ZenodoError::FileNotFound(archive.display().to_string()));
    }
    std::fs::create_dir_all(dest)?;

    let members = match format {
        ArchiveFormat::Zip => extract_zip(archive, dest)?,
        ArchiveFormat::TarGz => {
            let decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
            unpack_tar(decoder, dest)?
        }
        ArchiveFormat::Tar => unpack_tar(BufReader::new(File::open(archive)?), dest)?,
    };

    info!(
        archive = %archive.display(),
        dest = %dest.display(),
        members = members.len(),
        "Archive extracted"
    );
    Ok(members)
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<String>> {
    let mut zip = ZipArchive::new(BufReader::new(File::open(archive)?))?;

    // Central directory order
    let names: Vec<String> = zip.file_names().map(String::from).collect();

    // Entries escaping `dest` are rejected by the zip crate
    zip.extract(dest)?;
    Ok(names)
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> Result<Vec<String>> {
    let mut tar = tar::Archive::new(reader);
    let mut names = Vec::new();

    for entry in tar.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        // unpack_in refuses paths that would land outside `dest`
        if !entry.unpack_in(dest)? {
            warn!(member = %name, "Skipped archive member outside destination");
            continue;
        }
        names.push(name);
    }

    Ok(names)
}

/// First member whose name ends with `suffix`
pub fn find_model_file<'a>(members: &'a [String], suffix: &str) -> Option<&'a str> {
    members
        .iter()
        .map(String::as_str)
        .find(|name| name.ends_with(suffix))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    const MODEL_BYTES: &[u8] = b"fake torch weights";

    fn write_tar<W: Write>(writer: W) -> W {
        let mut builder = tar::Builder::new(writer);
        let mut header = tar::Header::new_gnu();
        header.set_size(MODEL_BYTES.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "model.pt", MODEL_BYTES)
            .unwrap();
        builder.into_inner().unwrap()
    }

    fn write_zip(path: &Path) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file("model.pt", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(MODEL_BYTES).unwrap();
        zip.finish().unwrap();
    }

    fn zip_members(path: &Path) -> BTreeSet<String> {
        let zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
        zip.file_names().map(String::from).collect()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(ArchiveFormat::detect(Path::new("a/ref.zip")), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::detect(Path::new("ref.tar.gz")), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect(Path::new("ref.tgz")), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect(Path::new("ref.tar")), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::detect(Path::new("ref.7z")), None);
    }

    #[test]
    fn test_zip_folder_preserves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("artifacts");
        std::fs::create_dir_all(folder.join("sub")).unwrap();
        std::fs::create_dir_all(folder.join("empty")).unwrap();
        std::fs::write(folder.join("a.txt"), "alpha").unwrap();
        std::fs::write(folder.join("sub").join("b.txt"), "beta").unwrap();

        let zip_path = zip_folder(&folder).unwrap();

        assert_eq!(zip_path, temp.path().join("artifacts.zip"));
        let expected: BTreeSet<String> = ["a.txt", "sub/b.txt"].iter().map(|s| s.to_string()).collect();
        assert_eq!(zip_members(&zip_path), expected);
    }

    #[test]
    fn test_zip_folder_replaces_extension() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("run.v2");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("best.pt"), MODEL_BYTES).unwrap();

        let zip_path = zip_folder(&folder).unwrap();
        assert_eq!(zip_path, temp.path().join("run.zip"));
    }

    #[test]
    fn test_zip_folder_rejects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("weights.pt");
        std::fs::write(&file, MODEL_BYTES).unwrap();

        let err = zip_folder(&file).unwrap_err();
        assert!(matches!(err, ZenodoError::NotADirectory(_)));
    }

    #[test]
    fn test_extract_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("ref_model.zip");
        write_zip(&archive);
        let dest = temp.path().join("out");

        let members = extract_archive(&archive, &dest).unwrap();

        assert!(members.contains(&"model.pt".to_string()));
        let found = find_model_file(&members, ".pt").unwrap();
        assert_eq!(std::fs::read(dest.join(found)).unwrap(), MODEL_BYTES);
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("ref_model.tar.gz");
        let encoder = write_tar(GzEncoder::new(File::create(&archive).unwrap(), Compression::default()));
        encoder.finish().unwrap();

        let members = extract_archive(&archive, temp.path()).unwrap();

        assert!(members.contains(&"model.pt".to_string()));
        let found = find_model_file(&members, ".pt").unwrap();
        assert!(temp.path().join(found).is_file());
    }

    #[test]
    fn test_extract_tgz_suffix() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("ref_model.tgz");
        let encoder = write_tar(GzEncoder::new(File::create(&archive).unwrap(), Compression::default()));
        encoder.finish().unwrap();

        let members = extract_archive(&archive, temp.path()).unwrap();
        assert_eq!(members, vec!["model.pt".to_string()]);
    }

    #[test]
    fn test_extract_tar() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("ref_model.tar");
        write_tar(File::create(&archive).unwrap());
        let dest = temp.path().join("out");

        let members = extract_archive(&archive, &dest).unwrap();

        assert!(members.contains(&"model.pt".to_string()));
        assert_eq!(std::fs::read(dest.join("model.pt")).unwrap(), MODEL_BYTES);
    }

    #[test]
    fn test_extract_unsupported_returns_empty() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("ref_model.7z");
        std::fs::write(&archive, b"7z\xbc\xaf\x27\x1c").unwrap();

        let members = extract_archive(&archive, temp.path()).unwrap();
        assert!(members.is_empty());
    }

    #[test]
    fn test_extract_corrupt_zip_is_error() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("ref_model.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract_archive(&archive, temp.path()).unwrap_err();
        assert!(matches!(err, ZenodoError::Zip(_)));
    }

    #[test]
    fn test_zip_folder_then_extract() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("ref_yolo");
        std::fs::create_dir_all(folder.join("weights")).unwrap();
        std::fs::write(folder.join("weights").join("best.pt"), MODEL_BYTES).unwrap();
        std::fs::write(folder.join("results.csv"), "epoch,map\n1,0.5\n").unwrap();

        let zip_path = zip_folder(&folder).unwrap();
        let dest = temp.path().join("unpacked");
        let members = extract_archive(&zip_path, &dest).unwrap();

        assert_eq!(find_model_file(&members, ".pt"), Some("weights/best.pt"));
        assert!(dest.join("weights/best.pt").is_file());
    }

    #[test]
    fn test_find_model_file_none() {
        let members = vec!["README.md".to_string(), "data.yaml".to_string()];
        assert_eq!(find_model_file(&members, ".pt"), None);
    }
}
