use crate::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// ZIP-compatible archive reading and writing.
pub trait ArchiveCodec {
    /// Pack `source_dir` into `archive_path`, which must not exist yet.
    /// Entries live under a single top-level folder named after `source_dir`.
    fn create_archive(&self, source_dir: &Path, archive_path: &Path) -> Result<(), Error>;

    /// Unpack every entry of `archive_path` below `target_dir`, recreating
    /// subdirectories.
    fn extract_archive(&self, archive_path: &Path, target_dir: &Path) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl ArchiveCodec for ZipCodec {
    fn create_archive(&self, source_dir: &Path, archive_path: &Path) -> Result<(), Error> {
        let root_name = source_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::NotADirectory(source_dir.to_path_buf()))?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(archive_path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        add_to_zip(&mut zip, source_dir, &root_name, options)?;
        zip.finish()?;

        debug!("Archived {} into {}", source_dir.display(), archive_path.display());
        Ok(())
    }

    fn extract_archive(&self, archive_path: &Path, target_dir: &Path) -> Result<(), Error> {
        let mut archive = ZipArchive::new(File::open(archive_path)?)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let relative = match entry.enclosed_name() {
                Some(path) => path,
                None => {
                    warn!("Skipping archive entry with unsafe name '{}'", entry.name());
                    continue;
                }
            };
            let out_path = target_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
            } else {
                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&out_path)?;
                io::copy(&mut entry, &mut out)?;
            }
        }

        debug!("Extracted {} into {}", archive_path.display(), target_dir.display());
        Ok(())
    }
}

fn add_to_zip(
    zip: &mut ZipWriter<File>,
    path: &Path,
    entry_name: &str,
    options: SimpleFileOptions,
) -> Result<(), Error> {
    let metadata = fs::metadata(path)?;

    if metadata.is_dir() {
        zip.add_directory(format!("{}/", entry_name), options)?;

        let mut children: Vec<_> = fs::read_dir(path)?.collect::<io::Result<Vec<_>>>()?;
        children.sort_by_key(|child| child.file_name());
        for child in children {
            let child_name = format!("{}/{}", entry_name, child.file_name().to_string_lossy());
            add_to_zip(zip, &child.path(), &child_name, options)?;
        }
    } else {
        zip.start_file(entry_name, options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, zip)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_archive_wraps_entries_in_folder() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("photos");
        fs::create_dir_all(source.join("2024")).unwrap();
        fs::write(source.join("a.jpg"), b"aaa").unwrap();
        fs::write(source.join("2024").join("b.jpg"), b"bbb").unwrap();

        let archive_path = tmp.path().join("photos.zip");
        ZipCodec.create_archive(&source, &archive_path).unwrap();

        let archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"photos/"));
        assert!(names.contains(&"photos/a.jpg"));
        assert!(names.contains(&"photos/2024/"));
        assert!(names.contains(&"photos/2024/b.jpg"));
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("docs");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.txt"), b"a").unwrap();

        let archive_path = tmp.path().join("docs.zip");
        fs::write(&archive_path, b"keep").unwrap();

        let result = ZipCodec.create_archive(&source, &archive_path);
        assert!(matches!(result, Err(Error::Io(e)) if e.kind() == io::ErrorKind::AlreadyExists));
        assert_eq!(fs::read(&archive_path).unwrap(), b"keep");
    }

    #[test]
    fn test_extract_recreates_tree() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("docs");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("nested").join("deep.txt"), b"deep").unwrap();

        let archive_path = tmp.path().join("docs.zip");
        ZipCodec.create_archive(&source, &archive_path).unwrap();

        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        ZipCodec.extract_archive(&archive_path, &out).unwrap();

        let restored = fs::read(out.join("docs").join("nested").join("deep.txt")).unwrap();
        assert_eq!(restored, b"deep");
    }
}
