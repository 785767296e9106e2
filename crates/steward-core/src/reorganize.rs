use crate::archive::ArchiveCodec;
use crate::error::Error;
use crate::index::{self, FingerprintIndex};
use crate::journal::{ActionJournal, NewEntry};
use crate::platform::FileOpener;
use crate::storage::models::{ActionKind, ActionStatus, FileRecord};
use crate::storage::{CatalogStore, JournalStore};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Applies grouping results to the filesystem. Every destructive action goes
/// through the journal first and ends as `SUCCESS` or `FAILURE`.
pub struct DirectoryReorganizer<'s, J, C>
where
    J: JournalStore + ?Sized,
    C: CatalogStore + ?Sized,
{
    journal: ActionJournal<'s, J>,
    index: FingerprintIndex<'s, C>,
    codec: &'s dyn ArchiveCodec,
}

impl<'s, J, C> DirectoryReorganizer<'s, J, C>
where
    J: JournalStore + ?Sized,
    C: CatalogStore + ?Sized,
{
    pub fn new(
        journal: ActionJournal<'s, J>,
        index: FingerprintIndex<'s, C>,
        codec: &'s dyn ArchiveCodec,
    ) -> Self {
        Self {
            journal,
            index,
            codec,
        }
    }

    /// Move the catalogued files with the given ids into `target_dir`.
    /// Returns the journal entry ids, one per file.
    pub fn move_files(&self, ids: &[i64], target_dir: &Path) -> Result<Vec<i64>, Error> {
        let records = self.index.records_by_ids(ids)?;
        if records.is_empty() {
            return Err(Error::NoFilesSelected);
        }
        self.move_records(&records, target_dir)
    }

    /// Move each group into its own `<target_root>/<prefix><n>` folder,
    /// numbered from 1.
    pub fn move_groups(
        &self,
        groups: &[Vec<FileRecord>],
        target_root: &Path,
        prefix: &str,
    ) -> Result<Vec<i64>, Error> {
        let mut entry_ids = Vec::new();
        for (i, group) in groups.iter().enumerate() {
            let group_dir = target_root.join(format!("{}{}", prefix, i + 1));
            entry_ids.extend(self.move_records(group, &group_dir)?);
        }
        Ok(entry_ids)
    }

    /// Stops at the first file that cannot be moved; earlier moves stay done
    /// and journaled.
    pub fn move_records(&self, records: &[FileRecord], target_dir: &Path) -> Result<Vec<i64>, Error> {
        let target_dir = index::absolute(target_dir)?;
        fs::create_dir_all(&target_dir)?;

        let mut entry_ids = Vec::with_capacity(records.len());
        for record in records {
            let source = PathBuf::from(&record.path);
            let destination = target_dir.join(&record.file_name);
            let entry_id = self.journal.record(
                NewEntry::new(ActionKind::MoveFiles, &source).target(&destination),
            )?;

            let moved = if destination.exists() {
                Err(Error::Conflict(format!(
                    "{} already exists",
                    destination.display()
                )))
            } else {
                fs::rename(&source, &destination).map_err(Error::from)
            };

            if let Err(e) = moved {
                error!("Failed to move {}: {}", source.display(), e);
                self.journal.set_status(entry_id, ActionStatus::Failure)?;
                return Err(e);
            }

            self.journal.set_status(entry_id, ActionStatus::Success)?;
            self.index.relocate(record.id, &destination)?;
            entry_ids.push(entry_id);
        }

        info!("Moved {} files into {}", entry_ids.len(), target_dir.display());
        Ok(entry_ids)
    }

    /// Zip `dir` and delete the original. The archive defaults to
    /// `<dir>.zip` beside the directory and is never written over an
    /// existing file. Catalog records under `dir` are dropped.
    pub fn archive_directory(&self, dir: &Path, archive_path: Option<&Path>) -> Result<i64, Error> {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }
        let dir = index::absolute(dir)?;
        let archive_path = match archive_path {
            Some(path) => index::absolute(path)?,
            None => default_archive_path(&dir)?,
        };
        if archive_path.starts_with(&dir) {
            return Err(Error::Conflict(format!(
                "archive {} would be written inside {}",
                archive_path.display(),
                dir.display()
            )));
        }
        if archive_path.exists() {
            return Err(Error::Conflict(format!(
                "{} already exists",
                archive_path.display()
            )));
        }

        let entry_id = self.journal.record(
            NewEntry::new(ActionKind::ArchiveFiles, &dir)
                .target(&archive_path)
                .archived(true),
        )?;

        let archived = self
            .codec
            .create_archive(&dir, &archive_path)
            .and_then(|_| fs::remove_dir_all(&dir).map_err(Error::from));
        if let Err(e) = archived {
            error!("Failed to archive {}: {}", dir.display(), e);
            self.journal.set_status(entry_id, ActionStatus::Failure)?;
            return Err(e);
        }

        self.journal.set_status(entry_id, ActionStatus::Success)?;
        let forgotten = self.index.forget_under(&dir)?;
        info!(
            "Archived {} to {} ({} catalog records dropped)",
            dir.display(),
            archive_path.display(),
            forgotten
        );
        Ok(entry_id)
    }

    /// Delete a catalogued file after capturing its bytes in the journal.
    pub fn delete_file(&self, id: i64) -> Result<i64, Error> {
        let record = self.index.record(id)?;
        let path = PathBuf::from(&record.path);
        let bytes = fs::read(&path)?;

        let entry_id = self
            .journal
            .record(NewEntry::new(ActionKind::DeleteFile, &path).backup(&bytes))?;

        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                error!("Failed to delete {}: {}", path.display(), e);
                self.journal.set_status(entry_id, ActionStatus::Failure)?;
                return Err(e.into());
            }
        }

        self.journal.set_status(entry_id, ActionStatus::Success)?;
        self.index.forget(id)?;
        info!("Deleted {} ({} bytes kept in journal)", path.display(), bytes.len());
        Ok(entry_id)
    }

    /// Hand `path` to the desktop's default application and journal the
    /// outcome. Nothing to revert, so the entry only serves as audit.
    pub fn open_file(&self, path: &Path, opener: Option<&dyn FileOpener>) -> Result<i64, Error> {
        if path.as_os_str().is_empty() || !path.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("File does not exist: {}", path.display()),
            )));
        }
        let path = index::absolute(path)?;

        let opened = match opener {
            Some(opener) => opener.open_with_default_application(&path),
            None => Err(Error::UnsupportedPlatform(std::env::consts::OS.to_string())),
        };
        let entry_id = self
            .journal
            .record_outcome(NewEntry::new(ActionKind::OpenFile, &path), opened.is_ok())?;
        opened?;
        Ok(entry_id)
    }
}

fn default_archive_path(dir: &Path) -> Result<PathBuf, Error> {
    let name = dir
        .file_name()
        .ok_or_else(|| Error::NotADirectory(dir.to_path_buf()))?;
    let parent = dir.parent().unwrap_or(dir);
    Ok(parent.join(format!("{}.zip", name.to_string_lossy())))
}
