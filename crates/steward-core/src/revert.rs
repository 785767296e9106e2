use crate::archive::ArchiveCodec;
use crate::error::Error;
use crate::index::FingerprintIndex;
use crate::journal::{self, ActionJournal};
use crate::storage::models::{ActionKind, ActionLogEntry, ActionStatus};
use crate::storage::{CatalogStore, JournalStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Undoes journaled actions.
///
/// Only `SUCCESS` and `REVERTED` entries can be reverted. A successful revert
/// leaves the entry `REVERTED`; any error leaves the status untouched. A
/// second call on a `REVERTED` entry re-runs the same branch against the
/// current filesystem.
pub struct RevertEngine<'s, J, C>
where
    J: JournalStore + ?Sized,
    C: CatalogStore + ?Sized,
{
    journal: ActionJournal<'s, J>,
    index: FingerprintIndex<'s, C>,
    codec: &'s dyn ArchiveCodec,
}

impl<'s, J, C> RevertEngine<'s, J, C>
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

    pub fn revert(&self, entry_id: i64) -> Result<(), Error> {
        let entry = self.journal.get(entry_id)?;
        if matches!(entry.status, ActionStatus::Pending | ActionStatus::Failure) {
            return Err(Error::Conflict(format!(
                "{} #{} is {} and never took effect",
                entry.kind, entry.id, entry.status
            )));
        }
        info!("Reverting {} #{} ({})", entry.kind, entry.id, entry.source_path);

        let result = match entry.kind {
            ActionKind::DeleteFile => self.revert_delete(&entry),
            ActionKind::MoveFiles => self.revert_move(&entry),
            ActionKind::ArchiveFiles => self.revert_archive(&entry),
            ActionKind::OpenFile => Err(Error::UnsupportedActionKind(entry.kind.to_string())),
        };
        if let Err(e) = result {
            error!("Revert of #{} failed: {}", entry.id, e);
            return Err(e);
        }

        self.journal.set_status(entry_id, ActionStatus::Reverted)
    }

    /// Write the captured bytes back over the original path and re-add the
    /// file to the catalog.
    fn revert_delete(&self, entry: &ActionLogEntry) -> Result<(), Error> {
        let bytes = journal::decode_backup(entry)?;
        let source = Path::new(&entry.source_path);
        if let Some(parent) = source.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(source, &bytes)?;
        self.index.fingerprint_path(source)?;
        debug!("Restored {} bytes to {}", bytes.len(), source.display());
        Ok(())
    }

    /// Copy the moved file back, remove it from the target and drop the
    /// target folder when that leaves it empty. Refuses to run unless the
    /// target exists and the source is absent.
    fn revert_move(&self, entry: &ActionLogEntry) -> Result<(), Error> {
        let target = required_target(entry)?;
        let source = Path::new(&entry.source_path);

        if !target.exists() {
            return Err(Error::Conflict(format!(
                "moved file no longer exists at {}",
                target.display()
            )));
        }
        if source.exists() {
            return Err(Error::Conflict(format!(
                "original location {} is occupied",
                source.display()
            )));
        }

        if let Some(parent) = source.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&target, source)?;
        fs::remove_file(&target)?;

        if let Some(record) = self.index.record_by_path(&target.to_string_lossy())? {
            self.index.relocate(record.id, source)?;
        }

        if let Some(parent) = target.parent() {
            if parent.is_dir() && fs::read_dir(parent)?.next().is_none() {
                fs::remove_dir(parent)?;
                debug!("Removed emptied folder {}", parent.display());
            }
        }
        Ok(())
    }

    /// Unpack the archive back into the original directory, delete the
    /// archive, unwrap a lone top-level folder and re-catalogue the files.
    fn revert_archive(&self, entry: &ActionLogEntry) -> Result<(), Error> {
        let archive_path = required_target(entry)?;
        let target_dir = Path::new(&entry.source_path);

        if !archive_path.exists() {
            return Err(Error::Conflict(format!(
                "archive not found at {}",
                archive_path.display()
            )));
        }

        fs::create_dir_all(target_dir)?;
        self.codec.extract_archive(&archive_path, target_dir)?;
        fs::remove_file(&archive_path)?;
        hoist_single_folder(target_dir)?;
        let restored = self.index.fingerprint_path(target_dir)?;
        debug!("Re-catalogued {} restored files", restored);
        Ok(())
    }
}

fn required_target(entry: &ActionLogEntry) -> Result<PathBuf, Error> {
    entry
        .target_path
        .as_ref()
        .map(PathBuf::from)
        .ok_or_else(|| {
            Error::InvalidEntry(format!("{} #{} has no target path", entry.kind, entry.id))
        })
}

/// When `dir` holds exactly one entry and it is a folder, move that folder's
/// contents up into `dir` and remove it.
fn hoist_single_folder(dir: &Path) -> Result<(), Error> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    if entries.len() != 1 || !entries[0].file_type()?.is_dir() {
        return Ok(());
    }

    let wrapper_name = entries[0].file_name();
    // Staged under a new name so a child sharing the wrapper's name can land.
    let staging = dir.join(format!(".{}.unwrap", wrapper_name.to_string_lossy()));
    fs::rename(entries[0].path(), &staging)?;

    for child in fs::read_dir(&staging)? {
        let child = child?;
        fs::rename(child.path(), dir.join(child.file_name()))?;
    }
    fs::remove_dir(&staging)?;

    debug!(
        "Unwrapped folder '{}' into {}",
        wrapper_name.to_string_lossy(),
        dir.display()
    );
    Ok(())
}
