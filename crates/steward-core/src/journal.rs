use crate::error::Error;
use crate::storage::models::{ActionKind, ActionLogEntry, ActionStatus};
use crate::storage::JournalStore;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::Path;
use tracing::{debug, warn};

/// What to record for one attempted action.
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub kind: ActionKind,
    pub source: &'a Path,
    pub target: Option<&'a Path>,
    pub archived: bool,
    /// Bytes of a file about to be deleted. Required for `DELETE_FILE`.
    pub backup: Option<&'a [u8]>,
}

impl<'a> NewEntry<'a> {
    pub fn new(kind: ActionKind, source: &'a Path) -> Self {
        Self {
            kind,
            source,
            target: None,
            archived: false,
            backup: None,
        }
    }

    pub fn target(mut self, target: &'a Path) -> Self {
        self.target = Some(target);
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn backup(mut self, bytes: &'a [u8]) -> Self {
        self.backup = Some(bytes);
        self
    }
}

/// Append-only log of filesystem actions. It never touches the filesystem:
/// callers snapshot whatever state they need before mutating it.
pub struct ActionJournal<'s, S: JournalStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: JournalStore + ?Sized> ActionJournal<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Record an attempted action with status `PENDING`.
    pub fn record(&self, entry: NewEntry<'_>) -> Result<i64, Error> {
        if entry.kind == ActionKind::DeleteFile && entry.backup.is_none() {
            return Err(Error::InvalidEntry(format!(
                "DELETE_FILE for {} has no backup payload",
                entry.source.display()
            )));
        }

        let log_entry = ActionLogEntry {
            id: 0,
            kind: entry.kind,
            source_path: entry.source.to_string_lossy().into_owned(),
            target_path: entry.target.map(|t| t.to_string_lossy().into_owned()),
            archived: entry.archived,
            backup_base64: entry.backup.map(|bytes| BASE64.encode(bytes)),
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: ActionStatus::Pending,
        };
        let id = self.store.save_entry(&log_entry)?;
        debug!("Journaled {} #{} for {}", log_entry.kind, id, log_entry.source_path);
        Ok(id)
    }

    /// Record an action whose outcome is already known.
    pub fn record_outcome(&self, entry: NewEntry<'_>, succeeded: bool) -> Result<i64, Error> {
        let id = self.record(entry)?;
        let status = if succeeded {
            ActionStatus::Success
        } else {
            ActionStatus::Failure
        };
        self.set_status(id, status)?;
        Ok(id)
    }

    /// Move an entry along `PENDING -> {SUCCESS, FAILURE}`, `SUCCESS -> REVERTED`.
    /// `REVERTED -> REVERTED` is also accepted so a revert can be re-run.
    pub fn set_status(&self, id: i64, status: ActionStatus) -> Result<(), Error> {
        let current = self.get(id)?.status;
        let rerun = current == ActionStatus::Reverted && status == ActionStatus::Reverted;
        if rerun {
            warn!("Journal entry {} is being reverted again", id);
        } else if !current.can_transition_to(status) {
            return Err(Error::InvalidEntry(format!(
                "entry {} cannot move from {} to {}",
                id, current, status
            )));
        }
        if !self.store.update_entry_status(id, status)? {
            return Err(Error::EntryNotFound(id));
        }
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<ActionLogEntry, Error> {
        self.store
            .find_entry_by_id(id)?
            .ok_or(Error::EntryNotFound(id))
    }

    pub fn list_all(&self) -> Result<Vec<ActionLogEntry>, Error> {
        self.store.find_all_entries()
    }

    pub fn clear_all(&self) -> Result<(), Error> {
        self.store.delete_all_entries()
    }
}

/// Decode the backup payload carried by a `DELETE_FILE` entry.
pub fn decode_backup(entry: &ActionLogEntry) -> Result<Vec<u8>, Error> {
    let encoded = entry.backup_base64.as_deref().ok_or_else(|| {
        Error::InvalidEntry(format!("entry {} carries no backup payload", entry.id))
    })?;
    Ok(BASE64.decode(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_record_starts_pending() {
        let store = MemoryStore::new();
        let journal = ActionJournal::new(&store);
        let id = journal
            .record(NewEntry::new(ActionKind::MoveFiles, Path::new("/a")).target(Path::new("/b")))
            .unwrap();

        let entry = journal.get(id).unwrap();
        assert_eq!(entry.status, ActionStatus::Pending);
        assert_eq!(entry.kind, ActionKind::MoveFiles);
        assert_eq!(entry.target_path.as_deref(), Some("/b"));
        assert!(!entry.archived);
    }

    #[test]
    fn test_delete_requires_backup() {
        let store = MemoryStore::new();
        let journal = ActionJournal::new(&store);
        let result = journal.record(NewEntry::new(ActionKind::DeleteFile, Path::new("/a")));
        assert!(matches!(result, Err(Error::InvalidEntry(_))));
        assert!(journal.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_backup_round_trips_through_base64() {
        let store = MemoryStore::new();
        let journal = ActionJournal::new(&store);
        let bytes = [0u8, 159, 146, 150, b'\n'];
        let id = journal
            .record(NewEntry::new(ActionKind::DeleteFile, Path::new("/a")).backup(&bytes))
            .unwrap();

        let entry = journal.get(id).unwrap();
        assert_eq!(decode_backup(&entry).unwrap(), bytes);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let store = MemoryStore::new();
        let journal = ActionJournal::new(&store);
        assert!(matches!(journal.get(42), Err(Error::EntryNotFound(42))));
        assert!(matches!(
            journal.set_status(42, ActionStatus::Success),
            Err(Error::EntryNotFound(42))
        ));
    }

    #[test]
    fn test_record_outcome_sets_final_status() {
        let store = MemoryStore::new();
        let journal = ActionJournal::new(&store);
        let ok = journal
            .record_outcome(NewEntry::new(ActionKind::OpenFile, Path::new("/a")), true)
            .unwrap();
        let failed = journal
            .record_outcome(NewEntry::new(ActionKind::OpenFile, Path::new("/b")), false)
            .unwrap();

        assert_eq!(journal.get(ok).unwrap().status, ActionStatus::Success);
        assert_eq!(journal.get(failed).unwrap().status, ActionStatus::Failure);
    }

    #[test]
    fn test_set_status_refuses_off_graph_transitions() {
        let store = MemoryStore::new();
        let journal = ActionJournal::new(&store);
        let failed = journal
            .record_outcome(NewEntry::new(ActionKind::OpenFile, Path::new("/a")), false)
            .unwrap();
        assert!(matches!(
            journal.set_status(failed, ActionStatus::Reverted),
            Err(Error::InvalidEntry(_))
        ));
        assert_eq!(journal.get(failed).unwrap().status, ActionStatus::Failure);

        let ok = journal
            .record_outcome(NewEntry::new(ActionKind::OpenFile, Path::new("/b")), true)
            .unwrap();
        journal.set_status(ok, ActionStatus::Reverted).unwrap();
        journal.set_status(ok, ActionStatus::Reverted).unwrap();
        assert!(matches!(
            journal.set_status(ok, ActionStatus::Success),
            Err(Error::InvalidEntry(_))
        ));
    }

    #[test]
    fn test_clear_all_removes_entries() {
        let store = MemoryStore::new();
        let journal = ActionJournal::new(&store);
        journal
            .record(NewEntry::new(ActionKind::OpenFile, Path::new("/a")))
            .unwrap();
        journal.clear_all().unwrap();
        assert!(journal.list_all().unwrap().is_empty());
    }
}
