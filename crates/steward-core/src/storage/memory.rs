use super::models::*;
use super::{CatalogStore, JournalStore};
use crate::error::Error;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    generations: Vec<ScanGeneration>,
    records: Vec<FileRecord>,
    entries: Vec<ActionLogEntry>,
    next_generation_id: i64,
    next_record_id: i64,
    next_entry_id: i64,
}

/// In-process catalog and journal. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CatalogStore for MemoryStore {
    fn begin_generation(&self, root_path: &str) -> Result<i64, Error> {
        let mut state = self.state();
        state.next_generation_id += 1;
        let id = state.next_generation_id;
        state.generations.push(ScanGeneration {
            id,
            root_path: root_path.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            completed_at: None,
            files_scanned: 0,
            total_bytes: 0,
        });
        Ok(id)
    }

    fn complete_generation(
        &self,
        generation_id: i64,
        files_scanned: i64,
        total_bytes: i64,
    ) -> Result<(), Error> {
        let mut state = self.state();
        if let Some(generation) = state
            .generations
            .iter_mut()
            .find(|generation| generation.id == generation_id)
        {
            generation.completed_at = Some(chrono::Utc::now().to_rfc3339());
            generation.files_scanned = files_scanned;
            generation.total_bytes = total_bytes;
        }
        Ok(())
    }

    fn latest_generation(&self) -> Result<Option<ScanGeneration>, Error> {
        Ok(self.state().generations.last().cloned())
    }

    fn save_record(&self, record: &FileRecord) -> Result<i64, Error> {
        let mut state = self.state();
        if let Some(existing) = state.records.iter_mut().find(|r| r.path == record.path) {
            let id = existing.id;
            *existing = FileRecord {
                id,
                ..record.clone()
            };
            return Ok(id);
        }
        state.next_record_id += 1;
        let id = state.next_record_id;
        state.records.push(FileRecord {
            id,
            ..record.clone()
        });
        Ok(id)
    }

    fn update_record_path(&self, id: i64, path: &str, file_name: &str) -> Result<(), Error> {
        let mut state = self.state();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::FileNotFound(id))?;
        record.path = path.to_string();
        record.file_name = file_name.to_string();
        Ok(())
    }

    fn find_all_records(&self) -> Result<Vec<FileRecord>, Error> {
        Ok(self.state().records.clone())
    }

    fn find_record_by_id(&self, id: i64) -> Result<Option<FileRecord>, Error> {
        Ok(self.state().records.iter().find(|r| r.id == id).cloned())
    }

    fn find_record_by_path(&self, path: &str) -> Result<Option<FileRecord>, Error> {
        Ok(self.state().records.iter().find(|r| r.path == path).cloned())
    }

    fn find_records_by_ids(&self, ids: &[i64]) -> Result<Vec<FileRecord>, Error> {
        Ok(self
            .state()
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    fn delete_record(&self, id: i64) -> Result<(), Error> {
        self.state().records.retain(|r| r.id != id);
        Ok(())
    }

    fn delete_all_records(&self) -> Result<(), Error> {
        self.state().records.clear();
        Ok(())
    }
}

impl JournalStore for MemoryStore {
    fn save_entry(&self, entry: &ActionLogEntry) -> Result<i64, Error> {
        let mut state = self.state();
        state.next_entry_id += 1;
        let id = state.next_entry_id;
        state.entries.push(ActionLogEntry {
            id,
            ..entry.clone()
        });
        Ok(id)
    }

    fn update_entry_status(&self, id: i64, status: ActionStatus) -> Result<bool, Error> {
        let mut state = self.state();
        match state.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn find_entry_by_id(&self, id: i64) -> Result<Option<ActionLogEntry>, Error> {
        Ok(self.state().entries.iter().find(|e| e.id == id).cloned())
    }

    fn find_all_entries(&self) -> Result<Vec<ActionLogEntry>, Error> {
        Ok(self.state().entries.clone())
    }

    fn delete_all_entries(&self) -> Result<(), Error> {
        self.state().entries.clear();
        Ok(())
    }
}
