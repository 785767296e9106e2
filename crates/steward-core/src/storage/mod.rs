pub mod memory;
pub mod models;
pub mod queries;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::Database;

use crate::error::Error;
use models::{ActionLogEntry, ActionStatus, FileRecord, ScanGeneration};

/// Persistence for the file catalog. Records come back in insertion order.
pub trait CatalogStore {
    /// Open a new scan generation for `root_path`, returning its id.
    fn begin_generation(&self, root_path: &str) -> Result<i64, Error>;
    fn complete_generation(
        &self,
        generation_id: i64,
        files_scanned: i64,
        total_bytes: i64,
    ) -> Result<(), Error>;
    fn latest_generation(&self) -> Result<Option<ScanGeneration>, Error>;

    /// Insert a record, or replace the existing record at the same path
    /// (keeping its id). Returns the record id.
    fn save_record(&self, record: &FileRecord) -> Result<i64, Error>;
    fn update_record_path(&self, id: i64, path: &str, file_name: &str) -> Result<(), Error>;
    fn find_all_records(&self) -> Result<Vec<FileRecord>, Error>;
    fn find_record_by_id(&self, id: i64) -> Result<Option<FileRecord>, Error>;
    fn find_record_by_path(&self, path: &str) -> Result<Option<FileRecord>, Error>;
    fn find_records_by_ids(&self, ids: &[i64]) -> Result<Vec<FileRecord>, Error>;
    fn delete_record(&self, id: i64) -> Result<(), Error>;
    fn delete_all_records(&self) -> Result<(), Error>;
}

/// Persistence for the action journal. Entries are never removed except by
/// `delete_all_entries`.
pub trait JournalStore {
    /// Append a new entry, returning its id. The entry's own `id` is ignored.
    fn save_entry(&self, entry: &ActionLogEntry) -> Result<i64, Error>;
    /// Returns `false` when no entry has that id.
    fn update_entry_status(&self, id: i64, status: ActionStatus) -> Result<bool, Error>;
    fn find_entry_by_id(&self, id: i64) -> Result<Option<ActionLogEntry>, Error>;
    fn find_all_entries(&self) -> Result<Vec<ActionLogEntry>, Error>;
    fn delete_all_entries(&self) -> Result<(), Error>;
}
