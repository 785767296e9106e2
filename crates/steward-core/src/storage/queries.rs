use super::models::*;
use super::sqlite::Database;
use super::{CatalogStore, JournalStore};
use crate::error::Error;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::debug;

const FILE_RECORD_COLUMNS: &str = "id, path, file_name, file_size, content_hash, \
     created_at, last_modified, content, generation_id";

const ACTION_LOG_COLUMNS: &str = "id, action_kind, source_path, target_path, archived, \
     backup_base64, timestamp, status";

fn file_record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        file_name: row.get(2)?,
        file_size: row.get(3)?,
        content_hash: row.get(4)?,
        created_at: row.get(5)?,
        last_modified: row.get(6)?,
        content: row.get(7)?,
        generation_id: row.get(8)?,
    })
}

/// Kind and status stay as text until after the row is read so that an
/// unknown kind surfaces as `UnsupportedActionKind` instead of a SQL error.
struct ActionLogRow {
    id: i64,
    kind: String,
    source_path: String,
    target_path: Option<String>,
    archived: bool,
    backup_base64: Option<String>,
    timestamp: String,
    status: String,
}

impl ActionLogRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ActionLogRow {
            id: row.get(0)?,
            kind: row.get(1)?,
            source_path: row.get(2)?,
            target_path: row.get(3)?,
            archived: row.get(4)?,
            backup_base64: row.get(5)?,
            timestamp: row.get(6)?,
            status: row.get(7)?,
        })
    }

    fn into_entry(self) -> Result<ActionLogEntry, Error> {
        Ok(ActionLogEntry {
            id: self.id,
            kind: self.kind.parse()?,
            source_path: self.source_path,
            target_path: self.target_path,
            archived: self.archived,
            backup_base64: self.backup_base64,
            timestamp: self.timestamp,
            status: self.status.parse()?,
        })
    }
}

impl CatalogStore for Database {
    // ── Scan Generations ─────────────────────────────────────────

    fn begin_generation(&self, root_path: &str) -> Result<i64, Error> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO scan_generation (root_path, started_at) VALUES (?1, ?2)",
            params![root_path, now],
        )?;
        let id = self.connection().last_insert_rowid();
        debug!("Started scan generation {} for {}", id, root_path);
        Ok(id)
    }

    fn complete_generation(
        &self,
        generation_id: i64,
        files_scanned: i64,
        total_bytes: i64,
    ) -> Result<(), Error> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "UPDATE scan_generation SET completed_at = ?1, files_scanned = ?2, \
             total_bytes = ?3 WHERE id = ?4",
            params![now, files_scanned, total_bytes, generation_id],
        )?;
        Ok(())
    }

    fn latest_generation(&self) -> Result<Option<ScanGeneration>, Error> {
        let generation = self
            .connection()
            .query_row(
                "SELECT id, root_path, started_at, completed_at, files_scanned, total_bytes \
                 FROM scan_generation ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(ScanGeneration {
                        id: row.get(0)?,
                        root_path: row.get(1)?,
                        started_at: row.get(2)?,
                        completed_at: row.get(3)?,
                        files_scanned: row.get(4)?,
                        total_bytes: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(generation)
    }

    // ── File Records ─────────────────────────────────────────────

    fn save_record(&self, record: &FileRecord) -> Result<i64, Error> {
        let id = self.connection().query_row(
            "INSERT INTO file_record \
             (path, file_name, file_size, content_hash, created_at, last_modified, \
              content, generation_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT(path) DO UPDATE SET \
                 file_name = excluded.file_name, \
                 file_size = excluded.file_size, \
                 content_hash = excluded.content_hash, \
                 created_at = excluded.created_at, \
                 last_modified = excluded.last_modified, \
                 content = excluded.content, \
                 generation_id = excluded.generation_id \
             RETURNING id",
            params![
                record.path,
                record.file_name,
                record.file_size,
                record.content_hash,
                record.created_at,
                record.last_modified,
                record.content,
                record.generation_id,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn update_record_path(&self, id: i64, path: &str, file_name: &str) -> Result<(), Error> {
        let updated = self.connection().execute(
            "UPDATE file_record SET path = ?1, file_name = ?2 WHERE id = ?3",
            params![path, file_name, id],
        )?;
        if updated == 0 {
            return Err(Error::FileNotFound(id));
        }
        Ok(())
    }

    fn find_all_records(&self) -> Result<Vec<FileRecord>, Error> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM file_record ORDER BY id",
            FILE_RECORD_COLUMNS
        ))?;
        let records = stmt
            .query_map([], file_record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn find_record_by_id(&self, id: i64) -> Result<Option<FileRecord>, Error> {
        let record = self
            .connection()
            .query_row(
                &format!("SELECT {} FROM file_record WHERE id = ?1", FILE_RECORD_COLUMNS),
                params![id],
                file_record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn find_record_by_path(&self, path: &str) -> Result<Option<FileRecord>, Error> {
        let record = self
            .connection()
            .query_row(
                &format!("SELECT {} FROM file_record WHERE path = ?1", FILE_RECORD_COLUMNS),
                params![path],
                file_record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn find_records_by_ids(&self, ids: &[i64]) -> Result<Vec<FileRecord>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM file_record WHERE id IN ({}) ORDER BY id",
            FILE_RECORD_COLUMNS, placeholders
        ))?;
        let records = stmt
            .query_map(params_from_iter(ids.iter()), file_record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn delete_record(&self, id: i64) -> Result<(), Error> {
        self.connection()
            .execute("DELETE FROM file_record WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn delete_all_records(&self) -> Result<(), Error> {
        let removed = self.connection().execute("DELETE FROM file_record", [])?;
        debug!("Cleared {} catalog records", removed);
        Ok(())
    }
}

impl JournalStore for Database {
    fn save_entry(&self, entry: &ActionLogEntry) -> Result<i64, Error> {
        self.connection().execute(
            "INSERT INTO action_log \
             (action_kind, source_path, target_path, archived, backup_base64, timestamp, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.kind.as_str(),
                entry.source_path,
                entry.target_path,
                entry.archived,
                entry.backup_base64,
                entry.timestamp,
                entry.status.as_str(),
            ],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    fn update_entry_status(&self, id: i64, status: ActionStatus) -> Result<bool, Error> {
        let updated = self.connection().execute(
            "UPDATE action_log SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(updated > 0)
    }

    fn find_entry_by_id(&self, id: i64) -> Result<Option<ActionLogEntry>, Error> {
        let row = self
            .connection()
            .query_row(
                &format!("SELECT {} FROM action_log WHERE id = ?1", ACTION_LOG_COLUMNS),
                params![id],
                ActionLogRow::from_row,
            )
            .optional()?;
        row.map(ActionLogRow::into_entry).transpose()
    }

    fn find_all_entries(&self) -> Result<Vec<ActionLogEntry>, Error> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM action_log ORDER BY id",
            ACTION_LOG_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], ActionLogRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ActionLogRow::into_entry).collect()
    }

    fn delete_all_entries(&self) -> Result<(), Error> {
        let removed = self.connection().execute("DELETE FROM action_log", [])?;
        debug!("Cleared {} journal entries", removed);
        Ok(())
    }
}
