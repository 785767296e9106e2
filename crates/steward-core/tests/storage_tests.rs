use steward_core::storage::models::*;
use steward_core::storage::{CatalogStore, Database, JournalStore, MemoryStore};

fn make_test_record(path: &str, size: i64, hash: &str, generation_id: i64) -> FileRecord {
    FileRecord {
        id: 0,
        path: path.to_string(),
        file_name: path.rsplit('/').next().unwrap_or(path).to_string(),
        file_size: size,
        content_hash: hash.to_string(),
        created_at: 1700000000,
        last_modified: 1700000000,
        content: None,
        generation_id: Some(generation_id),
    }
}

fn make_test_entry(kind: ActionKind, source: &str) -> ActionLogEntry {
    ActionLogEntry {
        id: 0,
        kind,
        source_path: source.to_string(),
        target_path: None,
        archived: false,
        backup_base64: None,
        timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        status: ActionStatus::Pending,
    }
}

fn check_catalog_round_trip<S: CatalogStore>(store: &S) {
    let generation = store.begin_generation("/root").unwrap();
    let a = store
        .save_record(&make_test_record("/root/a.txt", 100, "h1", generation))
        .unwrap();
    let b = store
        .save_record(&make_test_record("/root/b.txt", 300, "h2", generation))
        .unwrap();
    assert_ne!(a, b);

    let all = store.find_all_records().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].path, "/root/a.txt");
    assert_eq!(all[1].path, "/root/b.txt");

    let by_path = store.find_record_by_path("/root/b.txt").unwrap().unwrap();
    assert_eq!(by_path.id, b);
    assert_eq!(by_path.content_hash, "h2");
    assert!(store.find_record_by_path("/root/missing").unwrap().is_none());

    let by_ids = store.find_records_by_ids(&[b, 9999]).unwrap();
    assert_eq!(by_ids.len(), 1);
    assert_eq!(by_ids[0].id, b);
    assert!(store.find_records_by_ids(&[]).unwrap().is_empty());

    store.complete_generation(generation, 2, 400).unwrap();
    let latest = store.latest_generation().unwrap().unwrap();
    assert_eq!(latest.id, generation);
    assert_eq!(latest.files_scanned, 2);
    assert_eq!(latest.total_bytes, 400);
    assert!(latest.completed_at.is_some());
}

fn check_save_record_upserts_by_path<S: CatalogStore>(store: &S) {
    let generation = store.begin_generation("/root").unwrap();
    let id = store
        .save_record(&make_test_record("/root/a.txt", 100, "old", generation))
        .unwrap();
    let again = store
        .save_record(&make_test_record("/root/a.txt", 120, "new", generation))
        .unwrap();
    assert_eq!(id, again);

    let all = store.find_all_records().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].content_hash, "new");
    assert_eq!(all[0].file_size, 120);
}

fn check_relocate_and_delete<S: CatalogStore>(store: &S) {
    let generation = store.begin_generation("/root").unwrap();
    let id = store
        .save_record(&make_test_record("/root/a.txt", 100, "h", generation))
        .unwrap();

    store
        .update_record_path(id, "/elsewhere/a2.txt", "a2.txt")
        .unwrap();
    let moved = store.find_record_by_id(id).unwrap().unwrap();
    assert_eq!(moved.path, "/elsewhere/a2.txt");
    assert_eq!(moved.file_name, "a2.txt");

    store.delete_record(id).unwrap();
    assert!(store.find_record_by_id(id).unwrap().is_none());

    store
        .save_record(&make_test_record("/root/b.txt", 1, "h", generation))
        .unwrap();
    store.delete_all_records().unwrap();
    assert!(store.find_all_records().unwrap().is_empty());
}

fn check_journal_round_trip<S: JournalStore>(store: &S) {
    let mut delete = make_test_entry(ActionKind::DeleteFile, "/root/a.txt");
    delete.backup_base64 = Some("Ynl0ZXM=".to_string());
    let delete_id = store.save_entry(&delete).unwrap();

    let mut archive = make_test_entry(ActionKind::ArchiveFiles, "/root/dir");
    archive.target_path = Some("/root/dir.zip".to_string());
    archive.archived = true;
    let archive_id = store.save_entry(&archive).unwrap();

    let fetched = store.find_entry_by_id(delete_id).unwrap().unwrap();
    assert_eq!(fetched.kind, ActionKind::DeleteFile);
    assert_eq!(fetched.backup_base64.as_deref(), Some("Ynl0ZXM="));
    assert_eq!(fetched.status, ActionStatus::Pending);

    assert!(store
        .update_entry_status(archive_id, ActionStatus::Success)
        .unwrap());
    assert!(!store.update_entry_status(9999, ActionStatus::Success).unwrap());

    let all = store.find_all_entries().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].status, ActionStatus::Success);
    assert!(all[1].archived);
    assert_eq!(all[1].target_path.as_deref(), Some("/root/dir.zip"));

    assert!(store.find_entry_by_id(9999).unwrap().is_none());

    store.delete_all_entries().unwrap();
    assert!(store.find_all_entries().unwrap().is_empty());
}

#[test]
fn test_sqlite_catalog_round_trip() {
    check_catalog_round_trip(&Database::open_in_memory().unwrap());
}

#[test]
fn test_memory_catalog_round_trip() {
    check_catalog_round_trip(&MemoryStore::new());
}

#[test]
fn test_sqlite_save_record_upserts_by_path() {
    check_save_record_upserts_by_path(&Database::open_in_memory().unwrap());
}

#[test]
fn test_memory_save_record_upserts_by_path() {
    check_save_record_upserts_by_path(&MemoryStore::new());
}

#[test]
fn test_sqlite_relocate_and_delete() {
    check_relocate_and_delete(&Database::open_in_memory().unwrap());
}

#[test]
fn test_memory_relocate_and_delete() {
    check_relocate_and_delete(&MemoryStore::new());
}

#[test]
fn test_sqlite_journal_round_trip() {
    check_journal_round_trip(&Database::open_in_memory().unwrap());
}

#[test]
fn test_memory_journal_round_trip() {
    check_journal_round_trip(&MemoryStore::new());
}

#[test]
fn test_sqlite_unknown_action_kind_is_reported() {
    let db = Database::open_in_memory().unwrap();
    db.connection()
        .execute(
            "INSERT INTO action_log (action_kind, source_path, timestamp, status) \
             VALUES ('RENAME_FILE', '/x', '2024-01-01T00:00:00+00:00', 'SUCCESS')",
            [],
        )
        .unwrap();
    let id = db.connection().last_insert_rowid();

    let result = db.find_entry_by_id(id);
    assert!(matches!(
        result,
        Err(steward_core::Error::UnsupportedActionKind(kind)) if kind == "RENAME_FILE"
    ));
}

#[test]
fn test_sqlite_journal_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("steward.db");
    let db_path = db_path.to_str().unwrap();

    {
        let db = Database::open(db_path).unwrap();
        db.save_entry(&make_test_entry(ActionKind::OpenFile, "/root/a.txt"))
            .unwrap();
    }

    let db = Database::open(db_path).unwrap();
    assert_eq!(db.find_all_entries().unwrap().len(), 1);
}
