use crate::error::Error;
use crate::hasher;
use crate::progress::ProgressReporter;
use crate::scanner;
use crate::storage::models::FileRecord;
use crate::storage::CatalogStore;
use chrono::{DateTime, Utc};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info};

/// Builds and maintains the file catalog.
pub struct FingerprintIndex<'s, S: CatalogStore + ?Sized> {
    store: &'s S,
    ignore_patterns: Vec<String>,
}

#[derive(Debug)]
pub struct ScanSummary {
    pub generation_id: i64,
    pub files_indexed: usize,
    pub total_bytes: u64,
    pub duration: Duration,
}

impl<'s, S: CatalogStore + ?Sized> FingerprintIndex<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            ignore_patterns: Vec::new(),
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns.to_vec();
        self
    }

    /// Replace the catalog with a fresh fingerprint of every visible file
    /// under `root`. This is not a merge: all prior records are dropped.
    pub fn scan(&self, root: &Path, reporter: &dyn ProgressReporter) -> Result<ScanSummary, Error> {
        if !root.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }
        let root = absolute(root)?;
        let root_display = root.to_string_lossy().into_owned();

        self.store.delete_all_records()?;
        let generation_id = self.store.begin_generation(&root_display)?;
        info!("Scanning {} (generation {})", root_display, generation_id);
        reporter.on_scan_start(&root_display);

        let start = Instant::now();
        let files = scanner::collect_files(&root, &self.ignore_patterns)?;

        let mut total_bytes = 0u64;
        for (i, path) in files.iter().enumerate() {
            let record = fingerprint(path, Some(generation_id))?;
            total_bytes += record.file_size as u64;
            self.store.save_record(&record)?;
            reporter.on_file_indexed(i + 1, &record.path);
        }

        let duration = start.elapsed();
        self.store
            .complete_generation(generation_id, files.len() as i64, total_bytes as i64)?;
        reporter.on_scan_complete(files.len(), duration.as_secs_f64());
        info!(
            "Indexed {} files ({} bytes) in {:.2}s",
            files.len(),
            total_bytes,
            duration.as_secs_f64()
        );

        Ok(ScanSummary {
            generation_id,
            files_indexed: files.len(),
            total_bytes,
            duration,
        })
    }

    /// Re-fingerprint a single path into the current generation. A directory
    /// is walked and every file under it is refreshed. Returns the number of
    /// records written.
    pub fn fingerprint_path(&self, path: &Path) -> Result<usize, Error> {
        let path = absolute(path)?;
        let generation_id = self.store.latest_generation()?.map(|g| g.id);

        let files = if path.is_dir() {
            scanner::collect_files(&path, &self.ignore_patterns)?
        } else {
            vec![path]
        };
        for file in &files {
            let record = fingerprint(file, generation_id)?;
            let id = self.store.save_record(&record)?;
            debug!("Refreshed record {} for {}", id, record.path);
        }
        Ok(files.len())
    }

    pub fn records(&self) -> Result<Vec<FileRecord>, Error> {
        self.store.find_all_records()
    }

    pub fn record(&self, id: i64) -> Result<FileRecord, Error> {
        self.store
            .find_record_by_id(id)?
            .ok_or(Error::FileNotFound(id))
    }

    pub fn record_by_path(&self, path: &str) -> Result<Option<FileRecord>, Error> {
        self.store.find_record_by_path(path)
    }

    pub fn records_by_ids(&self, ids: &[i64]) -> Result<Vec<FileRecord>, Error> {
        self.store.find_records_by_ids(ids)
    }

    /// Point an existing record at a new location after a move.
    pub fn relocate(&self, id: i64, new_path: &Path) -> Result<(), Error> {
        self.store
            .update_record_path(id, &new_path.to_string_lossy(), &display_name(new_path))
    }

    pub fn forget(&self, id: i64) -> Result<(), Error> {
        self.store.delete_record(id)
    }

    /// Drop every record whose path lies under `dir`. Returns how many went.
    pub fn forget_under(&self, dir: &Path) -> Result<usize, Error> {
        let stale: Vec<i64> = self
            .store
            .find_all_records()?
            .into_iter()
            .filter(|r| Path::new(&r.path).starts_with(dir))
            .map(|r| r.id)
            .collect();
        for id in &stale {
            self.store.delete_record(*id)?;
        }
        Ok(stale.len())
    }

    pub fn clear(&self) -> Result<(), Error> {
        self.store.delete_all_records()
    }

    /// Records ordered by size, largest first.
    pub fn largest(&self, limit: usize) -> Result<Vec<FileRecord>, Error> {
        let mut records = self.store.find_all_records()?;
        records.sort_by(|a, b| b.file_size.cmp(&a.file_size));
        records.truncate(limit);
        Ok(records)
    }
}

fn fingerprint(path: &Path, generation_id: Option<i64>) -> Result<FileRecord, Error> {
    let metadata = fs::metadata(path)?;
    let modified = metadata.modified()?;
    let created = metadata.created().unwrap_or(modified);

    Ok(FileRecord {
        id: 0,
        path: path.to_string_lossy().into_owned(),
        file_name: display_name(path),
        file_size: metadata.len() as i64,
        content_hash: hasher::content_digest(path)?,
        created_at: unix_seconds(created),
        last_modified: unix_seconds(modified),
        content: None,
        generation_id,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn unix_seconds(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}
