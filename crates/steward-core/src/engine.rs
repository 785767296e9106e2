use crate::analysis::{self, Normalizer, VersionClusterer};
use crate::archive::{ArchiveCodec, ZipCodec};
use crate::config::{self, AppConfig};
use crate::error::Error;
use crate::index::{FingerprintIndex, ScanSummary};
use crate::journal::ActionJournal;
use crate::platform::{self, FileOpener};
use crate::progress::ProgressReporter;
use crate::reorganize::DirectoryReorganizer;
use crate::revert::RevertEngine;
use crate::storage::models::{ActionLogEntry, FileRecord};
use crate::storage::{CatalogStore, Database, JournalStore};
use std::path::Path;
use tracing::{debug, info, warn};

/// The operation surface: scan, group, reorganize, journal and revert.
///
/// Operations are synchronous and meant to be called one at a time.
pub struct Steward<S: CatalogStore + JournalStore> {
    store: S,
    clusterer: VersionClusterer,
    ignore_patterns: Vec<String>,
    codec: Box<dyn ArchiveCodec>,
    opener: Option<Box<dyn FileOpener>>,
}

impl Steward<Database> {
    /// Open the SQLite store named in `config` and load marker tokens.
    pub fn open(config: &AppConfig) -> Result<Self, Error> {
        let db = Database::open(&config.db_path)?;
        let tokens = config::load_marker_tokens(Path::new(&config.marker_tokens_path));
        Ok(Steward::new(db, Normalizer::new(tokens)).with_ignore_patterns(&config.ignore_patterns))
    }
}

impl<S: CatalogStore + JournalStore> Steward<S> {
    pub fn new(store: S, normalizer: Normalizer) -> Self {
        let opener = match platform::system_opener() {
            Ok(opener) => Some(opener),
            Err(e) => {
                warn!("{}; opening files is disabled", e);
                None
            }
        };
        Self {
            store,
            clusterer: VersionClusterer::new(normalizer),
            ignore_patterns: Vec::new(),
            codec: Box::new(ZipCodec),
            opener,
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns.to_vec();
        self
    }

    pub fn with_opener(mut self, opener: Box<dyn FileOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn index(&self) -> FingerprintIndex<'_, S> {
        FingerprintIndex::new(&self.store).with_ignore_patterns(&self.ignore_patterns)
    }

    fn journal(&self) -> ActionJournal<'_, S> {
        ActionJournal::new(&self.store)
    }

    fn reorganizer(&self) -> DirectoryReorganizer<'_, S, S> {
        DirectoryReorganizer::new(self.journal(), self.index(), self.codec.as_ref())
    }

    // ── Catalog ──────────────────────────────────────────────────

    pub fn scan(&self, root: &Path, reporter: &dyn ProgressReporter) -> Result<ScanSummary, Error> {
        self.index().scan(root, reporter)
    }

    pub fn list_files(&self) -> Result<Vec<FileRecord>, Error> {
        self.index().records()
    }

    pub fn largest(&self, limit: usize) -> Result<Vec<FileRecord>, Error> {
        self.index().largest(limit)
    }

    pub fn clear_catalog(&self) -> Result<(), Error> {
        info!("Clearing catalog");
        self.index().clear()
    }

    // ── Grouping ─────────────────────────────────────────────────

    pub fn list_duplicates(&self) -> Result<Vec<Vec<FileRecord>>, Error> {
        let groups = analysis::find_duplicates(&self.index().records()?);
        debug!("{} duplicate groups", groups.len());
        Ok(groups)
    }

    pub fn list_versions(&self, threshold: usize) -> Result<Vec<Vec<FileRecord>>, Error> {
        let groups = self
            .clusterer
            .find_version_groups(&self.index().records()?, threshold);
        debug!("{} version groups at threshold {}", groups.len(), threshold);
        Ok(groups)
    }

    // ── Reorganizing ─────────────────────────────────────────────

    pub fn move_files(&self, ids: &[i64], target_dir: &Path) -> Result<Vec<i64>, Error> {
        self.reorganizer().move_files(ids, target_dir)
    }

    /// Each duplicate group goes to `<target_root>/duplicates<n>`.
    pub fn move_duplicate_groups(&self, target_root: &Path) -> Result<Vec<i64>, Error> {
        let groups = self.list_duplicates()?;
        self.reorganizer()
            .move_groups(&groups, target_root, "duplicates")
    }

    /// Each version group goes to `<target_root>/versions<n>`.
    pub fn move_version_groups(&self, threshold: usize, target_root: &Path) -> Result<Vec<i64>, Error> {
        let groups = self.list_versions(threshold)?;
        self.reorganizer().move_groups(&groups, target_root, "versions")
    }

    pub fn archive(&self, dir: &Path, archive_path: Option<&Path>) -> Result<i64, Error> {
        self.reorganizer().archive_directory(dir, archive_path)
    }

    pub fn delete_file(&self, id: i64) -> Result<i64, Error> {
        self.reorganizer().delete_file(id)
    }

    pub fn open_file(&self, path: &Path) -> Result<i64, Error> {
        self.reorganizer().open_file(path, self.opener.as_deref())
    }

    // ── Journal ──────────────────────────────────────────────────

    pub fn list_journal(&self) -> Result<Vec<ActionLogEntry>, Error> {
        self.journal().list_all()
    }

    pub fn journal_entry(&self, id: i64) -> Result<ActionLogEntry, Error> {
        self.journal().get(id)
    }

    pub fn revert(&self, entry_id: i64) -> Result<(), Error> {
        RevertEngine::new(self.journal(), self.index(), self.codec.as_ref()).revert(entry_id)
    }

    pub fn clear_journal(&self) -> Result<(), Error> {
        info!("Clearing journal");
        self.journal().clear_all()
    }
}
