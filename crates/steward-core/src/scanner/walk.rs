use crate::platform;
use glob::Pattern;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, trace};
use walkdir::{DirEntry, WalkDir};

/// Walk `root` and return every regular file below it, in file-name order.
///
/// Hidden entries are skipped together with their subtrees, as is anything
/// matching one of `ignore_globs`. Any error reading the tree aborts the walk.
pub fn collect_files(root: &Path, ignore_globs: &[String]) -> io::Result<Vec<PathBuf>> {
    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !should_skip(entry, &ignore_patterns));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            trace!("Found {}", entry.path().display());
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn should_skip(entry: &DirEntry, ignore_patterns: &[Pattern]) -> bool {
    let hidden = entry
        .metadata()
        .map(|metadata| platform::is_hidden(entry.path(), &metadata))
        .unwrap_or(false);
    hidden
        || ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(entry.path()))
}
