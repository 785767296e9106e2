use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "steward")]
#[command(about = "Find duplicate and versioned files, reorganize them, and undo it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replace the catalog with a fresh scan of a directory
    Scan { root: PathBuf },
    /// List every catalogued file
    Files {
        #[arg(long)]
        json: bool,
    },
    /// List groups of files with identical content
    Duplicates {
        #[arg(long)]
        json: bool,
    },
    /// List groups of files whose names look like versions of each other
    Versions {
        /// Maximum edit distance between names (defaults to the configured value)
        #[arg(short, long)]
        threshold: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// List the largest catalogued files
    Largest {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Move catalogued files into a directory
    Move {
        #[arg(required = true)]
        ids: Vec<i64>,
        #[arg(short, long)]
        target: PathBuf,
    },
    /// Move each duplicate group into its own numbered folder
    GroupDuplicates { target: PathBuf },
    /// Move each version group into its own numbered folder
    GroupVersions {
        target: PathBuf,
        #[arg(short, long)]
        threshold: Option<usize>,
    },
    /// Zip a directory and remove the original
    Archive {
        dir: PathBuf,
        /// Archive file to write (defaults to <dir>.zip)
        #[arg(short, long)]
        archive: Option<PathBuf>,
    },
    /// Delete a catalogued file, keeping its bytes in the journal
    Delete { id: i64 },
    /// Open a file with the desktop's default application
    Open { path: PathBuf },
    /// Show the action journal
    Journal {
        #[arg(long)]
        json: bool,
    },
    /// Undo a journaled action
    Revert { id: i64 },
    /// Remove every record from the catalog
    ClearCatalog,
    /// Remove every entry from the journal
    ClearJournal,
    /// Print configuration values
    PrintConfig,
}
