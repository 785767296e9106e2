use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("File not found in catalog: {0}")]
    FileNotFound(i64),

    #[error("Journal entry not found: {0}")]
    EntryNotFound(i64),

    #[error("No files found with the provided ids")]
    NoFilesSelected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Revert conflict: {0}")]
    Conflict(String),

    #[error("Unsupported action kind: {0}")]
    UnsupportedActionKind(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid journal entry: {0}")]
    InvalidEntry(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Backup payload error: {0}")]
    Payload(#[from] base64::DecodeError),
}
