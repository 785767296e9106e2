use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One scan of a root directory. Each scan replaces the catalog and opens a
/// new generation.
#[derive(Debug, Clone, Serialize)]
pub struct ScanGeneration {
    pub id: i64,
    pub root_path: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub files_scanned: i64,
    pub total_bytes: i64,
}

/// A fingerprinted file in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub file_name: String,
    pub file_size: i64,
    pub content_hash: String,
    pub created_at: i64,
    pub last_modified: i64,
    pub content: Option<String>,
    pub generation_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    OpenFile,
    DeleteFile,
    MoveFiles,
    ArchiveFiles,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::OpenFile => "OPEN_FILE",
            ActionKind::DeleteFile => "DELETE_FILE",
            ActionKind::MoveFiles => "MOVE_FILES",
            ActionKind::ArchiveFiles => "ARCHIVE_FILES",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN_FILE" => Ok(ActionKind::OpenFile),
            "DELETE_FILE" => Ok(ActionKind::DeleteFile),
            "MOVE_FILES" => Ok(ActionKind::MoveFiles),
            "ARCHIVE_FILES" => Ok(ActionKind::ArchiveFiles),
            other => Err(Error::UnsupportedActionKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Pending,
    Success,
    Failure,
    Reverted,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "PENDING",
            ActionStatus::Success => "SUCCESS",
            ActionStatus::Failure => "FAILURE",
            ActionStatus::Reverted => "REVERTED",
        }
    }

    /// `PENDING -> {SUCCESS, FAILURE}`, `SUCCESS -> REVERTED`.
    pub fn can_transition_to(&self, next: ActionStatus) -> bool {
        matches!(
            (self, next),
            (ActionStatus::Pending, ActionStatus::Success)
                | (ActionStatus::Pending, ActionStatus::Failure)
                | (ActionStatus::Success, ActionStatus::Reverted)
        )
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ActionStatus::Pending),
            "SUCCESS" => Ok(ActionStatus::Success),
            "FAILURE" => Ok(ActionStatus::Failure),
            "REVERTED" => Ok(ActionStatus::Reverted),
            other => Err(Error::InvalidEntry(format!("unknown status '{}'", other))),
        }
    }
}

/// An audit record of one filesystem action.
///
/// `backup_base64` holds the pre-delete bytes of a `DELETE_FILE` entry and is
/// never rewritten once stored.
#[derive(Debug, Clone, Serialize)]
pub struct ActionLogEntry {
    pub id: i64,
    pub kind: ActionKind,
    pub source_path: String,
    pub target_path: Option<String>,
    pub archived: bool,
    pub backup_base64: Option<String>,
    pub timestamp: String,
    pub status: ActionStatus,
}
