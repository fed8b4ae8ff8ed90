use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    /// Milliseconds since the Unix epoch
    pub created_at: Option<u64>,
    pub updated_at: Option<u64>,
}

impl DirectoryEntry {
    pub fn from_metadata(name: String, path: &Path, metadata: &std::fs::Metadata) -> Self {
        let kind = if metadata.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };

        DirectoryEntry {
            name,
            path: path.to_string_lossy().to_string(),
            kind,
            size: metadata.len(),
            created_at: metadata.created().ok().and_then(epoch_millis),
            updated_at: metadata.modified().ok().and_then(epoch_millis),
        }
    }
}

fn epoch_millis(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

/// Serializable view of an OS error, sent back as the envelope's `error` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub code: Option<i32>,
    pub message: String,
}

impl From<&std::io::Error> for ErrorDetail {
    fn from(err: &std::io::Error) -> Self {
        ErrorDetail {
            kind: format!("{:?}", err.kind()),
            code: err.raw_os_error(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one item in a copy/move/remove request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub success: bool,
    pub error: Option<ErrorDetail>,
    pub old_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
    pub filename: String,
}

impl ItemResult {
    pub fn settle(
        filename: String,
        old_path: &Path,
        new_path: Option<&Path>,
        outcome: std::io::Result<()>,
    ) -> Self {
        ItemResult {
            success: outcome.is_ok(),
            error: outcome.as_ref().err().map(ErrorDetail::from),
            old_path: old_path.to_string_lossy().to_string(),
            new_path: new_path.map(|p| p.to_string_lossy().to_string()),
            filename,
        }
    }
}
