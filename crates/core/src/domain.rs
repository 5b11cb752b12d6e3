use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A media file visited during a walk. Constructed per file, mutated as
/// resolution steps fill in the digest/date/provenance, and discarded once
/// the file is moved or deleted. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub mtime: i64,
    /// SHA-256 hex digest, computed lazily.
    pub digest: Option<String>,
    pub resolved: Option<ResolvedDate>,
    pub camera: Option<CameraInfo>,
}

/// Byte-identical files grouped by content digest, in walk order.
/// Every member has the same size and digest; groups of size 1 are never
/// actionable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub digest: String,
    pub members: Vec<FileRecord>,
}

/// Where a resolved timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateSource {
    Metadata,
    Filename,
}

impl DateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Filename => "filename",
        }
    }
}

impl std::fmt::Display for DateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A best-effort creation timestamp with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDate {
    pub timestamp: NaiveDateTime,
    pub source: DateSource,
}

/// Camera make/model as cleaned for filename use. Empty strings mean the
/// field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub make: String,
    pub model: String,
}

impl CameraInfo {
    pub fn is_empty(&self) -> bool {
        self.make.is_empty() && self.model.is_empty()
    }
}

/// Where a file should land. Produced once per file by the collision
/// resolver and consumed exactly once by the commit step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPlan {
    pub target_dir: PathBuf,
    pub filename: String,
    /// True when a byte-identical file already exists at
    /// `target_dir/filename`; the caller deletes the source instead of
    /// writing anything.
    pub duplicate: bool,
}

impl NamingPlan {
    pub fn target_path(&self) -> PathBuf {
        self.target_dir.join(&self.filename)
    }
}

/// Non-photo image classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Screenshot,
    NonCamera,
}

/// Rule for electing the single survivor of a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the member with the newest modification time.
    KeepNewest,
    /// Keep the member with the oldest modification time.
    KeepOldest,
    /// Keep the member whose name carries the most information: stems
    /// without a numbered suffix outrank stems with one, longer names win
    /// ties.
    LongestName,
}
