//! Standalone dedup workflow: hash an entire tree up front, group by
//! digest, and hand groups of two or more to the retention selector.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::domain::{DuplicateGroup, FileRecord};
use crate::error::{Error, Result};
use crate::formats;
use crate::hasher;

/// Progress callback events for the dedup scan.
pub enum DedupProgress {
    /// Starting the hashing phase with total file count.
    Start { total: usize },
    /// A file was hashed (or skipped on error).
    Hashed { path: PathBuf },
    /// Scan completed.
    Complete { files: usize, groups: usize },
}

/// Finds groups of byte-identical files under a root directory.
pub struct DuplicateFinder {
    root: PathBuf,
}

impl DuplicateFinder {
    /// A missing root is the one fatal error: nothing has been touched
    /// yet, so abort.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::InputRootMissing(root));
        }
        Ok(Self { root })
    }

    /// Walk the tree, hash every file and group by content digest.
    /// Walk order is preserved within each group. Files that fail to hash
    /// are excluded from duplicate consideration entirely.
    pub fn find_duplicates(
        &self,
        progress: Option<&(dyn Fn(DedupProgress) + Sync)>,
    ) -> Result<Vec<DuplicateGroup>> {
        info!(root = %self.root.display(), "scanning for duplicates");

        // Snapshot the tree before touching anything: renames below must
        // not feed renamed files back into the walk.
        let paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();

        let mut records = Vec::new();
        for path in paths {
            let path = apply_extension_rename(&path);
            let metadata = match std::fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "stat failed, skipping");
                    continue;
                }
            };
            records.push(FileRecord {
                path,
                size: metadata.len(),
                mtime: mtime_of(&metadata),
                digest: None,
                resolved: None,
                camera: None,
            });
        }

        if let Some(cb) = progress {
            cb(DedupProgress::Start {
                total: records.len(),
            });
        }

        // Hashing is pure per file and parallelizes safely.
        let digests: Vec<Option<String>> = records
            .par_iter()
            .map(|record| {
                let digest = match hasher::hash_file(&record.path) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        warn!(path = %record.path.display(), error = %e, "hash failed, excluding");
                        None
                    }
                };
                if let Some(cb) = progress {
                    cb(DedupProgress::Hashed {
                        path: record.path.clone(),
                    });
                }
                digest
            })
            .collect();

        // Group in walk order.
        let total = records.len();
        let mut order: Vec<String> = Vec::new();
        let mut by_digest: HashMap<String, Vec<FileRecord>> = HashMap::new();
        for (mut record, digest) in records.into_iter().zip(digests) {
            let Some(digest) = digest else { continue };
            record.digest = Some(digest.clone());
            let members = by_digest.entry(digest.clone()).or_insert_with(|| {
                order.push(digest.clone());
                Vec::new()
            });
            members.push(record);
        }

        let groups: Vec<DuplicateGroup> = order
            .into_iter()
            .filter_map(|digest| {
                let members = by_digest.remove(&digest)?;
                (members.len() > 1).then_some(DuplicateGroup { digest, members })
            })
            .collect();

        if groups.is_empty() {
            info!(files = total, "no duplicate files found");
        } else {
            let total_members: usize = groups.iter().map(|g| g.members.len()).sum();
            info!(
                files = total,
                groups = groups.len(),
                members = total_members,
                "duplicate groups found"
            );
        }
        if let Some(cb) = progress {
            cb(DedupProgress::Complete {
                files: total,
                groups: groups.len(),
            });
        }

        Ok(groups)
    }
}

/// Apply the pure `.jpeg -> .jpg` rename rule to a walked file. The rename
/// happens before hashing so the walk never revisits the old name.
fn apply_extension_rename(path: &Path) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    let Some(new_name) = formats::normalize_extension(name) else {
        return path.to_path_buf();
    };

    let renamed = path.with_file_name(&new_name);
    if renamed.exists() {
        // Never clobber an existing .jpg; hashing will pair them up anyway.
        warn!(path = %path.display(), target = %renamed.display(), "rename target exists, keeping name");
        return path.to_path_buf();
    }
    match std::fs::rename(path, &renamed) {
        Ok(()) => {
            info!(from = %path.display(), to = %renamed.display(), "normalized extension");
            renamed
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "extension rename failed");
            path.to_path_buf()
        }
    }
}

fn mtime_of(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_root_is_fatal() {
        assert!(DuplicateFinder::new("/definitely/not/here").is_err());
    }

    #[test]
    fn test_groups_identical_content() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"same bytes").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"same bytes").unwrap();
        fs::write(tmp.path().join("c.jpg"), b"different").unwrap();

        let finder = DuplicateFinder::new(tmp.path()).unwrap();
        let groups = finder.find_duplicates(None).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 2);
        // Invariant: identical size and digest within a group.
        let first = &groups[0].members[0];
        assert!(groups[0]
            .members
            .iter()
            .all(|m| m.size == first.size && m.digest == first.digest));
    }

    #[test]
    fn test_no_duplicates_yields_empty() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"one").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"two!").unwrap();

        let finder = DuplicateFinder::new(tmp.path()).unwrap();
        assert!(finder.find_duplicates(None).unwrap().is_empty());
    }

    #[test]
    fn test_recursive_grouping() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("sub/deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("a.jpg"), b"same bytes").unwrap();
        fs::write(nested.join("b.jpg"), b"same bytes").unwrap();

        let finder = DuplicateFinder::new(tmp.path()).unwrap();
        let groups = finder.find_duplicates(None).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_jpeg_renamed_before_hashing() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("photo.jpeg"), b"same bytes").unwrap();
        fs::write(tmp.path().join("copy.jpg"), b"same bytes").unwrap();

        let finder = DuplicateFinder::new(tmp.path()).unwrap();
        let groups = finder.find_duplicates(None).unwrap();

        assert!(!tmp.path().join("photo.jpeg").exists());
        assert!(tmp.path().join("photo.jpg").exists());
        assert_eq!(groups.len(), 1);
        assert!(groups[0]
            .members
            .iter()
            .any(|m| m.path.file_name().unwrap() == "photo.jpg"));
    }

    #[test]
    fn test_progress_events_fire() {
        use std::sync::Mutex;

        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"y").unwrap();

        let hashed = Mutex::new(0usize);
        let finder = DuplicateFinder::new(tmp.path()).unwrap();
        finder
            .find_duplicates(Some(&|event| {
                if let DedupProgress::Hashed { .. } = event {
                    *hashed.lock().unwrap() += 1;
                }
            }))
            .unwrap();
        assert_eq!(*hashed.lock().unwrap(), 2);
    }
}
