//! Retention-policy ranking and duplicate-group deletion for the
//! standalone dedup workflow.

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::{error, info};

use crate::domain::{DuplicateGroup, FileRecord, RetentionPolicy};

/// True when a stem ends in an underscore-numbered suffix like `_003`.
pub fn has_numbered_suffix(stem: &str) -> bool {
    let pattern = Regex::new(r"_\d+$").expect("suffix pattern");
    pattern.is_match(stem)
}

/// Name-richness score: files without a numbered suffix always outrank
/// files with one; longer full names win ties.
pub fn filename_score(path: &Path) -> (u8, usize) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let name_len = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::len)
        .unwrap_or(0);
    let unnumbered = if has_numbered_suffix(stem) { 0 } else { 1 };
    (unnumbered, name_len)
}

/// Order a group's members survivor-first according to the policy.
pub fn rank_group(members: &[FileRecord], policy: RetentionPolicy) -> Vec<FileRecord> {
    let mut ranked = members.to_vec();
    match policy {
        RetentionPolicy::LongestName => {
            ranked.sort_by(|a, b| filename_score(&b.path).cmp(&filename_score(&a.path)));
        }
        RetentionPolicy::KeepNewest => {
            ranked.sort_by(|a, b| b.mtime.cmp(&a.mtime));
        }
        RetentionPolicy::KeepOldest => {
            ranked.sort_by(|a, b| a.mtime.cmp(&b.mtime));
        }
    }
    ranked
}

/// Outcome of a removal pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemovalSummary {
    pub kept: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Apply the policy to every group: the top-ranked member is kept, all
/// others are deleted. Per-file deletion failures are logged and do not
/// abort the remaining groups.
pub fn remove_duplicates(groups: &[DuplicateGroup], policy: RetentionPolicy) -> RemovalSummary {
    let mut summary = RemovalSummary::default();

    for group in groups {
        let ranked = rank_group(&group.members, policy);
        let Some((survivor, losers)) = ranked.split_first() else {
            continue;
        };

        info!(path = %survivor.path.display(), "keeping");
        summary.kept += 1;

        for loser in losers {
            match fs::remove_file(&loser.path) {
                Ok(()) => {
                    info!(path = %loser.path.display(), "removed duplicate");
                    summary.removed += 1;
                }
                Err(e) => {
                    error!(path = %loser.path.display(), error = %e, "failed to remove duplicate");
                    summary.failed += 1;
                }
            }
        }
    }

    summary
}
