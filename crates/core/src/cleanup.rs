//! Post-organize tree normalization: strip hidden artifacts, relocate
//! leftovers to quarantine, and prune empty directories.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::collision::{self, Separator};
use crate::config::OrganizerConfig;
use crate::formats;
use crate::naming;

/// Normalizes directories after an organize pass. The input root itself is
/// never removed.
pub struct TreeCleaner {
    input_root: PathBuf,
    quarantine_dir: PathBuf,
}

/// Hidden files and editor lock artifacts; removed, never relocated.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("~$")
}

impl TreeCleaner {
    pub fn new(config: &OrganizerConfig) -> Self {
        Self {
            input_root: config.input_dir.clone(),
            quarantine_dir: config.quarantine_dir(),
        }
    }

    /// Clean a directory post-order and remove it when it ends up empty.
    /// Returns true when the directory was eliminated; a directory that
    /// retains supported media is clean but not eliminated.
    pub fn clean_directory(&self, dir: &Path) -> bool {
        if dir == self.input_root {
            return false;
        }

        let contents = match list_dir(dir) {
            Some(c) => c,
            None => return false,
        };
        if contents.is_empty() {
            return remove_empty(dir);
        }

        for entry in &contents {
            if entry.is_dir() {
                self.clean_directory(entry);
            }
        }

        // Subdirectory pruning may have emptied this one.
        let contents = match list_dir(dir) {
            Some(c) => c,
            None => return false,
        };
        if contents.is_empty() {
            return remove_empty(dir);
        }

        let mut has_remaining = false;
        for entry in contents {
            if !entry.is_file() {
                continue;
            }
            let name = entry
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            if is_hidden_name(&name) {
                match fs::remove_file(&entry) {
                    Ok(()) => debug!(path = %entry.display(), "removed hidden file"),
                    Err(e) => {
                        error!(path = %entry.display(), error = %e, "could not remove hidden file");
                        has_remaining = true;
                    }
                }
                continue;
            }

            let supported = formats::extension_of(&entry)
                .map(|ext| formats::is_supported(&ext))
                .unwrap_or(false);
            if supported {
                has_remaining = true;
            } else if !self.quarantine(&entry) {
                has_remaining = true;
            }
        }

        if let Some(contents) = list_dir(dir) {
            if contents.is_empty() {
                return remove_empty(dir);
            }
        }
        !has_remaining
    }

    /// Move a file to the flat quarantine directory under a normalized
    /// name. Duplicate checking is off here: quarantined files only get
    /// counter suffixes.
    pub fn quarantine(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let formatted = naming::quarantine_filename(name);

        let result = fs::create_dir_all(&self.quarantine_dir)
            .map_err(crate::error::Error::from)
            .and_then(|()| {
                collision::resolve(&self.quarantine_dir, &formatted, path, Separator::Dash, false)
            })
            .and_then(|plan| {
                let target = plan.target_path();
                move_file(path, &target)?;
                Ok(target)
            });

        match result {
            Ok(target) => {
                info!(from = %path.display(), to = %target.display(), "quarantined");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "quarantine move failed");
                false
            }
        }
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(source: &Path, target: &Path) -> std::io::Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    fs::copy(source, target)?;
    fs::remove_file(source)
}

fn list_dir(dir: &Path) -> Option<Vec<PathBuf>> {
    match fs::read_dir(dir) {
        Ok(entries) => Some(
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .collect(),
        ),
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "could not list directory");
            None
        }
    }
}

fn remove_empty(dir: &Path) -> bool {
    match fs::remove_dir(dir) {
        Ok(()) => {
            debug!(dir = %dir.display(), "removed empty directory");
            true
        }
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "could not remove directory");
            false
        }
    }
}
