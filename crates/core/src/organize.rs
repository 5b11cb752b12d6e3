//! The organizer workflow: classify, date, name, and move every supported
//! file out of the input tree into the canonical output layout.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::camera;
use crate::classify;
use crate::cleanup::{self, TreeCleaner};
use crate::collision::{self, Separator};
use crate::config::OrganizerConfig;
use crate::dates::DateResolver;
use crate::domain::{ImageKind, NamingPlan};
use crate::error::{Error, Result};
use crate::formats::{self, MediaCategory};
use crate::metadata::MetadataSource;
use crate::naming;

/// Progress callback events for an organize run.
pub enum OrganizeProgress {
    /// Walk finished, processing begins.
    Start { total: usize },
    /// A file landed at its canonical location.
    Moved { from: PathBuf, to: PathBuf },
    /// A byte-identical copy already existed; the source was deleted.
    DuplicateRemoved { path: PathBuf },
    /// The file could not be dated or categorized and went to quarantine.
    Quarantined { path: PathBuf },
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrganizeSummary {
    pub total: usize,
    pub moved: usize,
    pub duplicates: usize,
    pub quarantined: usize,
    /// Hidden or unsupported files left for the cleanup pass.
    pub skipped: usize,
}

enum Outcome {
    Moved(PathBuf),
    Duplicate,
    Quarantined,
}

/// Drives the per-file pipeline over the whole input tree, then normalizes
/// what is left behind.
pub struct Organizer<M: MetadataSource> {
    config: OrganizerConfig,
    meta: M,
    resolver: DateResolver,
    cleaner: TreeCleaner,
}

impl<M: MetadataSource> Organizer<M> {
    pub fn new(config: OrganizerConfig, meta: M) -> Result<Self> {
        if !config.input_dir.is_dir() {
            return Err(Error::InputRootMissing(config.input_dir.clone()));
        }
        let resolver = DateResolver::new(&config);
        let cleaner = TreeCleaner::new(&config);
        Ok(Self {
            config,
            meta,
            resolver,
            cleaner,
        })
    }

    /// Process every file under the input root. Every supported file ends
    /// up exactly once in the output tree (canonical spot or quarantine);
    /// duplicates of already-organized content are deleted at the source.
    pub fn run(&self, progress: Option<&dyn Fn(OrganizeProgress)>) -> Result<OrganizeSummary> {
        self.config.ensure_directories()?;

        let mut summary = OrganizeSummary::default();
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for entry in WalkDir::new(self.config.input_root())
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path().to_path_buf();
            if entry.file_type().is_dir() {
                dirs.push(path);
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if cleanup::is_hidden_name(&name) {
                debug!(path = %path.display(), "skipping hidden file");
                summary.skipped += 1;
                continue;
            }
            let supported = formats::extension_of(&path)
                .map(|ext| formats::is_supported(&ext))
                .unwrap_or(false);
            if !supported {
                debug!(path = %path.display(), "skipping unsupported file");
                summary.skipped += 1;
                continue;
            }
            files.push(path);
        }

        summary.total = files.len();
        if let Some(cb) = progress {
            cb(OrganizeProgress::Start {
                total: files.len(),
            });
        }

        for path in files {
            let outcome = match self.process_file(&path) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "processing failed");
                    if self.cleaner.quarantine(&path) {
                        Outcome::Quarantined
                    } else {
                        continue;
                    }
                }
            };
            match outcome {
                Outcome::Moved(target) => {
                    summary.moved += 1;
                    if let Some(cb) = progress {
                        cb(OrganizeProgress::Moved {
                            from: path,
                            to: target,
                        });
                    }
                }
                Outcome::Duplicate => {
                    summary.duplicates += 1;
                    if let Some(cb) = progress {
                        cb(OrganizeProgress::DuplicateRemoved { path });
                    }
                }
                Outcome::Quarantined => {
                    summary.quarantined += 1;
                    if let Some(cb) = progress {
                        cb(OrganizeProgress::Quarantined { path });
                    }
                }
            }
        }

        // Deepest directories first so empty parents prune in one pass.
        dirs.sort_by_key(|d| std::cmp::Reverse(d.as_os_str().len()));
        for dir in &dirs {
            self.cleaner.clean_directory(dir);
        }

        info!(
            total = summary.total,
            moved = summary.moved,
            duplicates = summary.duplicates,
            quarantined = summary.quarantined,
            "organize run complete"
        );
        Ok(summary)
    }

    fn process_file(&self, path: &Path) -> Result<Outcome> {
        let ext = formats::extension_of(path).unwrap_or_default();
        let Some(category) = formats::category_from_extension(&ext) else {
            return self.quarantine(path);
        };

        match classify::detect_image_kind(&self.meta, path) {
            Some(ImageKind::Screenshot) => {
                self.place_prefixed(path, &ext, self.config.screenshots_dir())
            }
            Some(ImageKind::NonCamera) => {
                self.place_prefixed(path, &ext, self.config.non_camera_dir(category))
            }
            None => self.place_photo(path, &ext, category),
        }
    }

    /// Screenshots and non-camera images: timestamp prefix plus the
    /// original stem, dash-separated counters.
    fn place_prefixed(&self, path: &Path, ext: &str, base: PathBuf) -> Result<Outcome> {
        let resolved = self.resolver.resolve(&self.meta, path);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let (target_dir, proposed) = match resolved {
            Some(resolved) => {
                let dt = resolved.timestamp;
                // The stem may already carry a timestamp; keep only the
                // descriptive remainder.
                let remainder = match self.resolver.strip_timestamp(stem) {
                    Some((_, remainder)) => remainder,
                    None => stem.to_string(),
                };
                let padded = naming::pad_numeric_runs(&remainder);
                (
                    naming::date_partition(&base, &dt),
                    naming::prefixed_filename(&dt, &padded, ext),
                )
            }
            None => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                (base, naming::pad_numeric_runs(name))
            }
        };

        let plan = collision::resolve(&target_dir, &proposed, path, Separator::Dash, true)?;
        self.commit(path, plan)
    }

    /// Camera photos: canonical date/shutter/device name under the
    /// category's date-partitioned base directory.
    fn place_photo(&self, path: &Path, ext: &str, category: MediaCategory) -> Result<Outcome> {
        let Some(resolved) = self.resolver.resolve(&self.meta, path) else {
            warn!(path = %path.display(), "no valid date found");
            return self.quarantine(path);
        };
        let Some(base) = self.config.photo_base_dir(category) else {
            warn!(path = %path.display(), "no organized home for this format");
            return self.quarantine(path);
        };

        let info = camera::camera_info(&self.meta, path);
        let shutter = camera::shutter_count(&self.meta, path);
        let filename = naming::photo_filename(&resolved.timestamp, shutter, &info, ext);
        let target_dir = naming::date_partition(&base, &resolved.timestamp);

        let plan = collision::resolve(&target_dir, &filename, path, Separator::Underscore, true)?;
        self.commit(path, plan)
    }

    fn quarantine(&self, path: &Path) -> Result<Outcome> {
        if self.cleaner.quarantine(path) {
            Ok(Outcome::Quarantined)
        } else {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("quarantine move failed for {}", path.display()),
            )))
        }
    }

    /// Execute a naming plan: duplicates delete the source, everything
    /// else is copied with its modification time and then removed.
    fn commit(&self, source: &Path, plan: NamingPlan) -> Result<Outcome> {
        if plan.duplicate {
            info!(
                source = %source.display(),
                existing = %plan.target_path().display(),
                "deleting duplicate source"
            );
            fs::remove_file(source)?;
            return Ok(Outcome::Duplicate);
        }

        fs::create_dir_all(&plan.target_dir)?;
        let target = plan.target_path();
        let mtime = fs::metadata(source)?.modified()?;
        fs::copy(source, &target)?;
        let file = fs::OpenOptions::new().append(true).open(&target)?;
        file.set_modified(mtime)?;
        fs::remove_file(source)?;

        info!(from = %source.display(), to = %target.display(), "moved");
        Ok(Outcome::Moved(target))
    }
}
