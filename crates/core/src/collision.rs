//! Collision-safe name allocation with duplicate short-circuiting.
//!
//! Existence probing here is check-then-act: callers must serialize
//! resolution per target directory.

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::domain::NamingPlan;
use crate::error::Result;
use crate::hasher;

/// Counter separator, chosen per caller context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Dash,
    Underscore,
}

impl Separator {
    fn as_char(self) -> char {
        match self {
            Self::Dash => '-',
            Self::Underscore => '_',
        }
    }
}

/// Resolve a proposed filename inside a target directory.
///
/// Any existing `[_-]NNN` counter is stripped from the proposed stem
/// first. With `check_duplicates` on, the unsuffixed candidate and then
/// every sorted numbered variant are tested for byte-identity against
/// `source`; the first identical file wins and the plan is marked
/// duplicate. Otherwise the first unused name in
/// {base, base+sep+001, base+sep+002, ...} is allocated.
pub fn resolve(
    target_dir: &Path,
    proposed: &str,
    source: &Path,
    separator: Separator,
    check_duplicates: bool,
) -> Result<NamingPlan> {
    let path = Path::new(proposed);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(proposed);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let base = strip_counter(stem);
    debug!(proposed, base, "resolving name collision");

    if check_duplicates {
        // Unsuffixed candidate first; first found wins.
        let base_name = format!("{base}{ext}");
        let candidate = target_dir.join(&base_name);
        if candidate.exists() && identical(source, &candidate) {
            info!(
                source = %source.display(),
                existing = %candidate.display(),
                "exact duplicate of existing file"
            );
            return Ok(NamingPlan {
                target_dir: target_dir.to_path_buf(),
                filename: base_name,
                duplicate: true,
            });
        }

        for name in numbered_variants(target_dir, base, &ext) {
            let existing = target_dir.join(&name);
            if identical(source, &existing) {
                info!(
                    source = %source.display(),
                    existing = %existing.display(),
                    "exact duplicate of numbered variant"
                );
                return Ok(NamingPlan {
                    target_dir: target_dir.to_path_buf(),
                    filename: name,
                    duplicate: true,
                });
            }
        }
    }

    // Sequential allocation, probing existence from the unsuffixed name.
    let sep = separator.as_char();
    let mut counter = 0u32;
    loop {
        let name = if counter == 0 {
            format!("{base}{ext}")
        } else {
            format!("{base}{sep}{counter:03}{ext}")
        };
        if !target_dir.join(&name).exists() {
            return Ok(NamingPlan {
                target_dir: target_dir.to_path_buf(),
                filename: name,
                duplicate: false,
            });
        }
        counter += 1;
    }
}

/// Remove an existing three-digit counter from a stem. The first counter
/// occurrence found decides the pattern; the stem is cut at its last
/// occurrence.
fn strip_counter(stem: &str) -> &str {
    let pattern = Regex::new(r"([_-]\d{3})(?:[_-]|$)").expect("counter pattern");
    match pattern.captures(stem) {
        Some(caps) => {
            let counter = caps.get(1).unwrap().as_str();
            match stem.rfind(counter) {
                Some(idx) => &stem[..idx],
                None => stem,
            }
        }
        None => stem,
    }
}

/// Existing `base{sep}NNN{ext}` files in the directory, sorted by name.
/// A scan failure is treated as "no variants found".
fn numbered_variants(dir: &Path, base: &str, ext: &str) -> Vec<String> {
    let pattern = Regex::new(&format!(
        "^{}[_-][0-9]{{3}}{}$",
        regex::escape(base),
        regex::escape(ext)
    ))
    .expect("variant pattern");

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "directory scan failed during duplicate probe");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| pattern.is_match(name))
        .collect();
    names.sort();
    names
}

/// Identity-check failures are treated as "not a duplicate" so the file
/// falls through to counter-based naming instead of being deleted.
fn identical(source: &Path, existing: &Path) -> bool {
    match hasher::files_identical(source, existing) {
        Ok(same) => same,
        Err(e) => {
            warn!(
                source = %source.display(),
                existing = %existing.display(),
                error = %e,
                "duplicate check failed, assuming distinct"
            );
            false
        }
    }
}
