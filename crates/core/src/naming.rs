//! Canonical filename construction and date-partitioned directory layout.
//! All functions here are pure; callers create directories and move bytes.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};

use crate::domain::CameraInfo;

/// Compact date-time token used as the leading filename component.
pub fn date_token(dt: &NaiveDateTime) -> String {
    dt.format("%Y%m%d-%H%M%S").to_string()
}

/// Canonical camera-photo filename:
/// `YYYYMMDD-HHMMSS[_NNNNNN][_Make-Model].ext`. The shutter counter is
/// zero-padded to six digits; `.jpeg` is canonicalized to `.jpg`.
pub fn photo_filename(
    dt: &NaiveDateTime,
    shutter: Option<u64>,
    camera: &CameraInfo,
    ext: &str,
) -> String {
    let ext = ext.to_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };

    let shutter_part = match shutter {
        Some(n) => format!("_{n:06}"),
        None => String::new(),
    };

    let camera_part = if camera.is_empty() {
        String::new()
    } else {
        let mut parts = Vec::new();
        if !camera.make.is_empty() {
            parts.push(camera.make.as_str());
        }
        if !camera.model.is_empty() {
            parts.push(camera.model.as_str());
        }
        format!("_{}", parts.join("-"))
    };

    format!("{}{shutter_part}{camera_part}.{ext}", date_token(dt))
}

/// Filename for screenshots and non-camera images: date prefix plus the
/// sanitized original stem.
pub fn prefixed_filename(dt: &NaiveDateTime, stem: &str, ext: &str) -> String {
    format!("{}-{stem}.{}", date_token(dt), ext.to_lowercase())
}

/// Zero-pad pure-numeric dash/underscore-delimited tokens to 3 digits.
/// The final underscore part is left untouched when it contains a dash:
/// that position holds the device token, and model numbers must not be
/// reformatted.
pub fn pad_numeric_runs(filename: &str) -> String {
    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let ext = path.extension().and_then(|e| e.to_str());

    let parts: Vec<&str> = stem.split('_').collect();
    let last = parts.len() - 1;

    let padded: Vec<String> = parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i == last && part.contains('-') {
                return part.to_string();
            }
            part.split('-')
                .map(|sub| {
                    if !sub.is_empty() && sub.chars().all(|c| c.is_ascii_digit()) && sub.len() < 3 {
                        format!("{:0>3}", sub)
                    } else {
                        sub.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect();

    match ext {
        Some(ext) => format!("{}.{ext}", padded.join("_")),
        None => padded.join("_"),
    }
}

/// `YYYY/YYYY-MM/YYYY-MM-DD` under a type-specific base directory.
pub fn date_partition(base: &Path, dt: &NaiveDateTime) -> PathBuf {
    let year = dt.year();
    let month = format!("{year}-{:02}", dt.month());
    let day = format!("{year}-{:02}-{:02}", dt.month(), dt.day());
    base.join(year.to_string()).join(month).join(day)
}

/// Quarantine naming: lowercase, spaces to dashes, collapsed separators.
pub fn quarantine_filename(name: &str) -> String {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str());

    let formatted = stem.to_lowercase().replace(' ', "-");
    let mut collapsed = String::with_capacity(formatted.len());
    let mut prev_dash = false;
    for c in formatted.chars() {
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }
    let trimmed = collapsed.trim_matches('-');

    match ext {
        Some(ext) => format!("{trimmed}.{}", ext.to_lowercase()),
        None => trimmed.to_string(),
    }
}
