use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::Result;
use crate::formats::MediaCategory;

/// Earliest year accepted as a plausible capture date.
pub const MIN_VALID_YEAR: i32 = 1985;

/// Immutable configuration threaded into each component at construction.
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub min_valid_year: i32,
    /// Default dates set by cameras and systems with a broken clock.
    /// A resolved date matching one of these is rejected outright.
    pub placeholder_dates: Vec<NaiveDate>,
}

impl OrganizerConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            min_valid_year: MIN_VALID_YEAR,
            placeholder_dates: vec![
                NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            ],
        }
    }

    /// Flat directory for files that could not be dated or classified.
    pub fn quarantine_dir(&self) -> PathBuf {
        self.output_dir.join("unprocessed")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.output_dir.join("screenshots")
    }

    /// Base directory for a non-camera image, chosen by extension category.
    pub fn non_camera_dir(&self, category: MediaCategory) -> PathBuf {
        let sub = match category {
            MediaCategory::Icon => "icons",
            MediaCategory::Vector => "vector",
            _ => "graphics",
        };
        self.output_dir.join("non_camera_images").join(sub)
    }

    /// Base directory for a camera photo, or None when the category has no
    /// date-partitioned home (TIFF and non-photo categories route to
    /// quarantine instead).
    pub fn photo_base_dir(&self, category: MediaCategory) -> Option<PathBuf> {
        let sub = match category {
            MediaCategory::Jpeg => "jpg",
            MediaCategory::Raw => "raw",
            MediaCategory::OtherRaster => "other",
            _ => return None,
        };
        Some(self.output_dir.join(sub))
    }

    /// Create the full output skeleton.
    pub fn ensure_directories(&self) -> Result<()> {
        let dirs = [
            self.output_dir.join("jpg"),
            self.output_dir.join("raw"),
            self.output_dir.join("other"),
            self.screenshots_dir(),
            self.output_dir.join("non_camera_images").join("icons"),
            self.output_dir.join("non_camera_images").join("vector"),
            self.output_dir.join("non_camera_images").join("graphics"),
            self.quarantine_dir(),
        ];
        for dir in &dirs {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn is_placeholder(&self, date: NaiveDate) -> bool {
        self.placeholder_dates.contains(&date)
    }

    pub fn input_root(&self) -> &Path {
        &self.input_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_base_dirs() {
        let cfg = OrganizerConfig::new("/in", "/out");
        assert_eq!(
            cfg.photo_base_dir(MediaCategory::Jpeg),
            Some(PathBuf::from("/out/jpg"))
        );
        assert_eq!(
            cfg.photo_base_dir(MediaCategory::Raw),
            Some(PathBuf::from("/out/raw"))
        );
        assert_eq!(
            cfg.photo_base_dir(MediaCategory::OtherRaster),
            Some(PathBuf::from("/out/other"))
        );
        // TIFF has no photo home: it routes to quarantine.
        assert_eq!(cfg.photo_base_dir(MediaCategory::Tiff), None);
        assert_eq!(cfg.photo_base_dir(MediaCategory::Icon), None);
    }

    #[test]
    fn test_non_camera_dirs() {
        let cfg = OrganizerConfig::new("/in", "/out");
        assert_eq!(
            cfg.non_camera_dir(MediaCategory::Icon),
            PathBuf::from("/out/non_camera_images/icons")
        );
        assert_eq!(
            cfg.non_camera_dir(MediaCategory::Vector),
            PathBuf::from("/out/non_camera_images/vector")
        );
        assert_eq!(
            cfg.non_camera_dir(MediaCategory::OtherRaster),
            PathBuf::from("/out/non_camera_images/graphics")
        );
    }

    #[test]
    fn test_placeholder_dates() {
        let cfg = OrganizerConfig::new("/in", "/out");
        assert!(cfg.is_placeholder(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()));
        assert!(cfg.is_placeholder(NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()));
        assert!(!cfg.is_placeholder(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()));
    }

    #[test]
    fn test_ensure_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = OrganizerConfig::new(tmp.path().join("in"), tmp.path().join("out"));
        cfg.ensure_directories().unwrap();
        assert!(tmp.path().join("out/jpg").is_dir());
        assert!(tmp.path().join("out/non_camera_images/vector").is_dir());
        assert!(tmp.path().join("out/unprocessed").is_dir());
    }
}
