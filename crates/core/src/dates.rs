//! Date resolution: a strictly ordered cascade over embedded metadata and
//! filename-encoded timestamps.
//!
//! Filename matching is a data-driven table of (pattern, field rule)
//! entries evaluated in sequence; new patterns are additive.

use std::path::Path;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::OrganizerConfig;
use crate::domain::{DateSource, ResolvedDate};
use crate::formats;
use crate::metadata::{MetadataSource, TAG_CREATE_DATE, TAG_DATE_TIME_ORIGINAL};

/// How the captured groups of a pattern map onto date fields.
#[derive(Debug, Clone, Copy)]
enum FieldRule {
    /// Six captures. A four-digit first group means year-first
    /// (Y-M-D-H-M-S), otherwise day-first (D-M-Y-H-M-S).
    SplitSix,
    /// An eight-digit date group and a six-digit time group.
    CompactPair,
    /// Twelve concatenated digits: YYYYMMDDHHMM, seconds default to zero.
    CompactTwelve,
    /// Three captures, date only, time defaults to midnight. Four-digit
    /// first group means year-first.
    DateOnly,
}

struct DatePattern {
    regex: Regex,
    rule: FieldRule,
}

/// Resolves a best-effort creation timestamp for a file.
pub struct DateResolver {
    min_valid_year: i32,
    current_year: i32,
    placeholder_dates: Vec<NaiveDate>,
    patterns: Vec<DatePattern>,
    strip_patterns: Vec<Regex>,
    collapse: Regex,
}

impl DateResolver {
    pub fn new(config: &OrganizerConfig) -> Self {
        let table: &[(&str, FieldRule)] = &[
            // Full date-time forms first, most specific delimiters first.
            (r"(\d{4})-(\d{2})-(\d{2})-(\d{2})-(\d{2})-(\d{2})", FieldRule::SplitSix),
            (r"(\d{2})-(\d{2})-(\d{4})-(\d{2})-(\d{2})-(\d{2})", FieldRule::SplitSix),
            (r"(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})", FieldRule::SplitSix),
            (r"(\d{4})-(\d{2})-(\d{2})_(\d{2})-(\d{2})-(\d{2})", FieldRule::SplitSix),
            (r"(\d{4})_(\d{2})_(\d{2})_(\d{2})_(\d{2})_(\d{2})", FieldRule::SplitSix),
            (r"(\d{2})-(\d{2})-(\d{4})_(\d{2})(\d{2})(\d{2})", FieldRule::SplitSix),
            (r"(\d{8})-(\d{6})", FieldRule::CompactPair),
            (r"(\d{12})", FieldRule::CompactTwelve),
            // Date-only forms last.
            (r"(\d{4})-(\d{2})-(\d{2})", FieldRule::DateOnly),
            (r"(\d{2})-(\d{2})-(\d{4})", FieldRule::DateOnly),
        ];

        let strip: &[&str] = &[
            r"\d{8}[-_]\d{6}",
            r"\d{4}-\d{2}-\d{2}[-_]\d{2}[-_]\d{2}[-_]\d{2}",
            r"\d{4}[-_]\d{2}[-_]\d{2}[-_]\d{2}[-_]\d{2}[-_]\d{2}",
            r"\d{2}-\d{2}-\d{4}[-_]\d{6}",
            r"\d{14}",
            r"\d{4}-\d{2}-\d{2}",
            r"\d{2}-\d{2}-\d{4}",
            r"\d{8}",
            r"\d{6}[-_]\d{6}",
        ];

        Self {
            min_valid_year: config.min_valid_year,
            current_year: Local::now().year(),
            placeholder_dates: config.placeholder_dates.clone(),
            patterns: table
                .iter()
                .map(|(pattern, rule)| DatePattern {
                    regex: Regex::new(pattern).expect("date pattern"),
                    rule: *rule,
                })
                .collect(),
            strip_patterns: strip
                .iter()
                .map(|p| Regex::new(p).expect("strip pattern"))
                .collect(),
            collapse: Regex::new(r"[-_]+").expect("collapse pattern"),
        }
    }

    /// The full cascade: metadata first, filename second, back-write when
    /// the filename rescued a photo whose metadata had no usable date.
    /// Returns None when no plausible date exists anywhere.
    pub fn resolve(&self, meta: &dyn MetadataSource, path: &Path) -> Option<ResolvedDate> {
        if let Some(timestamp) = self.metadata_date(meta, path) {
            return Some(ResolvedDate {
                timestamp,
                source: DateSource::Metadata,
            });
        }

        let stem = path.file_stem()?.to_str()?;
        let timestamp = self.date_from_filename(stem)?;

        let is_photo = formats::extension_of(path)
            .map(|ext| formats::is_photo_extension(&ext))
            .unwrap_or(false);
        if is_photo {
            info!(path = %path.display(), "valid date in filename but not in metadata, writing back");
            self.write_back(meta, path, timestamp);
        }

        Some(ResolvedDate {
            timestamp,
            source: DateSource::Filename,
        })
    }

    /// Step 1: query the capability for CreateDate / DateTimeOriginal.
    pub fn metadata_date(&self, meta: &dyn MetadataSource, path: &Path) -> Option<NaiveDateTime> {
        let tags = match meta.read_tags(path, &[TAG_CREATE_DATE, TAG_DATE_TIME_ORIGINAL]) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "metadata read failed");
                return None;
            }
        };

        let raw = tags
            .get(TAG_CREATE_DATE)
            .or_else(|| tags.get(TAG_DATE_TIME_ORIGINAL))?;
        if raw.contains("0000:00:00") || raw.contains("0000-00-00") {
            debug!(path = %path.display(), value = %raw, "zeroed date in metadata");
            return None;
        }

        // EXIF format is "2023:06:15 14:30:00"; normalize the date
        // separators only.
        let normalized = raw.replacen(':', "-", 2);
        let dt = match NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S") {
            Ok(dt) => dt,
            Err(_) => {
                debug!(path = %path.display(), value = %raw, "unparsable metadata date");
                return None;
            }
        };

        if !self.plausible(dt) {
            warn!(path = %path.display(), date = %dt, "implausible metadata date");
            return None;
        }
        Some(dt)
    }

    /// Step 2: match the filename (stem only) against the pattern table.
    /// First matching pattern that yields a plausible date wins.
    pub fn date_from_filename(&self, name: &str) -> Option<NaiveDateTime> {
        for pattern in &self.patterns {
            let Some(caps) = pattern.regex.captures(name) else {
                continue;
            };

            let fields = match pattern.rule {
                FieldRule::SplitSix => {
                    let g: Vec<&str> = (1..=6).map(|i| caps.get(i).unwrap().as_str()).collect();
                    if g[0].len() == 4 {
                        [g[0], g[1], g[2], g[3], g[4], g[5]].map(String::from)
                    } else {
                        [g[2], g[1], g[0], g[3], g[4], g[5]].map(String::from)
                    }
                }
                FieldRule::CompactPair => {
                    let date = caps.get(1).unwrap().as_str();
                    let time = caps.get(2).unwrap().as_str();
                    [
                        date[0..4].to_string(),
                        date[4..6].to_string(),
                        date[6..8].to_string(),
                        time[0..2].to_string(),
                        time[2..4].to_string(),
                        time[4..6].to_string(),
                    ]
                }
                FieldRule::CompactTwelve => {
                    let digits = caps.get(1).unwrap().as_str();
                    [
                        digits[0..4].to_string(),
                        digits[4..6].to_string(),
                        digits[6..8].to_string(),
                        digits[8..10].to_string(),
                        digits[10..12].to_string(),
                        "00".to_string(),
                    ]
                }
                FieldRule::DateOnly => {
                    let g: Vec<&str> = (1..=3).map(|i| caps.get(i).unwrap().as_str()).collect();
                    let (y, m, d) = if g[0].len() == 4 {
                        (g[0], g[1], g[2])
                    } else {
                        (g[2], g[1], g[0])
                    };
                    [
                        y.to_string(),
                        m.to_string(),
                        d.to_string(),
                        "00".to_string(),
                        "00".to_string(),
                        "00".to_string(),
                    ]
                }
            };

            if let Some(dt) = self.build_timestamp(&fields) {
                return Some(dt);
            }
            // Implausible match falls through to the next pattern.
        }
        None
    }

    /// Remove every known timestamp pattern from a stem, returning the
    /// extracted date and the cleaned remainder ("file" when nothing is
    /// left). None when the stem holds no timestamp.
    pub fn strip_timestamp(&self, stem: &str) -> Option<(NaiveDateTime, String)> {
        let dt = self.date_from_filename(stem)?;

        let mut remaining = stem.to_string();
        for pattern in &self.strip_patterns {
            remaining = pattern.replace_all(&remaining, "").into_owned();
        }
        let trimmed = remaining.trim_matches(['_', '-', ' ']);
        let cleaned = self.collapse.replace_all(trimmed, "-").into_owned();

        if cleaned.is_empty() {
            Some((dt, "file".to_string()))
        } else {
            Some((dt, cleaned))
        }
    }

    fn build_timestamp(&self, fields: &[String; 6]) -> Option<NaiveDateTime> {
        let year: i32 = fields[0].parse().ok()?;
        let month: u32 = fields[1].parse().ok()?;
        let day: u32 = fields[2].parse().ok()?;
        let hour: u32 = fields[3].parse().ok()?;
        let minute: u32 = fields[4].parse().ok()?;
        let second: u32 = fields[5].parse().ok()?;

        let dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        if self.plausible(dt) {
            Some(dt)
        } else {
            None
        }
    }

    fn plausible(&self, dt: NaiveDateTime) -> bool {
        let year = dt.year();
        if year < self.min_valid_year || year > self.current_year {
            return false;
        }
        !self.placeholder_dates.contains(&dt.date())
    }

    /// Step 3: write the filename-derived date back into the metadata.
    /// Best-effort; a failed write never invalidates the resolved date,
    /// and the result is not re-validated.
    fn write_back(&self, meta: &dyn MetadataSource, path: &Path, dt: NaiveDateTime) {
        let value = dt.format("%Y:%m:%d %H:%M:%S").to_string();
        let result = meta.write_tags(
            path,
            &[
                (TAG_CREATE_DATE, value.as_str()),
                (TAG_DATE_TIME_ORIGINAL, value.as_str()),
            ],
        );
        match result {
            Ok(()) => info!(path = %path.display(), date = %value, "metadata date updated"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "metadata write failed, keeping filename date")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::testing::FakeMetadata;
    use std::path::PathBuf;

    fn resolver() -> DateResolver {
        DateResolver::new(&OrganizerConfig::new("/in", "/out"))
    }

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    // ── filename patterns ───────────────────────────────────────

    #[test]
    fn test_compact_date_time_underscore() {
        assert_eq!(
            resolver().date_from_filename("IMG_20230615_143000"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
    }

    #[test]
    fn test_dashed_date_time() {
        assert_eq!(
            resolver().date_from_filename("2023-06-15-14-30-00"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
        assert_eq!(
            resolver().date_from_filename("2023-06-15_14-30-00"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
        assert_eq!(
            resolver().date_from_filename("2023_06_15_14_30_00"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
    }

    #[test]
    fn test_day_first_disambiguated_by_group_length() {
        assert_eq!(
            resolver().date_from_filename("15-06-2023-14-30-00"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
        assert_eq!(
            resolver().date_from_filename("15-06-2023_143000"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
    }

    #[test]
    fn test_compact_pair() {
        assert_eq!(
            resolver().date_from_filename("20230615-143000"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
    }

    #[test]
    fn test_twelve_digits_seconds_default_zero() {
        assert_eq!(
            resolver().date_from_filename("202306151430"),
            Some(dt(2023, 6, 15, 14, 30, 0))
        );
    }

    #[test]
    fn test_date_only_midnight() {
        assert_eq!(
            resolver().date_from_filename("2023-06-15"),
            Some(dt(2023, 6, 15, 0, 0, 0))
        );
        assert_eq!(
            resolver().date_from_filename("15-06-2023"),
            Some(dt(2023, 6, 15, 0, 0, 0))
        );
    }

    #[test]
    fn test_no_date() {
        assert_eq!(resolver().date_from_filename("holiday_photo"), None);
        assert_eq!(resolver().date_from_filename(""), None);
    }

    #[test]
    fn test_year_out_of_range_rejected() {
        assert_eq!(resolver().date_from_filename("19700101_000000"), None);
        assert_eq!(resolver().date_from_filename("29990615_143000"), None);
    }

    #[test]
    fn test_invalid_calendar_date_rejected() {
        assert_eq!(resolver().date_from_filename("20230231_120000"), None);
        assert_eq!(resolver().date_from_filename("20231315_120000"), None);
    }

    #[test]
    fn test_placeholder_date_rejected() {
        let mut config = OrganizerConfig::new("/in", "/out");
        // Lower the floor so the placeholder check itself is exercised.
        config.min_valid_year = 1960;
        let resolver = DateResolver::new(&config);
        assert_eq!(resolver.date_from_filename("19800101-120000"), None);
        assert!(resolver.date_from_filename("19810101-120000").is_some());
    }

    // ── metadata cascade ────────────────────────────────────────

    #[test]
    fn test_metadata_date_wins() {
        let path = PathBuf::from("/p/IMG_20200101_000000.jpg");
        let fake = FakeMetadata::with_tags(&path, &[("CreateDate", "2023:06:15 14:30:00")]);
        let resolved = resolver().resolve(&fake, &path).unwrap();
        assert_eq!(resolved.timestamp, dt(2023, 6, 15, 14, 30, 0));
        assert_eq!(resolved.source, DateSource::Metadata);
        assert!(fake.writes.borrow().is_empty());
    }

    #[test]
    fn test_zeroed_metadata_date_falls_through() {
        let path = PathBuf::from("/p/IMG_20230615_143000.jpg");
        let fake = FakeMetadata::with_tags(&path, &[("CreateDate", "0000:00:00 00:00:00")]);
        let resolved = resolver().resolve(&fake, &path).unwrap();
        assert_eq!(resolved.source, DateSource::Filename);
    }

    #[test]
    fn test_implausible_metadata_date_uses_filename_and_writes_back() {
        let path = PathBuf::from("/p/IMG_20230615_143000.jpg");
        let fake = FakeMetadata::with_tags(&path, &[("CreateDate", "1970:01:01 00:00:00")]);
        let resolved = resolver().resolve(&fake, &path).unwrap();
        assert_eq!(resolved.timestamp, dt(2023, 6, 15, 14, 30, 0));
        assert_eq!(resolved.source, DateSource::Filename);

        let writes = fake.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, path);
        assert_eq!(writes[0].1[0].1, "2023:06:15 14:30:00");
    }

    #[test]
    fn test_no_back_write_for_non_photo_extension() {
        let path = PathBuf::from("/p/chart_20230615_143000.png");
        let fake = FakeMetadata::default();
        let resolved = resolver().resolve(&fake, &path).unwrap();
        assert_eq!(resolved.source, DateSource::Filename);
        assert!(fake.writes.borrow().is_empty());
    }

    #[test]
    fn test_both_steps_fail_returns_none() {
        let path = PathBuf::from("/p/holiday.jpg");
        let fake = FakeMetadata::default();
        assert!(resolver().resolve(&fake, &path).is_none());
    }

    #[test]
    fn test_metadata_read_failure_falls_through() {
        let path = PathBuf::from("/p/IMG_20230615_143000.jpg");
        let fake = FakeMetadata {
            failing: vec![path.clone()],
            ..Default::default()
        };
        let resolved = resolver().resolve(&fake, &path).unwrap();
        assert_eq!(resolved.source, DateSource::Filename);
    }

    #[test]
    fn test_date_time_original_fallback() {
        let path = PathBuf::from("/p/a.jpg");
        let fake = FakeMetadata::with_tags(&path, &[("DateTimeOriginal", "2022:03:01 08:00:00")]);
        assert_eq!(
            resolver().metadata_date(&fake, &path),
            Some(dt(2022, 3, 1, 8, 0, 0))
        );
    }

    // ── strip_timestamp ─────────────────────────────────────────

    #[test]
    fn test_strip_timestamp_keeps_remainder() {
        let (got, rest) = resolver().strip_timestamp("IMG_20230615_143000_edited").unwrap();
        assert_eq!(got, dt(2023, 6, 15, 14, 30, 0));
        assert_eq!(rest, "IMG-edited");
    }

    #[test]
    fn test_strip_timestamp_nothing_left() {
        let (_, rest) = resolver().strip_timestamp("20230615-143000").unwrap();
        assert_eq!(rest, "file");
    }

    #[test]
    fn test_strip_timestamp_no_date() {
        assert!(resolver().strip_timestamp("holiday").is_none());
    }
}
