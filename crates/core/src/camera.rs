//! Camera make/model provenance: extraction via the metadata capability
//! and the cleanup rules that make the values filename-safe.

use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use crate::domain::CameraInfo;
use crate::metadata::{MetadataSource, SHUTTER_COUNT_TAGS, TAG_MAKE, TAG_MODEL};

/// Read and clean make/model. Capability failure yields empty fields; the
/// file is still processed, just without a device token.
pub fn camera_info(meta: &dyn MetadataSource, path: &Path) -> CameraInfo {
    let tags = match meta.read_tags(path, &[TAG_MAKE, TAG_MODEL]) {
        Ok(tags) => tags,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "camera info read failed");
            return CameraInfo::default();
        }
    };

    let raw_make = tags.get(TAG_MAKE).map(|s| s.trim()).unwrap_or("");
    let raw_model = tags.get(TAG_MODEL).map(|s| s.trim()).unwrap_or("");

    let make = clean_make(raw_make);
    let model = clean_model(raw_model, &make);
    CameraInfo { make, model }
}

/// First parseable shutter/frame counter from the vendor tag list. String
/// values (serial numbers) contribute their last digit run.
pub fn shutter_count(meta: &dyn MetadataSource, path: &Path) -> Option<u64> {
    let tags = match meta.read_tags(path, SHUTTER_COUNT_TAGS) {
        Ok(tags) => tags,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "shutter count read failed");
            return None;
        }
    };

    for tag in SHUTTER_COUNT_TAGS {
        let Some(value) = tags.get(*tag) else {
            continue;
        };
        if let Ok(n) = value.parse::<u64>() {
            return Some(n);
        }
        if let Some(n) = last_digit_run(value).and_then(|run| run.parse::<u64>().ok()) {
            return Some(n);
        }
    }
    None
}

fn last_digit_run(s: &str) -> Option<&str> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(st) = start.take() {
            runs.push(&s[st..i]);
        }
    }
    if let Some(st) = start {
        runs.push(&s[st..]);
    }
    runs.last().copied()
}

/// Canonicalize a camera make: fixed spellings for known brands, strip the
/// generic "Corporation" suffix and non-alphanumerics, camelcase the rest.
pub fn clean_make(make: &str) -> String {
    if make.is_empty() {
        return String::new();
    }

    let lower = make.to_lowercase();
    if lower == "sonyericsson" {
        return "SonyEricsson".to_string();
    }
    if matches!(lower.as_str(), "pentaxcorporation" | "pentax" | "pentax corporation") {
        return "Pentax".to_string();
    }
    if matches!(lower.as_str(), "nikoncorporation" | "nikon" | "nikon corporation") {
        return "Nikon".to_string();
    }

    let mut cleaned = make.to_string();
    if lower.contains("corporation") {
        cleaned = cleaned.replace("Corporation", "").trim().to_string();
    }
    cleaned.retain(|c| c.is_ascii_alphanumeric());

    if matches!(cleaned.as_str(), "SonyEricsson" | "Pentax" | "Nikon" | "Sony" | "Apple") {
        cleaned
    } else {
        camel_case(&cleaned)
    }
}

/// Canonicalize a camera model relative to its cleaned make. Word-boundary
/// capitalization never touches digit runs, and brand-specific rules force
/// the recognized model-number formats.
pub fn clean_model(model: &str, make: &str) -> String {
    if model.is_empty() {
        return String::new();
    }

    let mut model = model.to_string();
    if !make.is_empty() && model.to_lowercase().starts_with(&make.to_lowercase()) {
        model = model[make.len()..].trim().to_string();
    }

    let model = model
        .replace(' ', "-")
        .replace(['/', '\\'], "-")
        .replace(',', "_")
        .replace(['(', ')'], "");

    match make {
        "Nikon" => {
            let d_series = Regex::new(r"(?i)D\d{3,4}").expect("model pattern");
            if let Some(m) = d_series.find(&model) {
                return format!("NIKON-{}", m.as_str().to_uppercase());
            }
            let z_series = Regex::new(r"(?i)Z\d{1,2}").expect("model pattern");
            if let Some(m) = z_series.find(&model) {
                return format!("NIKON-{}", m.as_str().to_uppercase());
            }
        }
        "Sony" => {
            if model.to_uppercase().starts_with("ILCE") {
                return model.to_uppercase();
            }
        }
        "Canon" => {
            if model.to_uppercase().contains("EOS") {
                return model.to_uppercase();
            }
        }
        _ => {}
    }

    model
}

/// Camelcase alphabetic words while preserving digit runs verbatim.
/// "NIKONCORPORATIONNIKOND5100"-style inputs keep their model numbers.
fn camel_case(s: &str) -> String {
    let words = split_words(s);
    if words.is_empty() {
        return s.to_string();
    }

    // Apple devices get a fixed brand spelling.
    if words.iter().any(|w| {
        let l = w.to_lowercase();
        l.contains("apple") || l.contains("iphone")
    }) {
        let rest: String = words.iter().skip(2).map(String::as_str).collect();
        return format!("AppleiPhone{rest}");
    }

    let mut out = capitalize(&words[0]);
    for word in &words[1..] {
        if word.chars().all(|c| c.is_ascii_alphabetic()) {
            out.push_str(&capitalize(word));
        } else {
            out.push_str(word);
        }
    }
    out
}

/// Split into alternating alphabetic and numeric runs, dropping anything
/// else.
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for c in s.chars() {
        if c.is_ascii_alphabetic() || c.is_ascii_digit() {
            let is_digit = c.is_ascii_digit();
            if !current.is_empty() && is_digit != current_is_digit {
                words.push(std::mem::take(&mut current));
            }
            current_is_digit = is_digit;
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::testing::FakeMetadata;
    use std::path::PathBuf;

    // ── clean_make ──────────────────────────────────────────────

    #[test]
    fn test_known_brand_aliases() {
        assert_eq!(clean_make("NIKON CORPORATION"), "Nikon");
        assert_eq!(clean_make("nikon"), "Nikon");
        assert_eq!(clean_make("NikonCorporation"), "Nikon");
        assert_eq!(clean_make("PENTAX Corporation"), "Pentax");
        assert_eq!(clean_make("SonyEricsson"), "SonyEricsson");
    }

    #[test]
    fn test_corporation_suffix_stripped() {
        assert_eq!(clean_make("Samsung Corporation"), "Samsung");
    }

    #[test]
    fn test_make_special_characters_removed() {
        // Space removal happens before word splitting, so letter runs
        // collapse into one capitalized word.
        assert_eq!(clean_make("olympus optical co."), "Olympusopticalco");
    }

    #[test]
    fn test_empty_make() {
        assert_eq!(clean_make(""), "");
    }

    // ── clean_model ─────────────────────────────────────────────

    #[test]
    fn test_nikon_d_series_forced_format() {
        assert_eq!(clean_model("NIKON D90", "Nikon"), "NIKON-D90");
        assert_eq!(clean_model("d5100", "Nikon"), "NIKON-D5100");
    }

    #[test]
    fn test_nikon_z_series_forced_format() {
        assert_eq!(clean_model("z6", "Nikon"), "NIKON-Z6");
        assert_eq!(clean_model("NIKON Z7", "Nikon"), "NIKON-Z7");
    }

    #[test]
    fn test_sony_ilce_uppercased() {
        assert_eq!(clean_model("ilce-7m3", "Sony"), "ILCE-7M3");
    }

    #[test]
    fn test_canon_eos_uppercased() {
        assert_eq!(clean_model("Canon EOS 5D Mark II", "Canon"), "EOS-5D-MARK-II");
    }

    #[test]
    fn test_make_prefix_stripped() {
        assert_eq!(clean_model("Pentax K-5", "Pentax"), "K-5");
    }

    #[test]
    fn test_model_separator_normalization() {
        assert_eq!(clean_model("Model A/B (test)", ""), "Model-A-B-test");
    }

    // ── camel_case ──────────────────────────────────────────────

    #[test]
    fn test_camel_case_preserves_digit_runs() {
        assert_eq!(camel_case("NIKOND5100"), "Nikond5100");
        assert_eq!(camel_case("fujifilm"), "Fujifilm");
    }

    #[test]
    fn test_apple_special_case() {
        assert!(clean_make("Apple iPhone").starts_with("Apple"));
    }

    // ── capability-backed extraction ────────────────────────────

    #[test]
    fn test_camera_info_cleaned() {
        let path = PathBuf::from("/p/a.jpg");
        let fake = FakeMetadata::with_tags(
            &path,
            &[("Make", "NIKON CORPORATION"), ("Model", "NIKON D90")],
        );
        let info = camera_info(&fake, &path);
        assert_eq!(info.make, "Nikon");
        assert_eq!(info.model, "NIKON-D90");
    }

    #[test]
    fn test_camera_info_failure_is_empty() {
        let path = PathBuf::from("/p/a.jpg");
        let fake = FakeMetadata {
            failing: vec![path.clone()],
            ..Default::default()
        };
        assert!(camera_info(&fake, &path).is_empty());
    }

    // ── shutter count ───────────────────────────────────────────

    #[test]
    fn test_shutter_count_numeric() {
        let path = PathBuf::from("/p/a.nef");
        let fake = FakeMetadata::with_tags(&path, &[("ShutterCount", "12345")]);
        assert_eq!(shutter_count(&fake, &path), Some(12345));
    }

    #[test]
    fn test_shutter_count_from_serial_takes_last_run() {
        let path = PathBuf::from("/p/a.cr2");
        let fake = FakeMetadata::with_tags(&path, &[("InternalSerialNumber", "XA12-0004567")]);
        assert_eq!(shutter_count(&fake, &path), Some(4567));
    }

    #[test]
    fn test_shutter_count_tag_priority() {
        let path = PathBuf::from("/p/a.nef");
        let fake = FakeMetadata::with_tags(
            &path,
            &[("ShutterCount", "100"), ("ImageNumber", "999")],
        );
        assert_eq!(shutter_count(&fake, &path), Some(100));
    }

    #[test]
    fn test_shutter_count_absent() {
        let path = PathBuf::from("/p/a.jpg");
        let fake = FakeMetadata::with_tags(&path, &[("Make", "Nikon")]);
        assert_eq!(shutter_count(&fake, &path), None);
    }
}
