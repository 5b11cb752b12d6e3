//! Screenshot and non-camera detection from embedded metadata.

use std::path::Path;

use tracing::debug;

use crate::domain::ImageKind;
use crate::metadata::{MetadataSource, CLASSIFY_TAGS};

/// Producing-software names that mark an image as designed rather than
/// photographed.
const DESIGN_SOFTWARE: &[&str] = &[
    "photoshop",
    "illustrator",
    "inkscape",
    "gimp",
    "paint",
    "sketch",
    "figma",
    "xd",
    "canva",
];

/// Classify a file as screenshot, non-camera image, or neither (a camera
/// photo). Capability failure never blocks processing: the file is simply
/// treated as a camera photo.
pub fn detect_image_kind(meta: &dyn MetadataSource, path: &Path) -> Option<ImageKind> {
    let tags = match meta.read_tags(path, CLASSIFY_TAGS) {
        Ok(tags) => tags,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "classification read failed");
            return None;
        }
    };

    let software = tags
        .get("Software")
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    if software.contains("screen") || software.contains("screenshot") {
        return Some(ImageKind::Screenshot);
    }

    // Screenshots are typically 8-bit RGB(A) PNGs at least one screen wide.
    let file_type = tags
        .get("FileType")
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if file_type == "png" {
        let color_type = tags.get("PNG:ColorType").map(String::as_str).unwrap_or("");
        let bit_depth = tags.get("PNG:BitDepth").map(String::as_str).unwrap_or("");
        let width: u32 = tags
            .get("ImageWidth")
            .and_then(|w| w.parse().ok())
            .unwrap_or(0);
        let rgb = matches!(color_type, "2" | "6" | "RGB" | "RGB+Alpha");
        if rgb && bit_depth == "8" && width >= 800 {
            return Some(ImageKind::Screenshot);
        }
    }

    if DESIGN_SOFTWARE.iter().any(|s| software.contains(s)) {
        return Some(ImageKind::NonCamera);
    }

    None
}
