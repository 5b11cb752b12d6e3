//! Extension categories and the pure `.jpeg -> .jpg` rename rule.

use std::path::Path;

/// Category of a media file, decided by extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    /// jpg and jpeg files.
    Jpeg,
    /// Camera raw formats (plus HEIC).
    Raw,
    /// Raster images that are typically not photos.
    OtherRaster,
    Icon,
    Vector,
    /// TIFF needs special handling and has no date-partitioned home.
    Tiff,
}

pub const JPG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
pub const RAW_EXTENSIONS: &[&str] = &["arw", "cr2", "nef", "heic"];
pub const OTHER_IMAGE_EXTENSIONS: &[&str] = &["gif", "png", "bmp"];
pub const ICON_EXTENSIONS: &[&str] = &["ico", "icns"];
pub const VECTOR_EXTENSIONS: &[&str] = &["svg", "eps", "ai"];
pub const TIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Map a file extension (lowercase, without dot) to a category.
pub fn category_from_extension(ext: &str) -> Option<MediaCategory> {
    if JPG_EXTENSIONS.contains(&ext) {
        Some(MediaCategory::Jpeg)
    } else if RAW_EXTENSIONS.contains(&ext) {
        Some(MediaCategory::Raw)
    } else if OTHER_IMAGE_EXTENSIONS.contains(&ext) {
        Some(MediaCategory::OtherRaster)
    } else if ICON_EXTENSIONS.contains(&ext) {
        Some(MediaCategory::Icon)
    } else if VECTOR_EXTENSIONS.contains(&ext) {
        Some(MediaCategory::Vector)
    } else if TIFF_EXTENSIONS.contains(&ext) {
        Some(MediaCategory::Tiff)
    } else {
        None
    }
}

/// Lowercased extension of a path, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase())
}

pub fn is_supported(ext: &str) -> bool {
    category_from_extension(ext).is_some()
}

/// Extensions whose embedded metadata is mutable: candidates for the EXIF
/// back-write when a date is recovered from the filename.
pub fn is_photo_extension(ext: &str) -> bool {
    JPG_EXTENSIONS.contains(&ext) || RAW_EXTENSIONS.contains(&ext)
}

/// The legacy extension spelling rule as a pure function: returns the new
/// file name when `name` ends in `.jpeg` (any case), None otherwise. The
/// caller performs the actual rename before the file is hashed or listed
/// again.
pub fn normalize_extension(name: &str) -> Option<String> {
    let path = Path::new(name);
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case("jpeg") {
        let stem = path.file_stem()?.to_str()?;
        Some(format!("{stem}.jpg"))
    } else {
        None
    }
}
