//! The metadata capability: read and write tags by name.
//!
//! The core never parses a camera's binary metadata itself; it consumes
//! this trait and works with whatever comes back. The production
//! implementation shells out to `exiftool` with JSON output.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

use crate::error::{Error, Result};

pub const TAG_CREATE_DATE: &str = "CreateDate";
pub const TAG_DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
pub const TAG_MAKE: &str = "Make";
pub const TAG_MODEL: &str = "Model";

/// Shutter/frame counter tags, in probe order. Different vendors stash the
/// counter under different names.
pub const SHUTTER_COUNT_TAGS: &[&str] = &[
    "ShutterCount",
    "ImageCount",
    "ShutterCountValue",
    "SonyImageCount",
    "ShutterCounter",
    "InternalSerialNumber",
    "ImageNumber",
];

/// Tags consulted when classifying screenshots and non-camera images.
pub const CLASSIFY_TAGS: &[&str] = &[
    "Software",
    "ColorSpace",
    "Compression",
    "ScreenCaptureType",
    "FileType",
    "ImageWidth",
    "ImageHeight",
    "PNG:ColorType",
    "PNG:BitDepth",
];

/// Capability: given a file path, return a mapping of tag name to value,
/// or fail. Absent tags are simply missing from the map.
pub trait MetadataSource {
    fn read_tags(&self, path: &Path, tags: &[&str]) -> Result<HashMap<String, String>>;

    /// Best-effort tag write. Must preserve the file's modification time.
    fn write_tags(&self, path: &Path, tags: &[(&str, &str)]) -> Result<()>;
}

/// Production capability backed by the `exiftool` binary.
#[derive(Debug, Clone)]
pub struct ExifTool {
    command: String,
}

impl Default for ExifTool {
    fn default() -> Self {
        Self {
            command: "exiftool".to_string(),
        }
    }
}

impl ExifTool {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn metadata_err(path: &Path, message: impl Into<String>) -> Error {
        Error::Metadata {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl MetadataSource for ExifTool {
    fn read_tags(&self, path: &Path, tags: &[&str]) -> Result<HashMap<String, String>> {
        let mut cmd = Command::new(&self.command);
        cmd.arg("-j");
        for tag in tags {
            cmd.arg(format!("-{tag}"));
        }
        cmd.arg(path);

        let output = cmd
            .output()
            .map_err(|e| Self::metadata_err(path, format!("failed to run {}: {e}", self.command)))?;
        if !output.status.success() {
            return Err(Self::metadata_err(
                path,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let parsed: Vec<Value> = serde_json::from_slice(&output.stdout)?;
        let mut map = HashMap::new();
        if let Some(Value::Object(fields)) = parsed.into_iter().next() {
            for (key, value) in fields {
                match value {
                    Value::String(s) => {
                        map.insert(key, s);
                    }
                    Value::Number(n) => {
                        map.insert(key, n.to_string());
                    }
                    _ => {}
                }
            }
        }
        Ok(map)
    }

    fn write_tags(&self, path: &Path, tags: &[(&str, &str)]) -> Result<()> {
        // Save, write, restore: the write must not disturb mtime.
        let mtime = std::fs::metadata(path)?.modified()?;

        let mut cmd = Command::new(&self.command);
        for (tag, value) in tags {
            cmd.arg(format!("-{tag}={value}"));
        }
        cmd.arg("-overwrite_original").arg(path);

        let output = cmd
            .output()
            .map_err(|e| Self::metadata_err(path, format!("failed to run {}: {e}", self.command)))?;
        if !output.status.success() {
            return Err(Self::metadata_err(
                path,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let file = OpenOptions::new().append(true).open(path)?;
        file.set_modified(mtime)?;
        Ok(())
    }
}
