use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata output parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The metadata capability could not be invoked for a file. Callers
    /// degrade to processing without metadata.
    #[error("metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// The input root does not exist or is not a directory. The one fatal
    /// error: nothing has been touched yet, so the run aborts.
    #[error("input directory does not exist: {0}")]
    InputRootMissing(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            std::fs::metadata("/definitely/not/here")?;
            Ok(())
        }
        assert!(matches!(fails(), Err(Error::Io(_))));
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::InputRootMissing(PathBuf::from("/photos/inbox"));
        assert!(err.to_string().contains("/photos/inbox"));
    }
}
