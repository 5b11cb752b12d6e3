//! Streaming content hashing and byte-exact file comparison.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;

const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 hex digest of a file, read in fixed-size chunks. The whole file
/// is never held in memory. Callers treat a failure as "exclude from
/// duplicate consideration", not "unique".
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Two files are exact duplicates iff sizes match and digests match.
/// Size is compared first as a cheap rejection filter.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let size_a = std::fs::metadata(a)?.len();
    let size_b = std::fs::metadata(b)?.len();
    if size_a != size_b {
        return Ok(false);
    }
    Ok(hash_file(a)? == hash_file(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_hash_file_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.bin");
        fs::write(&path, b"hello world").unwrap();

        let h1 = hash_file(&path).unwrap();
        let h2 = hash_file(&path).unwrap();
        assert_eq!(h1, h2);
        // sha256("hello world")
        assert_eq!(
            h1,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash_file_missing() {
        assert!(hash_file(Path::new("/nonexistent/file.bin")).is_err());
    }

    #[test]
    fn test_files_identical_same_content() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.jpg");
        let b = tmp.path().join("b.jpg");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();
        assert!(files_identical(&a, &b).unwrap());
    }

    #[test]
    fn test_files_identical_size_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.jpg");
        let b = tmp.path().join("b.jpg");
        fs::write(&a, b"short").unwrap();
        fs::write(&b, b"much longer content").unwrap();
        assert!(!files_identical(&a, &b).unwrap());
    }

    #[test]
    fn test_files_identical_same_size_different_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.jpg");
        let b = tmp.path().join("b.jpg");
        fs::write(&a, b"aaaa").unwrap();
        fs::write(&b, b"bbbb").unwrap();
        assert!(!files_identical(&a, &b).unwrap());
    }

    #[test]
    fn test_files_identical_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.jpg");
        fs::write(&a, b"data").unwrap();
        assert!(files_identical(&a, &tmp.path().join("missing.jpg")).is_err());
    }
}
