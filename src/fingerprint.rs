//! Content fingerprinting for change detection.
//!
//! A workflow file is re-analyzed only when its fingerprint differs from the
//! one stored with its record. The fingerprint is opaque; it is only ever
//! compared for equality.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of the full content, as lowercase hex.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Fingerprint a file, returning the hash together with the byte size.
pub fn fingerprint_file(path: &Path) -> Result<(String, i64)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((fingerprint_bytes(&bytes), bytes.len() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // SHA-256 of the empty input
        assert_eq!(
            fingerprint_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_equal_content_equal_fingerprint() {
        assert_eq!(fingerprint_bytes(b"{\"a\":1}"), fingerprint_bytes(b"{\"a\":1}"));
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        assert_ne!(fingerprint_bytes(b"{\"a\":1}"), fingerprint_bytes(b"{\"a\":2}"));
    }

    #[test]
    fn test_file_fingerprint_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wf.json");
        std::fs::write(&path, b"{\"nodes\":[]}").unwrap();

        let (hash, size) = fingerprint_file(&path).unwrap();
        assert_eq!(hash, fingerprint_bytes(b"{\"nodes\":[]}"));
        assert_eq!(size, 12);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(fingerprint_file(std::path::Path::new("/nonexistent/wf.json")).is_err());
    }
}
