//! Content fingerprints for cache keys
//!
//! A fingerprint identifies the bytes of a file at one point in time. Only the
//! content hash takes part in cache lookups; path, size and modification time
//! travel along as metadata.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Content hash plus stat metadata for a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Path the file was read from
    pub path: PathBuf,

    /// SHA-256 hex digest of the full file content (empty for the sentinel)
    #[serde(rename = "hash")]
    pub content_hash: String,

    /// File size in bytes
    #[serde(rename = "size")]
    pub byte_size: u64,

    /// Modification time as seconds since the unix epoch
    pub modified_time: f64,
}

impl Fingerprint {
    /// Sentinel returned when the file cannot be read
    pub fn unreadable<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            content_hash: String::new(),
            byte_size: 0,
            modified_time: 0.0,
        }
    }

    /// True for the sentinel produced by an I/O failure
    pub fn is_unreadable(&self) -> bool {
        self.content_hash.is_empty()
    }
}

/// Computes fingerprints from file content
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFingerprinter;

impl FileFingerprinter {
    /// Fingerprint a file, falling back to the sentinel on any I/O error
    pub fn compute_fingerprint<P: AsRef<Path>>(path: P) -> Fingerprint {
        let path = path.as_ref();

        match Self::try_compute(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                tracing::debug!("Cannot fingerprint {}: {}", path.display(), e);
                Fingerprint::unreadable(path)
            }
        }
    }

    fn try_compute(path: &Path) -> std::io::Result<Fingerprint> {
        let content = std::fs::read(path)?;
        let metadata = std::fs::metadata(path)?;

        let modified_time = metadata
            .modified()
            .ok()
            .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        Ok(Fingerprint {
            path: path.to_path_buf(),
            content_hash: hash_bytes(&content),
            byte_size: metadata.len(),
            modified_time,
        })
    }
}

/// SHA-256 hex digest of a byte slice
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_ignores_path_and_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("original.py");
        fs::write(&original, "print('hello')\n").unwrap();
        let before = FileFingerprinter::compute_fingerprint(&original);

        let renamed = temp_dir.path().join("renamed.py");
        fs::rename(&original, &renamed).unwrap();
        // Rewriting identical bytes bumps the mtime but not the content
        fs::write(&renamed, "print('hello')\n").unwrap();
        let after = FileFingerprinter::compute_fingerprint(&renamed);

        assert_eq!(before.content_hash, after.content_hash);
        assert_ne!(before.path, after.path);
        assert_eq!(after.byte_size, 15);
    }

    #[test]
    fn test_single_byte_change_changes_hash() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data.bin");
        fs::write(&file, [0u8, 1, 2, 3]).unwrap();
        let first = FileFingerprinter::compute_fingerprint(&file);

        fs::write(&file, [0u8, 1, 2, 4]).unwrap();
        let second = FileFingerprinter::compute_fingerprint(&file);

        assert_ne!(first.content_hash, second.content_hash);
        assert_eq!(first.content_hash.len(), 64);
    }

    #[test]
    fn test_missing_file_yields_sentinel() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.txt");

        let fingerprint = FileFingerprinter::compute_fingerprint(&missing);

        assert!(fingerprint.is_unreadable());
        assert_eq!(fingerprint.content_hash, "");
        assert_eq!(fingerprint.byte_size, 0);
        assert_eq!(fingerprint.modified_time, 0.0);
        assert_eq!(fingerprint.path, missing);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_bytes(b"a"),
            "ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb"
        );
    }
}
