//! # Fingerprint Module
//!
//! Computes content fingerprints for audio files.
//!
//! ## How It Works
//! 1. Read the whole file
//! 2. Strip ID3 tag blocks so metadata edits don't change identity
//! 3. MD5 the remaining payload
//! 4. Pair the digest with the file's creation time
//!
//! The computation sits behind [`FingerprintComputer`] so the worker pool can
//! run any implementation (tests use deterministic fakes).

mod tags;

pub use tags::strip_tags;

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, Metadata};
use std::path::Path;
use std::time::SystemTime;

/// 128-bit content fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Lowercase hexadecimal form
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Result of fingerprinting one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintData {
    /// Creation time of the file
    pub time: SystemTime,
    /// Fingerprint of the tag-stripped payload
    pub fingerprint: Fingerprint,
}

/// Anything that can fingerprint a file.
///
/// Implementations run on worker threads, one file at a time per worker.
pub trait FingerprintComputer: Send + Sync {
    fn compute(&self, path: &Path) -> Result<FingerprintData, FingerprintError>;
}

/// Default computer: MD5 over the tag-stripped file contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Fingerprinter;

impl Md5Fingerprinter {
    pub fn new() -> Self {
        Self
    }
}

impl FingerprintComputer for Md5Fingerprinter {
    fn compute(&self, path: &Path) -> Result<FingerprintData, FingerprintError> {
        let metadata = fs::metadata(path)
            .map_err(|source| FingerprintError::from_io(path.to_path_buf(), source))?;
        let time = creation_time(path, &metadata)?;

        let data =
            fs::read(path).map_err(|source| FingerprintError::from_io(path.to_path_buf(), source))?;

        Ok(FingerprintData {
            time,
            fingerprint: fingerprint_bytes(&data),
        })
    }
}

/// Fingerprint an in-memory file image.
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    let payload = strip_tags(data);
    Fingerprint(md5::compute(&*payload).0)
}

/// Creation time, or modification time on filesystems that don't record one.
fn creation_time(path: &Path, metadata: &Metadata) -> Result<SystemTime, FingerprintError> {
    match metadata.created() {
        Ok(time) => Ok(time),
        Err(unsupported) => {
            tracing::debug!(
                "No creation time for {} ({}), using modification time",
                path.display(),
                unsupported
            );
            metadata
                .modified()
                .map_err(|source| FingerprintError::Metadata {
                    path: path.to_path_buf(),
                    source,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tags::tests::{id3v1_tag, id3v2_tag};
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn tagged(title: &[u8], audio: &[u8]) -> Vec<u8> {
        let mut data = id3v2_tag(title);
        data.extend_from_slice(audio);
        data
    }

    #[test]
    fn fingerprint_ignores_tag_content() {
        let a = tagged(b"TIT2 Original Title", b"same audio frames");
        let b = tagged(b"TIT2 A much longer retagged title", b"same audio frames");
        assert_ne!(a, b);
        assert_eq!(fingerprint_bytes(&a), fingerprint_bytes(&b));
    }

    #[test]
    fn fingerprint_ignores_id3v1_trailer() {
        let mut a = b"same audio frames".to_vec();
        let b = a.clone();
        a.extend_from_slice(&id3v1_tag("Title"));
        assert_eq!(fingerprint_bytes(&a), fingerprint_bytes(&b));
    }

    #[test]
    fn fingerprint_differs_for_different_audio() {
        let a = tagged(b"TIT2 Title", b"first track");
        let b = tagged(b"TIT2 Title", b"second track");
        assert_ne!(fingerprint_bytes(&a), fingerprint_bytes(&b));
    }

    #[test]
    fn fingerprint_of_untagged_data_is_plain_md5() {
        let fingerprint = fingerprint_bytes(b"");
        assert_eq!(fingerprint.to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn display_matches_hex() {
        let fingerprint = Fingerprint::from_bytes([0xab; 16]);
        assert_eq!(fingerprint.to_string(), "ab".repeat(16));
    }

    #[test]
    fn md5_fingerprinter_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("track.mp3");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&tagged(b"TIT2 Title", b"audio")).unwrap();
        drop(file);

        let data = Md5Fingerprinter::new().compute(&path).unwrap();
        assert_eq!(data.fingerprint, fingerprint_bytes(b"audio"));
    }

    #[test]
    fn md5_fingerprinter_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.mp3");

        let error = Md5Fingerprinter::new().compute(&path).unwrap_err();
        assert!(matches!(error, FingerprintError::NotFound { .. }));
    }
}
