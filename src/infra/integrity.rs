// ============================================================
// Layer 6 — Input Integrity
// ============================================================
// Verifies a SHA-256 checksum over a raw input file before the
// pipeline parses it. A mismatch almost always means a damaged
// or truncated download, and catching it here beats debugging a
// mysteriously shrunken dataset three steps later.
//
// Files are hashed in 8 KiB chunks so a multi-gigabyte corpus
// never has to fit in memory.
//
// Reference: Rust Book §12 (I/O and File Handling)
//            sha2 crate documentation

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::errors::{PipelineError, PipelineResult};

/// Compute the lowercase hex SHA-256 digest of a file.
pub fn sha256_file(path: &Path) -> PipelineResult<String> {
    let mut file   = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf    = [0u8; 8192];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify a file against an expected digest, case-insensitively.
/// Fails with ChecksumMismatch — fatal to the run.
pub fn verify_sha256(path: &Path, expected: &str) -> PipelineResult<()> {
    let actual = sha256_file(path)?;
    if actual != expected.to_lowercase() {
        return Err(PipelineError::ChecksumMismatch {
            path:     path.display().to_string(),
            expected: expected.to_lowercase(),
            actual,
        });
    }
    tracing::debug!("Checksum verified for '{}'", path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // SHA-256 of the three bytes "abc" — a published test vector
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_known_digest() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        assert_eq!(sha256_file(file.path()).unwrap(), ABC_SHA256);
    }

    #[test]
    fn test_verify_accepts_uppercase_expected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        assert!(verify_sha256(file.path(), &ABC_SHA256.to_uppercase()).is_ok());
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abcd").unwrap();
        let err = verify_sha256(file.path(), ABC_SHA256).unwrap_err();
        assert!(matches!(err, PipelineError::ChecksumMismatch { .. }));
    }
}
