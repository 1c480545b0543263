//! SHA-256 fingerprinting of local files.
//!
//! Files are streamed in 1 MiB chunks so large source archives never have to
//! fit in memory.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read size per chunk fed into the hasher.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Default file hashed by `llvm-prep checksum` when no path is given.
pub const DEFAULT_CHECKSUM_PATH: &str = "llvm.zip";

/// Compute SHA-256 of everything `reader` yields and return it as lowercase hex.
pub fn sha256_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).context("read")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    sha256_reader(f).with_context(|| format!("hash {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    fn reference_digest(content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let f = file_with(b"hello\n");
        assert_eq!(
            sha256_path(f.path()).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn sha256_path_exactly_one_chunk() {
        let content: Vec<u8> = (0u8..=250).cycle().take(CHUNK_SIZE).collect();
        let f = file_with(&content);
        assert_eq!(sha256_path(f.path()).unwrap(), reference_digest(&content));
    }

    #[test]
    fn sha256_path_spans_several_chunks() {
        let content: Vec<u8> = (0u8..=250).cycle().take(2 * CHUNK_SIZE + 17).collect();
        let f = file_with(&content);
        assert_eq!(sha256_path(f.path()).unwrap(), reference_digest(&content));
    }

    #[test]
    fn sha256_reader_matches_path() {
        let content = b"llvm-project source snapshot";
        let f = file_with(content);
        assert_eq!(
            sha256_reader(&content[..]).unwrap(),
            sha256_path(f.path()).unwrap()
        );
    }

    #[test]
    fn sha256_path_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("llvm.zip");
        let err = sha256_path(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("llvm.zip"));
    }
}
