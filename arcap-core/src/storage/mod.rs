pub mod catalog;
pub mod json_document;

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::error::RecordError;

/// Compute the SHA-256 hex digest of a file.
pub fn sha256_file(path: &Path) -> Result<String, RecordError> {
    let data = fs::read(path)
        .map_err(|e| RecordError::StorageError(format!("failed to read file for checksum: {e}")))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_hex_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");
        fs::write(&path, b"[]").unwrap();

        let checksum = sha256_file(&path).unwrap();
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
