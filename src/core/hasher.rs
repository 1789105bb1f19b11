//! Content fingerprints for change detection

use sha2::{Digest, Sha256};

/// SHA-256 of `content`, lowercase hex
pub fn hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Fingerprint of a string's UTF-8 bytes
pub fn hash_str(content: &str) -> String {
    hash(content.as_bytes())
}
