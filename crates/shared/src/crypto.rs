//! Hashing helpers for uploaded content.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Builds a content-addressed object name: the first 32 hex chars of the
/// SHA-256 digest plus the given extension.
pub fn content_object_name(content: &[u8], extension: &str) -> String {
    let digest = sha256_hex(content);
    let ext = extension.trim_start_matches('.');
    if ext.is_empty() {
        digest[..32].to_string()
    } else {
        format!("{}.{}", &digest[..32], ext)
    }
}
