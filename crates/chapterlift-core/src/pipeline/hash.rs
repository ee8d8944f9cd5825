//! Content hashing for upload deduplication.

use blake3::Hasher as Blake3Hasher;

use crate::types::Fingerprint;

/// Computes content fingerprints.
///
/// Identical bytes give identical fingerprints regardless of file name or
/// path. The fingerprint is only a dedup key, not an integrity check on the
/// remote copy.
pub struct Hasher;

impl Hasher {
    /// Generate a BLAKE3 fingerprint from an in-memory byte buffer.
    ///
    /// The scheduler reads each page once and hashes the buffer it already
    /// holds for the transform.
    pub fn content_hash_from_bytes(data: &[u8]) -> Fingerprint {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        Fingerprint::from_hex(hasher.finalize().to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = Hasher::content_hash_from_bytes(b"page one");
        let b = Hasher::content_hash_from_bytes(b"page one");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_different_bytes_differ() {
        let a = Hasher::content_hash_from_bytes(b"page one");
        let b = Hasher::content_hash_from_bytes(b"page two");
        assert_ne!(a, b);
    }
}
