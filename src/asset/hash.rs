//! Content hashing for cache-busting file names.
//!
//! Names embed the first [`HASH_LEN`] hex digits of the blake3 hash of the
//! final bytes, so identical inputs always produce identical names.

/// Hex digits kept in a hashed file name.
pub const HASH_LEN: usize = 20;

/// Truncated hex blake3 hash of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = blake3::hash(bytes);
    let mut hex = hex::encode(digest.as_bytes());
    hex.truncate(HASH_LEN);
    hex
}

/// `<hash>.<ext>` for the given bytes.
pub fn hashed_name(bytes: &[u8], ext: &str) -> String {
    format!("{}.{ext}", content_hash(bytes))
}
