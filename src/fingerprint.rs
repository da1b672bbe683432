//! Content Hasher
//!
//! Fingerprints correlate a validated share with its reward claim. The
//! growth engine rules compute the same hash independently, so the digest,
//! input bytes and output encoding are a cross-system contract: MD5 over
//! the UTF-8 bytes of the text, lowercase hex. Changing any of these
//! requires bumping [`FINGERPRINT_VERSION`] and a coordinated rollout.

/// Identifies the fingerprint algorithm in emitted verdicts
pub const FINGERPRINT_VERSION: &str = "md5-hex-v1";

/// Length of a fingerprint in hex characters (128-bit digest)
pub const FINGERPRINT_LEN: usize = 32;

/// Hashes the exact bytes of `text`. No trimming or normalization happens
/// here; pass canonical text from `resolve_canonical_text`.
pub fn fingerprint(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}
