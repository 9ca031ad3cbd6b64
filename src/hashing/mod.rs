//! Image fingerprints used to correlate log lines with a payload.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of the given data and returns it as a hex string.
pub fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// First 16 hex digits of the SHA-256 digest. Enough to tell payloads apart in logs.
pub fn short_fingerprint(data: &[u8]) -> String {
    let mut digest = sha256_digest(data);
    digest.truncate(16);
    digest
}
