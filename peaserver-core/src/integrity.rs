//! Payload integrity: SHA-256 digest carried alongside every request payload.

use sha2::{Digest, Sha256};

/// Hash a payload. Returns 32-byte digest.
pub fn payload_digest(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.finalize().into()
}

/// Hex form of the payload digest, as carried in the meta section.
pub fn digest_hex(payload: &[u8]) -> String {
    hex::encode(payload_digest(payload))
}

/// Verify a payload against an expected hex digest. Case-insensitive on the
/// expected side; a malformed expected digest never verifies.
pub fn verify_payload(payload: &[u8], expected_hex: &str) -> bool {
    match hex::decode(expected_hex) {
        Ok(expected) => expected.as_slice() == payload_digest(payload),
        Err(_) => false,
    }
}
