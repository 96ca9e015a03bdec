//! Vault stream cipher and PIN digest
//!
//! The vault format uses a repeating-key XOR stream keyed by the PIN's UTF-8
//! bytes. This is deliberately weak: no IV, no authentication, ciphertext
//! length equals plaintext length. Existing vaults were written in this
//! format, so `apply` must reproduce it exactly; do not strengthen it here.
//! A future migration to an AEAD cipher and a salted password hash touches
//! only this module.

use sha2::{Digest, Sha256};

/// Required PIN length in digits
pub const PIN_LENGTH: usize = 5;

/// Apply the XOR keystream to `data`.
///
/// Symmetric: applying twice with the same key returns the original bytes.
/// Empty `data` or an empty `key` is a no-op, not an error.
pub fn apply(data: &[u8], key: &str) -> Vec<u8> {
    let key = key.as_bytes();
    if data.is_empty() || key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .enumerate()
        .map(|(i, &b)| b ^ key[i % key.len()])
        .collect()
}

/// Hash a PIN with SHA-256, rendered as lowercase hex.
pub fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

/// Verify a candidate PIN against a stored hash.
///
/// Returns false on empty inputs rather than erroring.
pub fn verify_pin(candidate: &str, stored_hash: &str) -> bool {
    if candidate.is_empty() || stored_hash.is_empty() {
        return false;
    }
    hash_pin(candidate) == stored_hash
}

/// Validate PIN format: exactly [`PIN_LENGTH`] ASCII digits.
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit())
}
