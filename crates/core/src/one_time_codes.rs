//! One-time passcodes and password-reset tokens.
//!
//! Only SHA-256 digests are persisted; the plaintext is delivered to the
//! user once and never stored.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of digits in an email verification code.
pub const OTP_LENGTH: usize = 6;

/// Minutes an email verification code stays valid.
pub const OTP_TTL_MINS: i64 = 10;

/// Length of a password-reset token (alphanumeric characters).
pub const RESET_TOKEN_LENGTH: usize = 40;

/// Minutes a password-reset token stays valid.
pub const RESET_TOKEN_TTL_MINS: i64 = 60;

/// A freshly generated secret and the digest to store.
pub struct GeneratedSecret {
    pub plaintext: String,
    pub hash: String,
}

/// Generate a zero-padded numeric verification code.
pub fn generate_otp() -> GeneratedSecret {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    let plaintext = format!("{code:0width$}", width = OTP_LENGTH);
    let hash = hash_secret(&plaintext);
    GeneratedSecret { plaintext, hash }
}

/// Generate a random alphanumeric password-reset token.
pub fn generate_reset_token() -> GeneratedSecret {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_secret(&plaintext);
    GeneratedSecret { plaintext, hash }
}

/// SHA-256 hex digest of a secret.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether `candidate` hashes to `stored_hash`.
pub fn secret_matches(candidate: &str, stored_hash: &str) -> bool {
    hash_secret(candidate) == stored_hash
}
