//! Webhook secret issuance and comparison.
//!
//! Telegram echoes the secret in `X-Telegram-Bot-Api-Secret-Token` on every
//! delivery. It accepts 1-256 characters from `A-Z`, `a-z`, `0-9`, `_` and
//! `-`, so the random bytes are hex encoded.

use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind each webhook secret.
pub const SECRET_BYTES: usize = 32;

/// Generate a fresh webhook secret from the operating system RNG.
pub fn generate_webhook_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time string comparison to prevent timing attacks.
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    let (a, b) = (expected.as_bytes(), provided.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
