//! Keyed hashes for links sent by email.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derives the unsubscribe token for a newsletter address.
///
/// The address is lowercased first so the token survives case changes made
/// by mail clients.
pub fn unsubscribe_token(secret: &str, email: &str) -> Option<String> {
    let mac = keyed_mac(secret, email)?;
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies an unsubscribe token in constant time.
pub fn verify_unsubscribe_token(secret: &str, email: &str, token: &str) -> bool {
    let Ok(expected) = hex::decode(token.trim()) else {
        return false;
    };
    keyed_mac(secret, email).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}

fn keyed_mac(secret: &str, email: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(email.trim().to_lowercase().as_bytes());
    Some(mac)
}
