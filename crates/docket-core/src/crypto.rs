//! Salted hashing and random string generation.
//!
//! Passwords are stored as `hash_string(password, iv)` next to the per-user
//! `iv`. The hash is HMAC-SHA256 keyed by the iv, hex encoded, so the same
//! password and iv always produce the same 64 character digest.

use hmac::{Hmac, Mac};
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of the iv generated for new accounts.
pub const IV_LENGTH: usize = 16;

/// Returns a random alphanumeric string of exactly `length` characters drawn
/// from the operating system's CSPRNG.
pub fn get_random_string(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn keyed(salt: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts keys of any length")
}

/// Hashes `plaintext` with `salt`. Deterministic and one-way.
pub fn hash_string(plaintext: &str, salt: &str) -> String {
    let mut mac = keyed(salt);
    mac.update(plaintext.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `plaintext` against a stored hash in constant time.
///
/// A stored value that is not valid hex never matches.
pub fn verify_hash(plaintext: &str, salt: &str, expected: &str) -> bool {
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };

    let mut mac = keyed(salt);
    mac.update(plaintext.as_bytes());
    mac.verify_slice(&expected).is_ok()
}
