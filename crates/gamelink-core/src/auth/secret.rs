use rand::RngCore;
use sha2::{Digest, Sha256};

/// How many leading hex chars of a secret are kept for display and audit.
pub const PREFIX_LEN: usize = 8;

/// Generate an opaque token secret: `len_bytes` bytes from the OS-seeded
/// CSPRNG, hex-encoded (twice as many characters).
pub fn generate_secret(len_bytes: usize) -> String {
    let mut bytes = vec![0u8; len_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hash a secret for safe database storage.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Non-reversible prefix of a secret, safe to show and log.
pub fn secret_prefix(secret: &str) -> String {
    secret.chars().take(PREFIX_LEN).collect()
}
