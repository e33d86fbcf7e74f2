//! Password digests and bearer tokens.
//!
//! A credential is the SHA-256 digest of the password concatenated with a
//! per-user random salt, base64-encoded. The bearer token is an opaque
//! random secret issued once at signup; it carries no claims and never
//! expires.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

// 16 hex chars of salt, 64 of token.
const SALT_BYTES: usize = 8;
const TOKEN_BYTES: usize = 32;

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Constant-time comparison of the recomputed digest against the stored one.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let candidate = hash_password(password, salt);
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

pub fn generate_salt() -> String {
    random_hex(SALT_BYTES)
}

pub fn generate_token() -> String {
    random_hex(TOKEN_BYTES)
}

fn random_hex(len: usize) -> String {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
