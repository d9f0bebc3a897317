/*
 * Responsibility
 * - パスワードの salted digest 化と照合 (login の CheckPassword 相当)
 * - 保存形式: "<salt hex>$<sha256(salt || raw) hex>"
 */
use sha2::{Digest, Sha256};
use thiserror::Error;

const SALT_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("system entropy unavailable")]
    Entropy,
}

fn digest(salt: &[u8], raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_password(raw: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt).map_err(|_| PasswordError::Entropy)?;
    Ok(format!("{}${}", hex::encode(salt), digest(&salt, raw)))
}

/// Check a raw password against a stored digest. Any malformed stored value
/// fails the check instead of erroring.
pub fn verify_password(raw: &str, stored: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    digest(&salt, raw) == expected
}
