use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{AppError, AppResult};

const VERSION_PREFIX: &str = "v1";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 120_000;

/// Salted PBKDF2-HMAC-SHA256 hash in the form `v1:<salt>:<hash>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt);
    format!(
        "{VERSION_PREFIX}:{}:{}",
        Base64.encode(salt),
        Base64.encode(key)
    )
}

pub fn verify_password(password: &str, stored: &str) -> AppResult<bool> {
    let mut parts = stored.splitn(3, ':');
    let (Some(version), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(AppError::other("stored password hash is malformed"));
    };
    if version != VERSION_PREFIX {
        return Err(AppError::other(format!(
            "unsupported password hash version: {version}"
        )));
    }

    let salt = Base64
        .decode(salt)
        .map_err(|err| AppError::other(format!("invalid password salt: {err}")))?;
    let expected = Base64
        .decode(expected)
        .map_err(|err| AppError::other(format!("invalid password hash: {err}")))?;

    let actual = derive_key(password, &salt);
    Ok(constant_time_eq(&actual, &expected))
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
