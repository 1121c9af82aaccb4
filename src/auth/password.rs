//! Argon2 hashing, run on the blocking pool so request tasks keep moving.

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Stand-in hash verified when the login email has no account, so both
    /// failure paths cost one argon2 verification.
    static ref DECOY_HASH: Option<String> = hash_blocking("insightboard-decoy").ok();
}

fn hash_blocking(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow::anyhow!("hash password: {e}")
        })
}

fn verify_blocking(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is not PHC");
        anyhow::anyhow!("parse password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub async fn hash_password(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await
        .context("join hash task")?
}

/// `Ok(false)` on mismatch; `Err` only when `stored` is not a PHC string.
pub async fn verify_password(plain: String, stored: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_blocking(&plain, &stored))
        .await
        .context("join verify task")?
}

/// Spend one verification against the decoy hash and discard the outcome.
pub async fn verify_decoy(plain: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(decoy) = DECOY_HASH.as_deref() {
            let _ = verify_blocking(&plain, decoy);
        }
    })
    .await;
}
