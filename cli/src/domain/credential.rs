//! Admin password hashing in Magento's `hash:salt:version` format.
//!
//! Version 1 is `sha256(salt . password)` with a 32-character salt. The salt
//! generator mirrors Magento's: each character comes from an 8-byte random
//! draw reduced modulo `alphabet length - 1`, so the last alphabet symbol is
//! never drawn. The verifier only checks the stored hash, but the salt
//! alphabet must stay within `[a-zA-Z0-9]`.

use std::fmt;

use anyhow::{Context, Result};
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

pub const SALT_LENGTH: usize = 32;
pub const HASH_VERSION: u32 = 1;
pub const SALT_ALPHABET: &[u8; 62] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A hashed admin password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Lowercase hex SHA-256 digest.
    pub hash: String,
    pub salt: String,
    pub version: u32,
}

impl Credential {
    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS entropy source is unavailable.
    pub fn generate(password: &str) -> Result<Self> {
        let mut draws = [0u64; SALT_LENGTH];
        for draw in &mut draws {
            let mut bytes = [0u8; 8];
            OsRng
                .try_fill_bytes(&mut bytes)
                .context("os entropy source unavailable")?;
            *draw = u64::from_be_bytes(bytes);
        }
        Ok(Self::with_salt(&salt_from_draws(draws), password))
    }

    /// Hash `password` with a known salt.
    #[must_use]
    pub fn with_salt(salt: &str, password: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        Self {
            hash: hex_encode(&hasher.finalize()),
            salt: salt.to_string(),
            version: HASH_VERSION,
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hash, self.salt, self.version)
    }
}

/// Map random draws onto the salt alphabet.
///
/// A draw is read as a signed 64-bit integer and its absolute value reduced
/// modulo 61, exactly as Magento's generator does on 64-bit builds.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn salt_from_draws(draws: impl IntoIterator<Item = u64>) -> String {
    let modulus = (SALT_ALPHABET.len() - 1) as u64;
    draws
        .into_iter()
        .map(|draw| {
            let magnitude = (draw as i64).unsigned_abs();
            char::from(SALT_ALPHABET[(magnitude % modulus) as usize])
        })
        .collect()
}

/// Lowercase hex encoding.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}
