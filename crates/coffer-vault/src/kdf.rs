// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from the master password.
//!
//! The container carries no header, so the iteration count is part of the
//! on-disk format and cannot change without breaking existing vaults.

use std::num::NonZeroU32;

use coffer_core::CofferError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Salt length in bytes, stored as the container prefix.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// Derive a 32-byte key from the password and salt.
///
/// Deterministic for a given input. The returned key is wrapped in
/// [`Zeroizing`] so it is wiped on drop.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        salt,
        password,
        key.as_mut(),
    );
    key
}

/// Generate a random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CofferError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| CofferError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}
