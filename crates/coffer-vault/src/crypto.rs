// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! The nonce is the full 16-byte per-save salt, so GCM runs with a 128-bit
//! nonce (GHASH-derived counter block) rather than the usual 96 bits. Since
//! the key is derived from that same salt each (key, nonce) pair seals
//! exactly one payload.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};
use coffer_core::CofferError;
use zeroize::Zeroizing;

use crate::kdf::KEY_LEN;

/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm128 = AesGcm<Aes256, U16>;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 16;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

fn cipher(key: &[u8; KEY_LEN]) -> Result<Aes256Gcm128, CofferError> {
    Aes256Gcm128::new_from_slice(key)
        .map_err(|_| CofferError::Crypto("failed to create AES-256-GCM key".to_string()))
}

/// Encrypt `plaintext`, returning `ciphertext || tag`.
pub fn seal(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CofferError> {
    cipher(key)?
        .encrypt(Nonce::<U16>::from_slice(nonce), plaintext)
        .map_err(|_| CofferError::Crypto("AES-256-GCM encryption failed".to_string()))
}

/// Decrypt `ciphertext || tag`.
///
/// Any tag mismatch or truncation is [`CofferError::Authentication`]; no
/// partial plaintext is returned.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CofferError> {
    if ciphertext.len() < TAG_LEN {
        return Err(CofferError::Authentication);
    }
    let cipher = cipher(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place(Nonce::<U16>::from_slice(nonce), b"", &mut *in_out)
        .map_err(|_| CofferError::Authentication)?;
    Ok(in_out)
}
