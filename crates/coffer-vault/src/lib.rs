// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted record vault for Coffer.
//!
//! The whole record set is encoded as JSON, sealed with AES-256-GCM under a
//! key derived from the master password with PBKDF2-HMAC-SHA256, and written
//! to a single container file. Every save draws a fresh salt.

pub mod codec;
pub mod crypto;
pub mod kdf;
pub mod policy;
pub mod prompt;
pub mod rotation;
pub mod session;
pub mod store;
pub mod transfer;

pub use policy::PasswordPolicy;
pub use prompt::{
    MASTER_PASSWORD_ENV_VAR, NEW_MASTER_PASSWORD_ENV_VAR, get_master_password,
    get_new_password_with_confirm,
};
pub use rotation::{RotationProtocol, RotationState};
pub use session::{ImportReport, VaultSession};
pub use store::{FileBackend, VaultStore};
pub use transfer::{ImportBatch, SkippedEntry, export_json, parse_import, read_import};
