// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Coffer secrets vault.

use thiserror::Error;

/// The primary error type used across the vault engine and its callers.
///
/// The first four variants are the kinds surfaced by `load`, `save` and
/// `rotate`. The remaining variants are raised by inner layers and either
/// folded into one of those kinds or reported by record-management paths.
#[derive(Debug, Error)]
pub enum CofferError {
    /// No vault container exists yet (first run).
    #[error("no vault found at {location}")]
    NotFound { location: String },

    /// Authentication or decoding failed. A wrong master password and a
    /// corrupted container are indistinguishable.
    #[error("wrong master password or corrupted vault")]
    WrongPasswordOrCorrupt,

    /// A new master password does not satisfy the minimum-strength policy.
    #[error("password too weak: at least {min_length} characters required")]
    WeakPassword { min_length: usize },

    /// Filesystem failure while reading, writing, or replacing the container.
    #[error("vault I/O failure while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// AEAD tag mismatch, truncated input, or malformed ciphertext length.
    #[error("authentication failed")]
    Authentication,

    /// The decrypted payload or an import file is not a valid record list.
    #[error("invalid vault payload: {0}")]
    Format(String),

    /// Random number generation or cipher key setup failed.
    #[error("cryptographic failure: {0}")]
    Crypto(String),

    /// A record index does not exist in the current record set.
    #[error("no record at position {index} (vault holds {len})")]
    NoSuchRecord { index: usize, len: usize },

    /// A record failed a structural check (for example an empty name).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The master password could not be obtained or confirmed.
    #[error("master password unavailable: {0}")]
    PasswordInput(String),

    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CofferError {
    /// Wrap an I/O error with a short description of the failed step.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error is the first-run signal rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_password_message_does_not_leak_cause() {
        let msg = CofferError::WrongPasswordOrCorrupt.to_string();
        assert_eq!(msg, "wrong master password or corrupted vault");
    }

    #[test]
    fn io_helper_keeps_source() {
        let err = CofferError::io(
            "replacing container",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("replacing container"));
        assert!(msg.contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn weak_password_reports_minimum() {
        let err = CofferError::WeakPassword { min_length: 4 };
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn not_found_is_first_run_signal() {
        let err = CofferError::NotFound {
            location: "secrets.dat".into(),
        };
        assert!(err.is_not_found());
        assert!(!CofferError::WrongPasswordOrCorrupt.is_not_found());
    }
}
