// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimum-strength rule for new master passwords.

use coffer_config::model::{MIN_PASSWORD_LENGTH_FLOOR, PolicyConfig};
use coffer_core::CofferError;

/// Length rule applied to every new master password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH_FLOOR,
        }
    }
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.min_password_length)
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Length is counted in characters, not bytes.
    pub fn check(&self, password: &str) -> Result<(), CofferError> {
        if password.chars().count() < self.min_length {
            return Err(CofferError::WeakPassword {
                min_length: self.min_length,
            });
        }
        Ok(())
    }
}
