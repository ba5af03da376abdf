// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Coffer vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Coffer configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CofferConfig {
    /// Front-end behavior settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Vault container settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Master password policy.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Front-end behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Vault container configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Path to the encrypted vault file.
    #[serde(default = "default_vault_path")]
    pub path: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_path(),
        }
    }
}

impl VaultConfig {
    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

fn default_vault_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("coffer").join("secrets.dat"))
        .unwrap_or_else(|| PathBuf::from("secrets.dat"))
        .to_string_lossy()
        .into_owned()
}

/// Master password policy, enforced at the front-end boundary.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Minimum length, in characters, of a new master password.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
        }
    }
}

/// Lowest value `policy.min_password_length` may be configured to.
pub const MIN_PASSWORD_LENGTH_FLOOR: usize = 4;

fn default_min_password_length() -> usize {
    MIN_PASSWORD_LENGTH_FLOOR
}
