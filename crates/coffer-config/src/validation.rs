// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths and the password-length floor.

use crate::diagnostic::ConfigError;
use crate::model::{CofferConfig, MIN_PASSWORD_LENGTH_FLOOR};

/// Log levels accepted by `app.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CofferConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.path must not be empty".to_string(),
        });
    }

    if config.vault.path.ends_with('/') || config.vault.path.ends_with('\\') {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.path `{}` names a directory; it must name a file",
                config.vault.path
            ),
        });
    }

    if config.policy.min_password_length < MIN_PASSWORD_LENGTH_FLOOR {
        errors.push(ConfigError::Validation {
            message: format!(
                "policy.min_password_length must be at least {MIN_PASSWORD_LENGTH_FLOOR}, got {}",
                config.policy.min_password_length
            ),
        });
    }

    let level = config.app.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&CofferConfig::default()).is_ok());
    }

    #[test]
    fn empty_vault_path_fails_validation() {
        let mut config = CofferConfig::default();
        config.vault.path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "vault.path"));
    }

    #[test]
    fn directory_vault_path_fails_validation() {
        let mut config = CofferConfig::default();
        config.vault.path = "/var/lib/coffer/".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "directory"));
    }

    #[test]
    fn min_password_length_below_floor_fails() {
        let mut config = CofferConfig::default();
        config.policy.min_password_length = 3;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "min_password_length"));
    }

    #[test]
    fn stricter_policy_passes() {
        let mut config = CofferConfig::default();
        config.policy.min_password_length = 16;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = CofferConfig::default();
        config.app.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log_level"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = CofferConfig::default();
        config.vault.path = String::new();
        config.policy.min_password_length = 0;
        config.app.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
