// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./coffer.toml` > `~/.config/coffer/coffer.toml` > `/etc/coffer/coffer.toml`
//! with environment variable overrides via `COFFER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CofferConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/coffer/coffer.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "coffer.toml";

/// `COFFER_*` variables that carry passwords rather than configuration.
const PASSWORD_ENV_KEYS: &[&str] = &["master_password", "new_master_password"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/coffer/coffer.toml` (system-wide)
/// 3. `~/.config/coffer/coffer.toml` (user XDG config)
/// 4. `./coffer.toml` (local directory)
/// 5. `COFFER_*` environment variables
pub fn load_config() -> Result<CofferConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CofferConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CofferConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("coffer").join(LOCAL_CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `COFFER_POLICY_MIN_PASSWORD_LENGTH` must map to
/// `policy.min_password_length`, not `policy.min.password.length`.
///
/// `COFFER_MASTER_PASSWORD` and `COFFER_NEW_MASTER_PASSWORD` are read by the
/// password prompt, never by config, and are filtered out here so they cannot
/// trip `deny_unknown_fields`.
fn env_provider() -> Env {
    Env::prefixed("COFFER_")
        .filter(|key| {
            !PASSWORD_ENV_KEYS
                .iter()
                .any(|reserved| key.as_str().eq_ignore_ascii_case(reserved))
        })
        .map(|key| {
            // `key` is the env var name with prefix stripped; case is normalised here.
            // Example: COFFER_VAULT_PATH -> "vault_path" -> "vault.path"
            let key_str = key.as_str().to_ascii_lowercase();
            let mapped = key_str
                .replacen("app_", "app.", 1)
                .replacen("vault_", "vault.", 1)
                .replacen("policy_", "policy.", 1);
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_map_to_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("COFFER_VAULT_PATH", "/tmp/jail/secrets.dat");
            jail.set_env("COFFER_POLICY_MIN_PASSWORD_LENGTH", "12");
            jail.set_env("COFFER_APP_LOG_LEVEL", "debug");

            let config = load_config()?;
            assert_eq!(config.vault.path, "/tmp/jail/secrets.dat");
            assert_eq!(config.policy.min_password_length, 12);
            assert_eq!(config.app.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn master_password_env_var_is_not_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("COFFER_MASTER_PASSWORD", "hunter22");
            jail.set_env("COFFER_NEW_MASTER_PASSWORD", "hunter23");

            let config = load_config()?;
            assert_eq!(config.policy.min_password_length, 4);
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
[vault]
path = "team.dat"
"#,
            )?;

            let config = load_config()?;
            assert_eq!(config.vault.path, "team.dat");
            assert_eq!(config.app.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[policy]\nmin_password_length = 8\n")?;

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.policy.min_password_length, 8);
            Ok(())
        });
    }
}
