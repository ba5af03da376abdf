// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or the COFFER_MASTER_PASSWORD
//! environment variable.

use coffer_core::CofferError;
use secrecy::SecretString;
use zeroize::Zeroizing;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "COFFER_MASTER_PASSWORD";

/// The environment variable name for providing the replacement password
/// during rotation.
pub const NEW_MASTER_PASSWORD_ENV_VAR: &str = "COFFER_NEW_MASTER_PASSWORD";

/// Copy into an exactly-sized secret; the source buffer is wiped on drop.
fn into_secret(raw: Zeroizing<String>) -> SecretString {
    SecretString::from(raw.as_str().to_owned())
}

fn from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var).map(Zeroizing::new) {
        Ok(value) if !value.is_empty() => Some(into_secret(value)),
        _ => None,
    }
}

fn read_hidden(prompt: &str) -> Result<Zeroizing<String>, CofferError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map(Zeroizing::new)
        .map_err(|e| CofferError::PasswordInput(format!("failed to read password: {e}")))
}

fn no_source(var: &str) -> CofferError {
    CofferError::PasswordInput(format!(
        "no password provided; set {var} or run interactively"
    ))
}

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `COFFER_MASTER_PASSWORD` (headless use)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_password() -> Result<SecretString, CofferError> {
    if let Some(password) = from_env(MASTER_PASSWORD_ENV_VAR) {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let password = read_hidden("Master password: ")?;
        return Ok(into_secret(password));
    }

    Err(no_source(MASTER_PASSWORD_ENV_VAR))
}

/// Get a new password, prompting twice and requiring both entries to match.
///
/// `env_var` is checked first and needs no confirmation. Rotation passes
/// [`NEW_MASTER_PASSWORD_ENV_VAR`] so the old password is never reused as the
/// new one by accident.
pub fn get_new_password_with_confirm(env_var: &str) -> Result<SecretString, CofferError> {
    if let Some(password) = from_env(env_var) {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = read_hidden("New master password: ")?;
        let second = read_hidden("Confirm master password: ")?;
        if first != second {
            return Err(CofferError::PasswordInput("passwords do not match".to_string()));
        }
        return Ok(into_secret(first));
    }

    Err(no_source(env_var))
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use serial_test::serial;

    use super::*;

    #[test]
    fn prompted_input_is_held_in_zeroizing_buffers() {
        let _: fn(&str) -> Result<Zeroizing<String>, CofferError> = read_hidden;
        let secret = into_secret(Zeroizing::new("correct-horse".to_string()));
        assert_eq!(secret.expose_secret(), "correct-horse");
    }

    #[test]
    #[serial]
    fn get_password_from_env_var() {
        // SAFETY: test-only env mutation, serialized with #[serial].
        unsafe { std::env::set_var(MASTER_PASSWORD_ENV_VAR, "correct-horse") };
        let result = get_master_password();
        unsafe { std::env::remove_var(MASTER_PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "correct-horse");
    }

    #[test]
    #[serial]
    fn new_password_reads_its_own_env_var() {
        unsafe { std::env::set_var(MASTER_PASSWORD_ENV_VAR, "correct-horse") };
        unsafe { std::env::set_var(NEW_MASTER_PASSWORD_ENV_VAR, "battery-staple") };
        let result = get_new_password_with_confirm(NEW_MASTER_PASSWORD_ENV_VAR);
        unsafe { std::env::remove_var(NEW_MASTER_PASSWORD_ENV_VAR) };
        unsafe { std::env::remove_var(MASTER_PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "battery-staple");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(MASTER_PASSWORD_ENV_VAR, "") };
        // In CI/test, stdin is not a terminal, so this will fail.
        let result = get_master_password();
        unsafe { std::env::remove_var(MASTER_PASSWORD_ENV_VAR) };

        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            assert!(matches!(result, Err(CofferError::PasswordInput(_))));
        }
    }
}
