// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master-password rotation with rollback.
//!
//! The protocol moves through `VerifyOld -> Reencrypt -> Commit` and ends in
//! `Success` or `RolledBack`. A failure before `Commit` leaves the protocol in
//! the phase that failed and the container untouched.

use coffer_core::{CofferError, RecordSet};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, warn};

use crate::policy::PasswordPolicy;
use crate::store::{VaultStore, open_container, seal_container};

/// Phase of a [`RotationProtocol`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Pending,
    VerifyOld,
    Reencrypt,
    Commit,
    Success,
    RolledBack,
}

/// One rotation attempt against a store.
#[derive(Debug)]
pub struct RotationProtocol<'a> {
    store: &'a VaultStore,
    policy: PasswordPolicy,
    state: RotationState,
}

impl<'a> RotationProtocol<'a> {
    pub fn new(store: &'a VaultStore, policy: PasswordPolicy) -> Self {
        Self {
            store,
            policy,
            state: RotationState::Pending,
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Re-encrypt every record under `new_password`.
    ///
    /// Returns the records that were re-encrypted. Errors:
    /// - `WeakPassword` before any key derivation; nothing is read or written.
    /// - `NotFound` / `WrongPasswordOrCorrupt` from verifying the old password.
    /// - `Io` when the commit fails; the original bytes have been restored.
    pub fn run(
        &mut self,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<RecordSet, CofferError> {
        self.policy.check(new_password.expose_secret())?;

        self.state = RotationState::VerifyOld;
        let original = self.store.read_container()?;
        let records = open_container(&original, old_password)?;
        debug!(records = records.len(), "old master password verified");

        self.state = RotationState::Reencrypt;
        let rotated = seal_container(&records, new_password)?;

        self.state = RotationState::Commit;
        match self.store.commit(&rotated) {
            Ok(()) => {
                self.state = RotationState::Success;
                info!(records = records.len(), "master password rotated");
                Ok(records)
            }
            Err(commit_err) => {
                warn!(error = %commit_err, "rotation commit failed, restoring original container");
                if let Err(restore_err) = self.store.commit(&original) {
                    error!(
                        error = %restore_err,
                        location = %self.store.location(),
                        "failed to restore original container after rotation failure"
                    );
                }
                self.state = RotationState::RolledBack;
                Err(into_io(commit_err))
            }
        }
    }
}

fn into_io(err: CofferError) -> CofferError {
    match err {
        CofferError::Io { .. } => err,
        other => CofferError::io(
            "committing rotated container",
            std::io::Error::other(other.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn password(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn successful_rotation_ends_in_success() {
        let dir = tempdir().unwrap();
        let store = VaultStore::open_file(dir.path().join("secrets.dat"));
        store.save(&RecordSet::new(), &password("old-pw")).unwrap();

        let mut protocol = RotationProtocol::new(&store, PasswordPolicy::default());
        assert_eq!(protocol.state(), RotationState::Pending);
        protocol.run(&password("old-pw"), &password("new-pw")).unwrap();
        assert_eq!(protocol.state(), RotationState::Success);
        assert!(store.load(&password("new-pw")).is_ok());
    }

    #[test]
    fn weak_password_fails_before_verification() {
        let dir = tempdir().unwrap();
        let store = VaultStore::open_file(dir.path().join("secrets.dat"));

        let mut protocol = RotationProtocol::new(&store, PasswordPolicy::default());
        // No container exists; the policy check must come first.
        let err = protocol.run(&password("old-pw"), &password("abc")).unwrap_err();
        assert!(matches!(err, CofferError::WeakPassword { min_length: 4 }));
        assert_eq!(protocol.state(), RotationState::Pending);
    }

    #[test]
    fn wrong_old_password_stops_at_verify() {
        let dir = tempdir().unwrap();
        let store = VaultStore::open_file(dir.path().join("secrets.dat"));
        store.save(&RecordSet::new(), &password("old-pw")).unwrap();

        let mut protocol = RotationProtocol::new(&store, PasswordPolicy::default());
        let err = protocol.run(&password("nope"), &password("new-pw")).unwrap_err();
        assert!(matches!(err, CofferError::WrongPasswordOrCorrupt));
        assert_eq!(protocol.state(), RotationState::VerifyOld);
    }

    #[test]
    fn non_io_commit_errors_become_io() {
        let err = into_io(CofferError::Internal("disk gremlin".into()));
        match err {
            CofferError::Io { source, .. } => assert!(source.to_string().contains("gremlin")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
