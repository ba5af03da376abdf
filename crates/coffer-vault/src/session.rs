// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unlocked vault: one serialized access point for every mutation.
//!
//! Each mutation works on a copy of the record set, persists it, and only
//! then replaces the in-memory state, so a failed save leaves both memory and
//! disk as they were. Key derivation and AEAD run on the blocking pool.

use std::sync::Arc;

use coffer_core::{CofferError, Record, RecordSet};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::policy::PasswordPolicy;
use crate::store::VaultStore;
use crate::transfer;

/// Outcome of [`VaultSession::import`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    /// Names skipped because a record with that name already existed.
    pub duplicates: Vec<String>,
}

struct SessionState {
    records: RecordSet,
    password: Arc<SecretString>,
}

/// An open vault and the master password that unlocked it.
pub struct VaultSession {
    store: VaultStore,
    policy: PasswordPolicy,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, CofferError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CofferError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CofferError::Internal(format!("vault worker task failed: {e}")))?
}

impl VaultSession {
    /// First run: write an empty vault under `password`.
    ///
    /// Refuses to overwrite an existing container.
    pub async fn create(
        store: VaultStore,
        password: SecretString,
        policy: PasswordPolicy,
    ) -> Result<Self, CofferError> {
        policy.check(password.expose_secret())?;
        let password = Arc::new(password);

        let worker_store = store.clone();
        let worker_password = Arc::clone(&password);
        run_blocking(move || {
            if worker_store.exists()? {
                return Err(CofferError::io(
                    "creating vault",
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        format!("{} already exists", worker_store.location()),
                    ),
                ));
            }
            worker_store.save(&RecordSet::new(), &worker_password)
        })
        .await?;

        info!(location = %store.location(), "vault created");
        Ok(Self {
            store,
            policy,
            state: Mutex::new(SessionState {
                records: RecordSet::new(),
                password,
            }),
        })
    }

    /// Unlock an existing vault.
    pub async fn open(store: VaultStore, password: SecretString) -> Result<Self, CofferError> {
        let password = Arc::new(password);
        let worker_store = store.clone();
        let worker_password = Arc::clone(&password);
        let records = run_blocking(move || worker_store.load(&worker_password)).await?;

        debug!(records = records.len(), "vault session opened");
        Ok(Self {
            store,
            policy: PasswordPolicy::default(),
            state: Mutex::new(SessionState { records, password }),
        })
    }

    /// Policy applied by [`rotate`](Self::rotate).
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Snapshot of the current records.
    pub async fn records(&self) -> RecordSet {
        self.state.lock().await.records.clone()
    }

    /// Append a record, returning its index.
    pub async fn add(&self, record: Record) -> Result<usize, CofferError> {
        record.validate()?;
        let mut state = self.state.lock().await;
        let mut next = state.records.clone();
        next.push(record);
        let index = next.len() - 1;

        state.records = self.persist(next, Arc::clone(&state.password)).await?;
        debug!(index, "record added");
        Ok(index)
    }

    /// Replace the record at `index`, returning the previous one.
    pub async fn edit(&self, index: usize, record: Record) -> Result<Record, CofferError> {
        record.validate()?;
        let mut state = self.state.lock().await;
        let mut next = state.records.clone();
        let previous = next.replace(index, record)?;

        state.records = self.persist(next, Arc::clone(&state.password)).await?;
        debug!(index, "record edited");
        Ok(previous)
    }

    /// Remove the record at `index`, returning it.
    pub async fn delete(&self, index: usize) -> Result<Record, CofferError> {
        let mut state = self.state.lock().await;
        let mut next = state.records.clone();
        let removed = next.remove(index)?;

        state.records = self.persist(next, Arc::clone(&state.password)).await?;
        debug!(index, "record deleted");
        Ok(removed)
    }

    /// Merge records by name. Nothing is written when every name is taken.
    pub async fn import(&self, records: Vec<Record>) -> Result<ImportReport, CofferError> {
        for record in &records {
            record.validate()?;
        }
        let mut state = self.state.lock().await;
        let (fresh, duplicates) = transfer::merge_by_name(&state.records, records);
        let added = fresh.len();
        if added > 0 {
            let mut next = state.records.clone();
            next.extend(fresh);
            state.records = self.persist(next, Arc::clone(&state.password)).await?;
        }

        info!(added, duplicates = duplicates.len(), "records imported");
        Ok(ImportReport { added, duplicates })
    }

    /// Rotate the master password. The session switches to `new_password`
    /// only after the new container has been committed.
    pub async fn rotate(
        &self,
        old_password: SecretString,
        new_password: SecretString,
    ) -> Result<(), CofferError> {
        let mut state = self.state.lock().await;
        let new_password = Arc::new(new_password);

        let store = self.store.clone();
        let policy = self.policy;
        let worker_new = Arc::clone(&new_password);
        let records = run_blocking(move || {
            crate::rotation::RotationProtocol::new(&store, policy).run(&old_password, &worker_new)
        })
        .await?;

        state.records = records;
        state.password = new_password;
        Ok(())
    }

    async fn persist(
        &self,
        records: RecordSet,
        password: Arc<SecretString>,
    ) -> Result<RecordSet, CofferError> {
        let store = self.store.clone();
        run_blocking(move || {
            store.save(&records, &password)?;
            Ok(records)
        })
        .await
    }
}
