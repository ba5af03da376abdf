// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk vault container: `salt(16) || ciphertext || tag(16)`.
//!
//! Every save draws a fresh salt, derives a fresh key from it and uses the
//! salt itself as the 16-byte GCM nonce. Keys are never cached.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use coffer_core::{CofferError, ContainerBackend, RecordSet};
use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::codec;
use crate::crypto::{self, TAG_LEN};
use crate::kdf::{self, SALT_LEN};
use crate::policy::PasswordPolicy;
use crate::rotation::RotationProtocol;

/// Smallest container that can possibly authenticate (empty ciphertext).
pub const MIN_CONTAINER_LEN: usize = SALT_LEN + TAG_LEN;

/// Container persisted as a single file, replaced atomically.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl ContainerBackend for FileBackend {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Option<Vec<u8>>, CofferError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CofferError::io(
                format!("reading {}", self.path.display()),
                e,
            )),
        }
    }

    fn replace(&self, bytes: &[u8]) -> Result<(), CofferError> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| CofferError::io(format!("creating {}", dir.display()), e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| {
            CofferError::io(format!("creating temporary file in {}", dir.display()), e)
        })?;
        tmp.write_all(bytes)
            .map_err(|e| CofferError::io("writing temporary container", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| CofferError::io("restricting container permissions", e))?;
        }

        tmp.as_file()
            .sync_all()
            .map_err(|e| CofferError::io("syncing temporary container", e))?;
        tmp.persist(&self.path).map_err(|e| {
            CofferError::io(format!("replacing {}", self.path.display()), e.error)
        })?;

        #[cfg(unix)]
        {
            if let Ok(dir_handle) = std::fs::File::open(&dir)
                && let Err(e) = dir_handle.sync_all()
            {
                warn!(error = %e, dir = %dir.display(), "failed to sync vault directory");
            }
        }

        Ok(())
    }
}

/// Encrypt a record set into complete container bytes under `password`.
pub fn seal_container(
    records: &RecordSet,
    password: &SecretString,
) -> Result<Vec<u8>, CofferError> {
    let payload = codec::encode(records)?;
    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(password.expose_secret().as_bytes(), &salt);
    let ciphertext = crypto::seal(&key, &salt, &payload)?;

    let mut container = Vec::with_capacity(SALT_LEN + ciphertext.len());
    container.extend_from_slice(&salt);
    container.extend_from_slice(&ciphertext);
    Ok(container)
}

/// Decrypt and decode container bytes.
///
/// Truncation, tag mismatch and payload decoding failures all collapse into
/// [`CofferError::WrongPasswordOrCorrupt`].
pub fn open_container(bytes: &[u8], password: &SecretString) -> Result<RecordSet, CofferError> {
    if bytes.len() < MIN_CONTAINER_LEN {
        debug!(len = bytes.len(), "container shorter than salt and tag");
        return Err(CofferError::WrongPasswordOrCorrupt);
    }
    let (salt_bytes, ciphertext) = bytes.split_at(SALT_LEN);
    let salt: [u8; SALT_LEN] = salt_bytes
        .try_into()
        .map_err(|_| CofferError::WrongPasswordOrCorrupt)?;

    let key = kdf::derive_key(password.expose_secret().as_bytes(), &salt);
    let payload = match crypto::open(&key, &salt, ciphertext) {
        Ok(payload) => payload,
        Err(CofferError::Authentication) => {
            debug!("container failed authentication");
            return Err(CofferError::WrongPasswordOrCorrupt);
        }
        Err(e) => return Err(e),
    };

    codec::decode(&payload).map_err(|e| {
        debug!(error = %e, "authenticated payload failed to decode");
        CofferError::WrongPasswordOrCorrupt
    })
}

/// Load/save front for one vault container.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct VaultStore {
    backend: Arc<dyn ContainerBackend>,
}

impl std::fmt::Debug for VaultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultStore")
            .field("location", &self.backend.location())
            .finish()
    }
}

impl VaultStore {
    /// Store backed by a file at `path`.
    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(Arc::new(FileBackend::new(path)))
    }

    pub fn with_backend(backend: Arc<dyn ContainerBackend>) -> Self {
        Self { backend }
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Whether a container has been written yet.
    pub fn exists(&self) -> Result<bool, CofferError> {
        self.backend.exists()
    }

    /// Raw container bytes, or [`CofferError::NotFound`] on first run.
    pub fn read_container(&self) -> Result<Vec<u8>, CofferError> {
        self.backend.read()?.ok_or_else(|| CofferError::NotFound {
            location: self.location(),
        })
    }

    /// Load and decrypt the record set.
    pub fn load(&self, password: &SecretString) -> Result<RecordSet, CofferError> {
        let bytes = self.read_container()?;
        let records = open_container(&bytes, password)?;
        debug!(records = records.len(), location = %self.location(), "vault loaded");
        Ok(records)
    }

    /// Encrypt under a fresh salt and atomically replace the container.
    pub fn save(&self, records: &RecordSet, password: &SecretString) -> Result<(), CofferError> {
        let container = seal_container(records, password)?;
        self.commit(&container)?;
        debug!(records = records.len(), location = %self.location(), "vault saved");
        Ok(())
    }

    /// Atomically replace the container with already-sealed bytes.
    pub fn commit(&self, container: &[u8]) -> Result<(), CofferError> {
        self.backend.replace(container)
    }

    /// Re-encrypt the vault under `new_password`, rolling back on commit failure.
    pub fn rotate(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
        policy: PasswordPolicy,
    ) -> Result<(), CofferError> {
        RotationProtocol::new(self, policy)
            .run(old_password, new_password)
            .map(|_| ())
    }
}
