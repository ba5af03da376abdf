// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for the encrypted vault container.

use crate::error::CofferError;

/// Backend holding exactly one opaque container blob.
///
/// Implementations never interpret the bytes. `replace` must be atomic from
/// the caller's point of view: after it returns `Err`, a subsequent `read`
/// yields either the previous content or content the caller restores.
pub trait ContainerBackend: Send + Sync + 'static {
    /// Human-readable location used in errors and logs (usually a path).
    fn location(&self) -> String;

    /// Read the full container. `Ok(None)` means no container exists yet.
    fn read(&self) -> Result<Option<Vec<u8>>, CofferError>;

    /// Replace the full container with `bytes`.
    fn replace(&self, bytes: &[u8]) -> Result<(), CofferError>;

    /// Whether a container currently exists.
    fn exists(&self) -> Result<bool, CofferError> {
        Ok(self.read()?.is_some())
    }
}
