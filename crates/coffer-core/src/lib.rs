// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Coffer secrets vault.
//!
//! Provides the error type, the credential record model, and the storage
//! trait shared by the vault engine, configuration, and the command-line
//! front end.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CofferError;
pub use traits::ContainerBackend;
pub use types::{
    DatabaseConnection, DbKind, NetworkDatabase, Record, RecordKind, RecordSet, RecordType,
    Server, Website,
};
