// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain JSON import and export of decrypted records.
//!
//! Export writes the same array shape the vault payload uses, pretty-printed.
//! Import is lenient per item: entries that cannot become a record are
//! reported and skipped instead of failing the whole file.

use std::collections::HashSet;
use std::path::Path;

use coffer_core::{CofferError, ContainerBackend, Record, RecordSet};
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

use crate::store::FileBackend;

/// An import entry that was not turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Zero-based position in the imported array.
    pub index: usize,
    pub reason: String,
}

/// Result of parsing an import file.
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedEntry>,
}

/// Write `records` to `path` as pretty JSON, atomically and owner-only.
pub fn export_json(records: &RecordSet, path: &Path) -> Result<(), CofferError> {
    let json = serde_json::to_vec_pretty(records)
        .map(Zeroizing::new)
        .map_err(|e| CofferError::Internal(format!("failed to encode export: {e}")))?;
    FileBackend::new(path).replace(&json)?;
    debug!(records = records.len(), path = %path.display(), "records exported");
    Ok(())
}

/// Read and parse an import file.
pub fn read_import(path: &Path) -> Result<ImportBatch, CofferError> {
    let bytes = Zeroizing::new(
        std::fs::read(path).map_err(|e| CofferError::io(format!("reading {}", path.display()), e))?,
    );
    parse_import(&bytes)
}

/// Parse import bytes. The document must be a JSON array.
pub fn parse_import(bytes: &[u8]) -> Result<ImportBatch, CofferError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| CofferError::Format(format!("import file is not valid JSON: {e}")))?;
    let Value::Array(items) = document else {
        return Err(CofferError::Format(
            "import file must contain a JSON array of records".to_string(),
        ));
    };

    let mut batch = ImportBatch::default();
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(map) = item else {
            batch.skipped.push(SkippedEntry {
                index,
                reason: "entry is not an object".to_string(),
            });
            continue;
        };
        match Record::try_from(map) {
            Ok(record) => batch.records.push(record),
            Err(e) => batch.skipped.push(SkippedEntry {
                index,
                reason: e.to_string(),
            }),
        }
    }
    Ok(batch)
}

/// Split `incoming` into records whose names are new and the names that were
/// already present, either in `existing` or earlier in `incoming`.
pub fn merge_by_name(existing: &RecordSet, incoming: Vec<Record>) -> (Vec<Record>, Vec<String>) {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.name.clone()).collect();
    let mut fresh = Vec::new();
    let mut duplicates = Vec::new();
    for record in incoming {
        if seen.insert(record.name.clone()) {
            fresh.push(record);
        } else {
            duplicates.push(record.name);
        }
    }
    (fresh, duplicates)
}
