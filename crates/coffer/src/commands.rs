// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Record commands unlock the vault through a [`VaultSession`], so every
//! mutation is persisted before it is reported. `passwd` drives the store's
//! rotation directly so the old password is verified only once.

use std::io::IsTerminal;
use std::path::Path;

use coffer_config::model::CofferConfig;
use coffer_core::CofferError;
use coffer_vault::{
    NEW_MASTER_PASSWORD_ENV_VAR, MASTER_PASSWORD_ENV_VAR, PasswordPolicy, VaultSession,
    VaultStore, get_master_password, get_new_password_with_confirm,
};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::display;
use crate::records::{NewRecord, RecordEdits, Selector};

/// What every command needs: where the vault lives and the password rule.
#[derive(Debug, Clone)]
pub struct Context {
    pub store: VaultStore,
    pub policy: PasswordPolicy,
    pub use_color: bool,
}

impl Context {
    pub fn from_config(config: &CofferConfig, plain: bool) -> Self {
        Self {
            store: VaultStore::open_file(config.vault.path_buf()),
            policy: PasswordPolicy::from_config(&config.policy),
            use_color: !plain && std::io::stdout().is_terminal(),
        }
    }
}

async fn unlock(ctx: &Context) -> Result<VaultSession, CofferError> {
    let password = get_master_password()?;
    let session = VaultSession::open(ctx.store.clone(), password).await?;
    Ok(session.with_policy(ctx.policy))
}

/// `coffer init`
pub async fn run_init(ctx: &Context) -> Result<(), CofferError> {
    let password = get_new_password_with_confirm(MASTER_PASSWORD_ENV_VAR)?;
    let session = VaultSession::create(ctx.store.clone(), password, ctx.policy).await?;
    display::print_success(
        &format!("Created empty vault at {}", session.location()),
        ctx.use_color,
    );
    Ok(())
}

/// `coffer list`
pub async fn run_list(ctx: &Context, reveal: bool, json: bool) -> Result<(), CofferError> {
    let records = unlock(ctx).await?.records().await;

    if json {
        let entries = display::list_entries(&records, reveal);
        let text = serde_json::to_string_pretty(&entries)
            .map_err(|e| CofferError::Internal(format!("failed to render JSON: {e}")))?;
        println!("{text}");
    } else if records.is_empty() {
        println!("Vault is empty. Add a record with `coffer add`.");
    } else {
        print!("{}", display::render_table(&records, reveal));
    }
    Ok(())
}

/// `coffer show`
pub async fn run_show(ctx: &Context, selector: &Selector, reveal: bool) -> Result<(), CofferError> {
    let records = unlock(ctx).await?.records().await;
    let index = selector.resolve(&records)?;
    if let Some(record) = records.get(index) {
        display::print_record(index + 1, record, reveal, ctx.use_color);
    }
    Ok(())
}

/// `coffer add`
pub async fn run_add(ctx: &Context, new_record: NewRecord) -> Result<(), CofferError> {
    let session = unlock(ctx).await?;
    let record = new_record.into_record()?;
    let name = record.name.clone();
    let index = session.add(record).await?;
    display::print_success(&format!("Added #{} `{name}`", index + 1), ctx.use_color);
    Ok(())
}

/// `coffer edit`
pub async fn run_edit(
    ctx: &Context,
    selector: &Selector,
    edits: RecordEdits,
) -> Result<(), CofferError> {
    if edits.is_empty() {
        return Err(CofferError::InvalidRecord(
            "nothing to change; pass at least one field option".to_string(),
        ));
    }
    let session = unlock(ctx).await?;
    let records = session.records().await;
    let index = selector.resolve(&records)?;
    let mut record = records
        .get(index)
        .cloned()
        .ok_or(CofferError::NoSuchRecord {
            index: index + 1,
            len: records.len(),
        })?;

    edits.apply(&mut record)?;
    let name = record.name.clone();
    session.edit(index, record).await?;
    display::print_success(&format!("Updated #{} `{name}`", index + 1), ctx.use_color);
    Ok(())
}

/// `coffer remove`
pub async fn run_remove(ctx: &Context, selector: &Selector) -> Result<(), CofferError> {
    let session = unlock(ctx).await?;
    let index = selector.resolve(&session.records().await)?;
    let removed = session.delete(index).await?;
    display::print_success(
        &format!("Removed #{} `{}`", index + 1, removed.name),
        ctx.use_color,
    );
    Ok(())
}

/// `coffer import`
pub async fn run_import(ctx: &Context, path: &Path) -> Result<(), CofferError> {
    let batch = coffer_vault::read_import(path)?;
    for skipped in &batch.skipped {
        display::print_warning(
            &format!("skipped entry {}: {}", skipped.index + 1, skipped.reason),
            ctx.use_color,
        );
    }

    let session = unlock(ctx).await?;
    let report = session.import(batch.records).await?;
    for name in &report.duplicates {
        display::print_warning(
            &format!("skipped `{name}`: a record with that name already exists"),
            ctx.use_color,
        );
    }
    display::print_success(
        &format!(
            "Imported {} record(s), skipped {}",
            report.added,
            report.duplicates.len() + batch.skipped.len()
        ),
        ctx.use_color,
    );
    Ok(())
}

/// `coffer export`
pub async fn run_export(ctx: &Context, path: &Path) -> Result<(), CofferError> {
    let records = unlock(ctx).await?.records().await;
    coffer_vault::export_json(&records, path)?;
    display::print_success(
        &format!("Exported {} record(s) to {}", records.len(), path.display()),
        ctx.use_color,
    );
    display::print_warning("the export file is not encrypted", ctx.use_color);
    Ok(())
}

/// `coffer passwd`
pub async fn run_passwd(ctx: &Context) -> Result<(), CofferError> {
    let old_password = get_master_password()?;
    let new_password = get_new_password_with_confirm(NEW_MASTER_PASSWORD_ENV_VAR)?;
    // Weak replacements are refused before any key derivation.
    ctx.policy.check(new_password.expose_secret())?;

    let store = ctx.store.clone();
    let policy = ctx.policy;
    tokio::task::spawn_blocking(move || store.rotate(&old_password, &new_password, policy))
        .await
        .map_err(|e| CofferError::Internal(format!("rotation task failed: {e}")))??;
    debug!(location = %ctx.store.location(), "master password rotated");
    display::print_success("Master password changed", ctx.use_color);
    Ok(())
}
