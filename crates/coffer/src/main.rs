// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coffer - a local secrets vault.
//!
//! This is the binary entry point for the `coffer` command.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod display;
mod records;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coffer_config::model::CofferConfig;
use coffer_config::ConfigError;
use coffer_core::CofferError;

use crate::commands::Context;
use crate::records::{NewRecord, RecordEdits, Selector};

/// Coffer - a local secrets vault for website, server and database logins.
#[derive(Parser, Debug)]
#[command(name = "coffer", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Vault file to use, overriding `vault.path`.
    #[arg(long, global = true, value_name = "PATH")]
    vault: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty vault.
    Init,
    /// List all records.
    List {
        /// Show passwords instead of masking them.
        #[arg(long)]
        reveal: bool,
        /// Print JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Show one record in full.
    Show {
        /// `#<n>` or a record name.
        selector: Selector,
        #[arg(long)]
        reveal: bool,
    },
    /// Add a record.
    #[command(subcommand)]
    Add(NewRecord),
    /// Change fields of a record.
    Edit {
        selector: Selector,
        #[command(flatten)]
        edits: RecordEdits,
    },
    /// Delete a record.
    Remove { selector: Selector },
    /// Merge records from a plain JSON file; names already present are skipped.
    Import { file: PathBuf },
    /// Write all records to a plain JSON file.
    Export { file: PathBuf },
    /// Change the master password.
    Passwd,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            coffer_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    init_tracing(&config.app.log_level);
    let ctx = Context::from_config(&config, cli.plain);

    if let Err(err) = run(cli.command, &ctx).await {
        report_error(&err, &ctx);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<CofferConfig, Vec<ConfigError>> {
    let mut config = match &cli.config {
        Some(path) => coffer_config::load_and_validate_path(path)?,
        None => coffer_config::load_and_validate()?,
    };
    if let Some(vault) = &cli.vault {
        config.vault.path = vault.display().to_string();
    }
    Ok(config)
}

async fn run(command: Commands, ctx: &Context) -> Result<(), CofferError> {
    match command {
        Commands::Init => commands::run_init(ctx).await,
        Commands::List { reveal, json } => commands::run_list(ctx, reveal, json).await,
        Commands::Show { selector, reveal } => commands::run_show(ctx, &selector, reveal).await,
        Commands::Add(new_record) => commands::run_add(ctx, new_record).await,
        Commands::Edit { selector, edits } => commands::run_edit(ctx, &selector, edits).await,
        Commands::Remove { selector } => commands::run_remove(ctx, &selector).await,
        Commands::Import { file } => commands::run_import(ctx, &file).await,
        Commands::Export { file } => commands::run_export(ctx, &file).await,
        Commands::Passwd => commands::run_passwd(ctx).await,
    }
}

fn report_error(err: &CofferError, ctx: &Context) {
    let use_color = ctx.use_color && std::io::IsTerminal::is_terminal(&std::io::stderr());
    if use_color {
        use colored::Colorize;
        eprintln!("{} {err}", "error:".red().bold());
    } else {
        eprintln!("error: {err}");
    }
    if err.is_not_found() {
        eprintln!("hint: run `coffer init` to create a vault");
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coffer={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_server_with_ip_alias() {
        let cli = Cli::try_parse_from([
            "coffer", "add", "server", "bastion", "--ip", "10.0.0.1", "--username", "ops",
        ])
        .unwrap();
        match cli.command {
            Commands::Add(NewRecord::Server { name, host, port, .. }) => {
                assert_eq!(name, "bastion");
                assert_eq!(host, "10.0.0.1");
                assert_eq!(port, "22");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_vault_after_subcommand() {
        let cli = Cli::try_parse_from(["coffer", "list", "--vault", "/tmp/v.dat", "--json"]).unwrap();
        assert_eq!(cli.vault, Some(PathBuf::from("/tmp/v.dat")));
        assert!(matches!(cli.command, Commands::List { json: true, reveal: false }));
    }

    #[test]
    fn rejects_unknown_database_type() {
        let result = Cli::try_parse_from([
            "coffer", "add", "database", "x", "--db-type", "oracle",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn vault_flag_overrides_config_path() {
        let cli = Cli::try_parse_from(["coffer", "--vault", "/tmp/override.dat", "init"]).unwrap();
        let config = load_config(&cli).expect("default config should be valid");
        assert_eq!(config.vault.path, "/tmp/override.dat");
    }
}
