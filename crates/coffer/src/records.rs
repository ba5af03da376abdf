// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line record arguments: selectors, new records, and field edits.

use std::str::FromStr;

use clap::{Args, Subcommand};
use coffer_core::types::DEFAULT_SERVER_PORT;
use coffer_core::{
    CofferError, DatabaseConnection, DbKind, NetworkDatabase, Record, RecordKind, RecordSet,
    Server, Website,
};

/// Identifies one record: `#<n>` (1-based position) or a record name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Position(usize),
    Name(String),
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('#') {
            Some(number) => match number.parse::<usize>() {
                Ok(0) => Err("record numbers start at #1".to_string()),
                Ok(n) => Ok(Selector::Position(n)),
                Err(_) => Err(format!("`{s}` is not a record number")),
            },
            None if s.trim().is_empty() => Err("record name must not be empty".to_string()),
            None => Ok(Selector::Name(s.to_string())),
        }
    }
}

impl Selector {
    /// Zero-based index of the selected record. Names match the first record
    /// with that exact name.
    pub fn resolve(&self, records: &RecordSet) -> Result<usize, CofferError> {
        match self {
            Selector::Position(n) => {
                let index = n - 1;
                if index < records.len() {
                    Ok(index)
                } else {
                    Err(CofferError::NoSuchRecord {
                        index: *n,
                        len: records.len(),
                    })
                }
            }
            Selector::Name(name) => records
                .position_by_name(name)
                .ok_or_else(|| CofferError::InvalidRecord(format!("no record named `{name}`"))),
        }
    }
}

fn parse_db_kind(s: &str) -> Result<DbKind, String> {
    s.parse()
        .map_err(|_| format!("unknown database type `{s}` (expected sqlite, mysql or postgresql)"))
}

/// Username and password shared by every networked record type.
#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Login name.
    #[arg(long, default_value = "")]
    pub username: String,

    /// Password to store. Prefer --ask-password to keep it out of shell history.
    #[arg(long, conflicts_with = "ask_password")]
    pub password: Option<String>,

    /// Prompt for the password without echo.
    #[arg(long)]
    pub ask_password: bool,
}

impl LoginArgs {
    fn resolve_password(&self) -> Result<Option<String>, CofferError> {
        resolve_password(self.password.as_deref(), self.ask_password)
    }

    fn is_set(&self) -> bool {
        !self.username.is_empty() || self.password.is_some() || self.ask_password
    }
}

fn resolve_password(given: Option<&str>, ask: bool) -> Result<Option<String>, CofferError> {
    if ask {
        eprint!("Record password: ");
        let password = rpassword::read_password()
            .map_err(|e| CofferError::PasswordInput(format!("failed to read password: {e}")))?;
        return Ok(Some(password));
    }
    Ok(given.map(str::to_string))
}

/// The record to create with `coffer add`.
#[derive(Subcommand, Debug)]
pub enum NewRecord {
    /// Website login.
    Website {
        name: String,
        #[arg(long)]
        url: String,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Server login (SSH by default).
    Server {
        name: String,
        /// Host name or IP address.
        #[arg(long, visible_alias = "ip")]
        host: String,
        #[arg(long, default_value = DEFAULT_SERVER_PORT)]
        port: String,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Database connection.
    Database {
        name: String,
        /// sqlite, mysql or postgresql.
        #[arg(long = "db-type", value_parser = parse_db_kind)]
        db_type: DbKind,
        /// Database file (SQLite only).
        #[arg(long)]
        sqlite_path: Option<String>,
        #[arg(long)]
        host: Option<String>,
        /// Defaults to the engine's standard port.
        #[arg(long)]
        port: Option<String>,
        #[arg(long)]
        database_name: Option<String>,
        #[command(flatten)]
        login: LoginArgs,
    },
}

impl NewRecord {
    pub fn into_record(self) -> Result<Record, CofferError> {
        let record = match self {
            NewRecord::Website { name, url, login } => {
                let password = login.resolve_password()?.unwrap_or_default();
                Record::new(
                    name,
                    RecordKind::Website(Website {
                        url,
                        username: login.username,
                        password,
                    }),
                )
            }
            NewRecord::Server {
                name,
                host,
                port,
                login,
            } => {
                let password = login.resolve_password()?.unwrap_or_default();
                Record::new(
                    name,
                    RecordKind::Server(Server {
                        host,
                        port,
                        username: login.username,
                        password,
                    }),
                )
            }
            NewRecord::Database {
                name,
                db_type,
                sqlite_path,
                host,
                port,
                database_name,
                login,
            } => {
                let connection = match db_type.default_port() {
                    None => {
                        if host.is_some() || port.is_some() || database_name.is_some() || login.is_set() {
                            return Err(CofferError::InvalidRecord(
                                "SQLite records take only --sqlite-path".to_string(),
                            ));
                        }
                        let path = sqlite_path.ok_or_else(|| {
                            CofferError::InvalidRecord("--sqlite-path is required for SQLite".to_string())
                        })?;
                        DatabaseConnection::Sqlite { path }
                    }
                    Some(default_port) => {
                        if sqlite_path.is_some() {
                            return Err(CofferError::InvalidRecord(format!(
                                "--sqlite-path does not apply to {db_type}"
                            )));
                        }
                        let net = NetworkDatabase {
                            host: host.unwrap_or_default(),
                            port: port.unwrap_or_else(|| default_port.to_string()),
                            password: login.resolve_password()?.unwrap_or_default(),
                            username: login.username,
                            database_name: database_name.unwrap_or_default(),
                        };
                        if db_type == DbKind::MySql {
                            DatabaseConnection::MySql(net)
                        } else {
                            DatabaseConnection::PostgreSql(net)
                        }
                    }
                };
                Record::new(name, RecordKind::Database(connection))
            }
        };
        record.validate()?;
        Ok(record)
    }
}

/// Field changes for `coffer edit`. Only the given fields change; the record
/// type cannot.
#[derive(Args, Debug, Default)]
pub struct RecordEdits {
    /// New record name.
    #[arg(long = "name")]
    pub rename: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long, visible_alias = "ip")]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long, conflicts_with = "ask_password")]
    pub password: Option<String>,
    /// Prompt for the new password without echo.
    #[arg(long)]
    pub ask_password: bool,
    #[arg(long)]
    pub database_name: Option<String>,
    #[arg(long)]
    pub sqlite_path: Option<String>,
}

fn not_applicable(flag: &str, record: &Record) -> CofferError {
    CofferError::InvalidRecord(format!(
        "--{flag} does not apply to {} records",
        record.record_type()
    ))
}

fn set(slot: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl RecordEdits {
    pub fn is_empty(&self) -> bool {
        self.rename.is_none()
            && self.url.is_none()
            && self.host.is_none()
            && self.port.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && !self.ask_password
            && self.database_name.is_none()
            && self.sqlite_path.is_none()
    }

    /// Apply the edits to `record`, rejecting flags the record type lacks.
    pub fn apply(self, record: &mut Record) -> Result<(), CofferError> {
        let password = resolve_password(self.password.as_deref(), self.ask_password)?;
        let unsupported = match &record.kind {
            RecordKind::Website(_) => [
                ("host", self.host.is_some()),
                ("port", self.port.is_some()),
                ("database-name", self.database_name.is_some()),
                ("sqlite-path", self.sqlite_path.is_some()),
            ]
            .into_iter()
            .find(|(_, given)| *given),
            RecordKind::Server(_) => [
                ("url", self.url.is_some()),
                ("database-name", self.database_name.is_some()),
                ("sqlite-path", self.sqlite_path.is_some()),
            ]
            .into_iter()
            .find(|(_, given)| *given),
            RecordKind::Database(DatabaseConnection::Sqlite { .. }) => [
                ("url", self.url.is_some()),
                ("host", self.host.is_some()),
                ("port", self.port.is_some()),
                ("username", self.username.is_some()),
                ("password", password.is_some()),
                ("database-name", self.database_name.is_some()),
            ]
            .into_iter()
            .find(|(_, given)| *given),
            RecordKind::Database(_) => [
                ("url", self.url.is_some()),
                ("sqlite-path", self.sqlite_path.is_some()),
            ]
            .into_iter()
            .find(|(_, given)| *given),
        };
        if let Some((flag, _)) = unsupported {
            return Err(not_applicable(flag, record));
        }

        let mut edited = record.clone();
        set(&mut edited.name, self.rename);
        match &mut edited.kind {
            RecordKind::Website(w) => {
                set(&mut w.url, self.url);
                set(&mut w.username, self.username);
                set(&mut w.password, password);
            }
            RecordKind::Server(s) => {
                set(&mut s.host, self.host);
                set(&mut s.port, self.port);
                set(&mut s.username, self.username);
                set(&mut s.password, password);
            }
            RecordKind::Database(DatabaseConnection::Sqlite { path }) => {
                set(path, self.sqlite_path);
            }
            RecordKind::Database(
                DatabaseConnection::MySql(net) | DatabaseConnection::PostgreSql(net),
            ) => {
                set(&mut net.host, self.host);
                set(&mut net.port, self.port);
                set(&mut net.username, self.username);
                set(&mut net.password, password);
                set(&mut net.database_name, self.database_name);
            }
        }
        edited.validate()?;
        *record = edited;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> RecordSet {
        RecordSet::from(vec![
            Record::new("git", RecordKind::Website(Website::default())),
            Record::new("box", RecordKind::Server(Server::default())),
            Record::new("git", RecordKind::Server(Server::default())),
        ])
    }

    #[test]
    fn selector_parses_positions_and_names() {
        assert_eq!("#2".parse::<Selector>().unwrap(), Selector::Position(2));
        assert_eq!(
            "git".parse::<Selector>().unwrap(),
            Selector::Name("git".to_string())
        );
        assert!("#0".parse::<Selector>().is_err());
        assert!("#two".parse::<Selector>().is_err());
        assert!(" ".parse::<Selector>().is_err());
    }

    #[test]
    fn name_selector_picks_first_match() {
        let selector = Selector::Name("git".to_string());
        assert_eq!(selector.resolve(&records()).unwrap(), 0);
    }

    #[test]
    fn position_selector_is_one_based() {
        assert_eq!(Selector::Position(2).resolve(&records()).unwrap(), 1);
        assert!(matches!(
            Selector::Position(4).resolve(&records()),
            Err(CofferError::NoSuchRecord { index: 4, len: 3 })
        ));
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(Selector::Name("nope".into()).resolve(&records()).is_err());
    }

    #[test]
    fn network_database_gets_default_port() {
        let record = NewRecord::Database {
            name: "orders".into(),
            db_type: DbKind::MySql,
            sqlite_path: None,
            host: Some("db.test".into()),
            port: None,
            database_name: Some("orders".into()),
            login: LoginArgs {
                username: "app".into(),
                password: Some("pw".into()),
                ask_password: false,
            },
        }
        .into_record()
        .unwrap();

        match record.kind {
            RecordKind::Database(DatabaseConnection::MySql(net)) => {
                assert_eq!(net.port, "3306");
                assert_eq!(net.password, "pw");
            }
            other => panic!("expected MySQL record, got {other:?}"),
        }
    }

    #[test]
    fn sqlite_requires_path_and_rejects_login() {
        let missing_path = NewRecord::Database {
            name: "local".into(),
            db_type: DbKind::Sqlite,
            sqlite_path: None,
            host: None,
            port: None,
            database_name: None,
            login: LoginArgs::default(),
        };
        assert!(missing_path.into_record().is_err());

        let with_login = NewRecord::Database {
            name: "local".into(),
            db_type: DbKind::Sqlite,
            sqlite_path: Some("/tmp/a.db".into()),
            host: None,
            port: None,
            database_name: None,
            login: LoginArgs {
                username: "root".into(),
                ..LoginArgs::default()
            },
        };
        assert!(with_login.into_record().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let record = NewRecord::Website {
            name: " ".into(),
            url: "https://x.test".into(),
            login: LoginArgs::default(),
        };
        assert!(matches!(
            record.into_record(),
            Err(CofferError::InvalidRecord(_))
        ));
    }

    #[test]
    fn edits_change_only_given_fields() {
        let mut record = Record::new(
            "box",
            RecordKind::Server(Server {
                host: "10.0.0.1".into(),
                port: "22".into(),
                username: "root".into(),
                password: "old".into(),
            }),
        );
        let edits = RecordEdits {
            port: Some("2222".into()),
            password: Some("new".into()),
            ..RecordEdits::default()
        };
        edits.apply(&mut record).unwrap();

        match &record.kind {
            RecordKind::Server(s) => {
                assert_eq!(s.host, "10.0.0.1");
                assert_eq!(s.port, "2222");
                assert_eq!(s.username, "root");
                assert_eq!(s.password, "new");
            }
            other => panic!("expected server, got {other:?}"),
        }
    }

    #[test]
    fn edits_reject_fields_of_other_types() {
        let mut record = Record::new("git", RecordKind::Website(Website::default()));
        let before = record.clone();
        let edits = RecordEdits {
            username: Some("me".into()),
            database_name: Some("db".into()),
            ..RecordEdits::default()
        };
        let err = edits.apply(&mut record).unwrap_err();
        assert!(err.to_string().contains("--database-name"));
        assert_eq!(record, before);
    }

    #[test]
    fn empty_edit_set_is_detected() {
        assert!(RecordEdits::default().is_empty());
        assert!(
            !RecordEdits {
                rename: Some("x".into()),
                ..RecordEdits::default()
            }
            .is_empty()
        );
    }
}
