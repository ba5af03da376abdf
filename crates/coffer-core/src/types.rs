// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential record model shared by the vault engine and its front ends.
//!
//! A [`Record`] is a tagged union over website, server and database entries.
//! On the wire it is a flat JSON object whose `type` key selects the variant;
//! keys the model does not know are kept in [`Record::extra`] and written back
//! unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::CofferError;

/// Unknown keys carried through decode/encode untouched.
pub type ExtraFields = BTreeMap<String, Value>;

const KEY_NAME: &str = "name";
const KEY_TYPE: &str = "type";
const KEY_URL: &str = "url";
const KEY_IP: &str = "ip";
const KEY_HOST: &str = "host";
const KEY_PORT: &str = "port";
const KEY_USERNAME: &str = "username";
const KEY_PASSWORD: &str = "password";
const KEY_DB_TYPE: &str = "db_type";
const KEY_SQLITE_PATH: &str = "sqlite_path";
const KEY_DATABASE_NAME: &str = "database_name";

/// Default SSH port used for server records without an explicit port.
pub const DEFAULT_SERVER_PORT: &str = "22";

/// The `type` tag of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum RecordType {
    Website,
    Server,
    Database,
}

/// Database engine of a [`DatabaseConnection`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum DbKind {
    #[strum(to_string = "SQLite")]
    Sqlite,
    #[strum(to_string = "MySQL")]
    MySql,
    #[strum(to_string = "PostgreSQL", serialize = "postgres")]
    PostgreSql,
}

impl DbKind {
    /// Port filled in when a network database record omits one.
    pub fn default_port(self) -> Option<&'static str> {
        match self {
            DbKind::Sqlite => None,
            DbKind::MySql => Some("3306"),
            DbKind::PostgreSql => Some("5432"),
        }
    }
}

/// Website login.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Website {
    pub url: String,
    pub username: String,
    pub password: String,
}

/// Remote server login (typically SSH).
#[derive(Clone, PartialEq, Eq)]
pub struct Server {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_SERVER_PORT.to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Connection details for a MySQL or PostgreSQL server.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NetworkDatabase {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub database_name: String,
}

/// A database connection entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConnection {
    Sqlite { path: String },
    MySql(NetworkDatabase),
    PostgreSql(NetworkDatabase),
}

impl DatabaseConnection {
    pub fn kind(&self) -> DbKind {
        match self {
            DatabaseConnection::Sqlite { .. } => DbKind::Sqlite,
            DatabaseConnection::MySql(_) => DbKind::MySql,
            DatabaseConnection::PostgreSql(_) => DbKind::PostgreSql,
        }
    }

    /// Network connection details, `None` for SQLite.
    pub fn network(&self) -> Option<&NetworkDatabase> {
        match self {
            DatabaseConnection::Sqlite { .. } => None,
            DatabaseConnection::MySql(net) | DatabaseConnection::PostgreSql(net) => Some(net),
        }
    }
}

/// Variant-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Website(Website),
    Server(Server),
    Database(DatabaseConnection),
}

impl RecordKind {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordKind::Website(_) => RecordType::Website,
            RecordKind::Server(_) => RecordType::Server,
            RecordKind::Database(_) => RecordType::Database,
        }
    }

    /// Wire keys this variant writes. An extra field under one of these
    /// names would be overwritten on encode.
    pub fn wire_keys(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Website(_) => &[KEY_NAME, KEY_TYPE, KEY_URL, KEY_USERNAME, KEY_PASSWORD],
            RecordKind::Server(_) => &[
                KEY_NAME,
                KEY_TYPE,
                KEY_IP,
                KEY_PORT,
                KEY_USERNAME,
                KEY_PASSWORD,
            ],
            RecordKind::Database(DatabaseConnection::Sqlite { .. }) => {
                &[KEY_NAME, KEY_TYPE, KEY_DB_TYPE, KEY_SQLITE_PATH]
            }
            RecordKind::Database(_) => &[
                KEY_NAME,
                KEY_TYPE,
                KEY_DB_TYPE,
                KEY_HOST,
                KEY_PORT,
                KEY_USERNAME,
                KEY_PASSWORD,
                KEY_DATABASE_NAME,
            ],
        }
    }
}

/// A single credential entry.
///
/// `name` is the user-facing identifier and the de-duplication key on import.
/// It is not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    pub name: String,
    pub kind: RecordKind,
    pub extra: ExtraFields,
}

impl Record {
    pub fn new(name: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            name: name.into(),
            kind,
            extra: ExtraFields::new(),
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.kind.record_type()
    }

    /// Reject records that would not decode back to themselves.
    pub fn validate(&self) -> Result<(), CofferError> {
        if self.name.trim().is_empty() {
            return Err(CofferError::InvalidRecord(
                "record name must not be empty".to_string(),
            ));
        }
        let wire_keys = self.kind.wire_keys();
        if let Some(key) = self.extra.keys().find(|k| wire_keys.contains(&k.as_str())) {
            return Err(CofferError::InvalidRecord(format!(
                "record `{}` has extra field `{key}` that clashes with a {} field",
                self.name,
                self.record_type()
            )));
        }
        Ok(())
    }

    pub fn username(&self) -> Option<&str> {
        match &self.kind {
            RecordKind::Website(w) => Some(&w.username),
            RecordKind::Server(s) => Some(&s.username),
            RecordKind::Database(db) => db.network().map(|n| n.username.as_str()),
        }
    }

    pub fn password(&self) -> Option<&str> {
        match &self.kind {
            RecordKind::Website(w) => Some(&w.password),
            RecordKind::Server(s) => Some(&s.password),
            RecordKind::Database(db) => db.network().map(|n| n.password.as_str()),
        }
    }

    /// Where the credential points: URL, server address, SQLite file, or
    /// `host:port` of a database server.
    pub fn location(&self) -> String {
        match &self.kind {
            RecordKind::Website(w) => w.url.clone(),
            RecordKind::Server(s) => s.host.clone(),
            RecordKind::Database(DatabaseConnection::Sqlite { path }) => path.clone(),
            RecordKind::Database(db) => match db.network() {
                Some(net) => format!("{}:{}", net.host, net.port),
                None => String::new(),
            },
        }
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = CofferError;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let name = take_text(&mut map, KEY_NAME)?
            .ok_or_else(|| CofferError::Format("record is missing `name`".to_string()))?;
        if name.trim().is_empty() {
            return Err(CofferError::Format("record `name` must not be empty".to_string()));
        }

        let tag = take_text(&mut map, KEY_TYPE)?.ok_or_else(|| {
            CofferError::Format(format!("record `{name}` is missing `type`"))
        })?;
        let record_type: RecordType = tag.parse().map_err(|_| {
            CofferError::Format(format!("record `{name}` has unknown type `{tag}`"))
        })?;

        let kind = match record_type {
            RecordType::Website => RecordKind::Website(Website {
                url: take_or_empty(&mut map, KEY_URL)?,
                username: take_or_empty(&mut map, KEY_USERNAME)?,
                password: take_or_empty(&mut map, KEY_PASSWORD)?,
            }),
            RecordType::Server => RecordKind::Server(Server {
                host: take_or_empty(&mut map, KEY_IP)?,
                port: take_port(&mut map, DEFAULT_SERVER_PORT)?,
                username: take_or_empty(&mut map, KEY_USERNAME)?,
                password: take_or_empty(&mut map, KEY_PASSWORD)?,
            }),
            RecordType::Database => RecordKind::Database(take_database(&mut map, &name)?),
        };

        Ok(Self {
            name,
            kind,
            extra: map.into_iter().collect(),
        })
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        let mut map: Map<String, Value> = record.extra.into_iter().collect();
        let record_type = record.kind.record_type();
        map.insert(KEY_NAME.into(), Value::String(record.name));
        map.insert(KEY_TYPE.into(), Value::String(record_type.to_string()));

        match record.kind {
            RecordKind::Website(w) => {
                map.insert(KEY_URL.into(), Value::String(w.url));
                map.insert(KEY_USERNAME.into(), Value::String(w.username));
                map.insert(KEY_PASSWORD.into(), Value::String(w.password));
            }
            RecordKind::Server(s) => {
                map.insert(KEY_IP.into(), Value::String(s.host));
                map.insert(KEY_PORT.into(), Value::String(s.port));
                map.insert(KEY_USERNAME.into(), Value::String(s.username));
                map.insert(KEY_PASSWORD.into(), Value::String(s.password));
            }
            RecordKind::Database(db) => {
                map.insert(KEY_DB_TYPE.into(), Value::String(db.kind().to_string()));
                match db {
                    DatabaseConnection::Sqlite { path } => {
                        map.insert(KEY_SQLITE_PATH.into(), Value::String(path));
                    }
                    DatabaseConnection::MySql(net) | DatabaseConnection::PostgreSql(net) => {
                        map.insert(KEY_HOST.into(), Value::String(net.host));
                        map.insert(KEY_PORT.into(), Value::String(net.port));
                        map.insert(KEY_USERNAME.into(), Value::String(net.username));
                        map.insert(KEY_PASSWORD.into(), Value::String(net.password));
                        map.insert(KEY_DATABASE_NAME.into(), Value::String(net.database_name));
                    }
                }
            }
        }

        map
    }
}

fn take_database(
    map: &mut Map<String, Value>,
    name: &str,
) -> Result<DatabaseConnection, CofferError> {
    let tag = take_text(map, KEY_DB_TYPE)?.ok_or_else(|| {
        CofferError::Format(format!("database record `{name}` is missing `db_type`"))
    })?;
    let kind: DbKind = tag.parse().map_err(|_| {
        CofferError::Format(format!(
            "database record `{name}` has unsupported db_type `{tag}`"
        ))
    })?;

    let Some(default_port) = kind.default_port() else {
        return Ok(DatabaseConnection::Sqlite {
            path: take_or_empty(map, KEY_SQLITE_PATH)?,
        });
    };

    let net = NetworkDatabase {
        host: take_or_empty(map, KEY_HOST)?,
        port: take_port(map, default_port)?,
        username: take_or_empty(map, KEY_USERNAME)?,
        password: take_or_empty(map, KEY_PASSWORD)?,
        database_name: take_or_empty(map, KEY_DATABASE_NAME)?,
    };
    Ok(match kind {
        DbKind::MySql => DatabaseConnection::MySql(net),
        _ => DatabaseConnection::PostgreSql(net),
    })
}

/// Remove a string field. Missing and `null` both mean absent.
fn take_text(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>, CofferError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(CofferError::Format(format!(
            "field `{key}` must be a string, found {}",
            json_kind(&other)
        ))),
    }
}

fn take_or_empty(map: &mut Map<String, Value>, key: &str) -> Result<String, CofferError> {
    Ok(take_text(map, key)?.unwrap_or_default())
}

/// Ports are strings on the wire but hand-written files often use numbers.
fn take_port(map: &mut Map<String, Value>, default: &str) -> Result<String, CofferError> {
    match map.remove(KEY_PORT) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) if n.is_u64() => Ok(n.to_string()),
        Some(other) => Err(CofferError::Format(format!(
            "field `port` must be a string or port number, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Debug for Website {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Website")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for NetworkDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkDatabase")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database_name", &self.database_name)
            .finish()
    }
}

/// Ordered list of records. Insertion order is the only ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet(Vec<Record>);

impl RecordSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.0.get(index)
    }

    pub fn push(&mut self, record: Record) {
        self.0.push(record);
    }

    /// Replace the record at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, record: Record) -> Result<Record, CofferError> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(CofferError::NoSuchRecord { index, len })?;
        Ok(std::mem::replace(slot, record))
    }

    /// Remove the record at `index`, shifting later records down.
    pub fn remove(&mut self, index: usize) -> Result<Record, CofferError> {
        if index >= self.0.len() {
            return Err(CofferError::NoSuchRecord {
                index,
                len: self.0.len(),
            });
        }
        Ok(self.0.remove(index))
    }

    /// Index of the first record with this name.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|r| r.name == name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.position_by_name(name).is_some()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.0
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Record> for RecordSet {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
