// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal and JSON rendering of records.
//!
//! Passwords are masked unless the caller asks to reveal them.

use coffer_core::{DatabaseConnection, Record, RecordKind, RecordSet};
use serde::Serialize;

const MASK: &str = "********";

/// One row of `coffer list --json`.
#[derive(Debug, Serialize)]
pub struct ListEntry {
    pub number: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Present only when revealing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Mask a password for display. Empty passwords stay empty so "no password"
/// remains visible.
pub fn mask_password(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        MASK.to_string()
    }
}

fn shown_password(value: &str, reveal: bool) -> String {
    if reveal {
        value.to_string()
    } else {
        mask_password(value)
    }
}

pub fn list_entries(records: &RecordSet, reveal: bool) -> Vec<ListEntry> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| ListEntry {
            number: i + 1,
            name: record.name.clone(),
            record_type: record.record_type().to_string(),
            location: record.location(),
            username: record.username().map(str::to_string),
            password: if reveal {
                record.password().map(str::to_string)
            } else {
                None
            },
        })
        .collect()
}

/// Render the record table.
pub fn render_table(records: &RecordSet, reveal: bool) -> String {
    const HEADERS: [&str; 6] = ["#", "Name", "Type", "Location", "Username", "Password"];

    let rows: Vec<[String; 6]> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            [
                format!("#{}", i + 1),
                record.name.clone(),
                record.record_type().to_string(),
                record.location(),
                record.username().unwrap_or_default().to_string(),
                shown_password(record.password().unwrap_or_default(), reveal),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str("  ");
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };
    push_row(&HEADERS.map(str::to_string));
    push_row(&widths.map(|w| "-".repeat(w)));
    for row in &rows {
        push_row(row);
    }
    out
}

/// Field/value lines for a single record, extras last.
pub fn record_fields(record: &Record, reveal: bool) -> Vec<(String, String)> {
    let mut fields = vec![
        ("Name".to_string(), record.name.clone()),
        ("Type".to_string(), record.record_type().to_string()),
    ];
    fn push(fields: &mut Vec<(String, String)>, label: &str, value: &str) {
        fields.push((label.to_string(), value.to_string()));
    }

    match &record.kind {
        RecordKind::Website(w) => {
            push(&mut fields, "URL", &w.url);
            push(&mut fields, "Username", &w.username);
            push(&mut fields, "Password", &shown_password(&w.password, reveal));
        }
        RecordKind::Server(s) => {
            push(&mut fields, "Host", &s.host);
            push(&mut fields, "Port", &s.port);
            push(&mut fields, "Username", &s.username);
            push(&mut fields, "Password", &shown_password(&s.password, reveal));
        }
        RecordKind::Database(db) => {
            push(&mut fields, "Engine", &db.kind().to_string());
            match db {
                DatabaseConnection::Sqlite { path } => push(&mut fields, "File", path),
                DatabaseConnection::MySql(net) | DatabaseConnection::PostgreSql(net) => {
                    push(&mut fields, "Host", &net.host);
                    push(&mut fields, "Port", &net.port);
                    push(&mut fields, "Database", &net.database_name);
                    push(&mut fields, "Username", &net.username);
                    push(&mut fields, "Password", &shown_password(&net.password, reveal));
                }
            }
        }
    }

    for (key, value) in &record.extra {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        fields.push((key.clone(), text));
    }
    fields
}

/// Print a record's fields with an optional colored header.
pub fn print_record(number: usize, record: &Record, reveal: bool, use_color: bool) {
    println!();
    if use_color {
        use colored::Colorize;
        println!("  {} {}", format!("#{number}").dimmed(), record.name.bold());
    } else {
        println!("  #{number} {}", record.name);
    }
    println!("  {}", "-".repeat(35));

    let fields = record_fields(record, reveal);
    let label_width = fields
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    for (label, value) in fields {
        println!("    {:<label_width$}  {value}", format!("{label}:"), label_width = label_width + 1);
    }
    println!();
}

/// Print a success line, `✓` when colored and `[OK]` otherwise.
pub fn print_success(message: &str, use_color: bool) {
    if use_color {
        use colored::Colorize;
        println!("{} {message}", "✓".green());
    } else {
        println!("[OK] {message}");
    }
}

/// Print a warning line to stderr.
pub fn print_warning(message: &str, use_color: bool) {
    if use_color {
        use colored::Colorize;
        eprintln!("{} {message}", "!".yellow());
    } else {
        eprintln!("[WARN] {message}");
    }
}

#[cfg(test)]
mod tests {
    use coffer_core::{NetworkDatabase, Server, Website};

    use super::*;

    fn records() -> RecordSet {
        RecordSet::from(vec![
            Record::new(
                "git",
                RecordKind::Website(Website {
                    url: "https://x.test".into(),
                    username: "u".into(),
                    password: "s3cr3t".into(),
                }),
            ),
            Record::new(
                "orders",
                RecordKind::Database(DatabaseConnection::PostgreSql(NetworkDatabase {
                    host: "db.test".into(),
                    port: "5432".into(),
                    username: "app".into(),
                    password: String::new(),
                    database_name: "orders".into(),
                })),
            ),
        ])
    }

    #[test]
    fn mask_hides_value_but_not_emptiness() {
        assert_eq!(mask_password("s3cr3t"), MASK);
        assert_eq!(mask_password(""), "");
    }

    #[test]
    fn table_masks_passwords_by_default() {
        let table = render_table(&records(), false);
        assert!(!table.contains("s3cr3t"));
        assert!(table.contains(MASK));
        assert!(table.contains("db.test:5432"));
        assert!(table.contains("#2"));
    }

    #[test]
    fn table_reveals_on_request() {
        assert!(render_table(&records(), true).contains("s3cr3t"));
    }

    #[test]
    fn json_entries_omit_password_unless_revealed() {
        let hidden = serde_json::to_string(&list_entries(&records(), false)).unwrap();
        assert!(!hidden.contains("password"));
        assert!(hidden.contains("\"type\":\"Website\""));

        let shown = serde_json::to_string(&list_entries(&records(), true)).unwrap();
        assert!(shown.contains("\"password\":\"s3cr3t\""));
    }

    #[test]
    fn record_fields_include_extras() {
        let mut record = Record::new("box", RecordKind::Server(Server::default()));
        record
            .extra
            .insert("notes".into(), serde_json::Value::String("rack 4".into()));
        let fields = record_fields(&record, false);
        assert!(fields.contains(&("Port".to_string(), "22".to_string())));
        assert!(fields.contains(&("notes".to_string(), "rack 4".to_string())));
    }
}
