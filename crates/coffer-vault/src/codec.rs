// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RecordSet <-> plaintext payload.
//!
//! The payload is a UTF-8 JSON array with one object per record. Object keys
//! are emitted in sorted order so equal record sets encode to equal bytes.

use coffer_core::{CofferError, RecordSet};
use zeroize::Zeroizing;

/// Serialize a record set into the plaintext payload.
///
/// Every record is validated first; a record that [`decode`] would reject is
/// an [`CofferError::InvalidRecord`] and nothing is encoded.
pub fn encode(records: &RecordSet) -> Result<Zeroizing<Vec<u8>>, CofferError> {
    for record in records {
        record.validate()?;
    }
    serde_json::to_vec(records)
        .map(Zeroizing::new)
        .map_err(|e| CofferError::Internal(format!("failed to encode records: {e}")))
}

/// Parse a plaintext payload back into a record set.
///
/// Anything other than a JSON array of valid record objects is a
/// [`CofferError::Format`].
pub fn decode(payload: &[u8]) -> Result<RecordSet, CofferError> {
    serde_json::from_slice(payload).map_err(|e| CofferError::Format(e.to_string()))
}

#[cfg(test)]
mod tests {
    use coffer_core::{
        DatabaseConnection, NetworkDatabase, Record, RecordKind, Server, Website,
    };
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn sample() -> RecordSet {
        let mut github = Record::new(
            "GitHub",
            RecordKind::Website(Website {
                url: "https://github.com".into(),
                username: "octo".into(),
                password: "hunter2".into(),
            }),
        );
        github.extra.insert("notes".into(), json!({"2fa": true}));

        RecordSet::from(vec![
            github,
            Record::new(
                "build box",
                RecordKind::Server(Server {
                    host: "10.0.0.5".into(),
                    ..Server::default()
                }),
            ),
            Record::new(
                "local",
                RecordKind::Database(DatabaseConnection::Sqlite {
                    path: "/tmp/app.db".into(),
                }),
            ),
            Record::new(
                "warehouse",
                RecordKind::Database(DatabaseConnection::PostgreSql(NetworkDatabase {
                    host: "db.internal".into(),
                    port: "5432".into(),
                    username: "etl".into(),
                    password: "s3cret".into(),
                    database_name: "dw".into(),
                })),
            ),
        ])
    }

    #[test]
    fn round_trip_preserves_order_and_extras() {
        let records = sample();
        let decoded = decode(&encode(&records).unwrap()).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn encoding_is_deterministic() {
        let records = sample();
        assert_eq!(*encode(&records).unwrap(), *encode(&records).unwrap());
    }

    #[test]
    fn empty_set_encodes_to_empty_array() {
        assert_eq!(encode(&RecordSet::new()).unwrap().as_slice(), b"[]");
        assert!(decode(b"[]").unwrap().is_empty());
    }

    #[test]
    fn reference_payload_decodes() {
        let payload = br#"[
            {"name": "git", "type": "Website", "url": "https://git.example",
             "username": "me", "password": "pw"},
            {"name": "ssh", "type": "Server", "ip": "1.2.3.4", "port": 2222,
             "username": "root", "password": "toor"},
            {"name": "pg", "type": "Database", "db_type": "postgresql",
             "host": "localhost", "port": "5432", "username": "u",
             "password": "p", "database_name": "app"}
        ]"#;
        let records = decode(payload).unwrap();
        assert_eq!(records.len(), 3);
        match &records.get(1).unwrap().kind {
            RecordKind::Server(s) => assert_eq!(s.port, "2222"),
            other => panic!("expected server, got {other:?}"),
        }
    }

    #[test]
    fn non_array_payload_is_format_error() {
        assert!(matches!(
            decode(br#"{"name": "x"}"#),
            Err(CofferError::Format(_))
        ));
    }

    #[test]
    fn unknown_type_tag_is_format_error() {
        assert!(matches!(
            decode(br#"[{"name": "x", "type": "Printer"}]"#),
            Err(CofferError::Format(_))
        ));
    }

    #[test]
    fn missing_name_is_format_error() {
        assert!(matches!(
            decode(br#"[{"type": "Website"}]"#),
            Err(CofferError::Format(_))
        ));
    }

    #[test]
    fn blank_name_is_refused_at_encode() {
        let records = RecordSet::from(vec![Record::new("", RecordKind::Website(Website::default()))]);
        assert!(matches!(encode(&records), Err(CofferError::InvalidRecord(_))));
    }

    #[test]
    fn invalid_utf8_is_format_error() {
        assert!(matches!(decode(&[0xff, 0xfe]), Err(CofferError::Format(_))));
    }

    fn arb_text() -> impl Strategy<Value = String> {
        "[ -~]{0,12}"
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        let website = (arb_text(), arb_text(), arb_text()).prop_map(|(url, username, password)| {
            RecordKind::Website(Website {
                url,
                username,
                password,
            })
        });
        let server = (arb_text(), "[0-9]{1,5}", arb_text(), arb_text()).prop_map(
            |(host, port, username, password)| {
                RecordKind::Server(Server {
                    host,
                    port,
                    username,
                    password,
                })
            },
        );
        let sqlite = arb_text().prop_map(|path| RecordKind::Database(DatabaseConnection::Sqlite { path }));
        let mysql = (arb_text(), "[0-9]{1,5}", arb_text(), arb_text(), arb_text()).prop_map(
            |(host, port, username, password, database_name)| {
                RecordKind::Database(DatabaseConnection::MySql(NetworkDatabase {
                    host,
                    port,
                    username,
                    password,
                    database_name,
                }))
            },
        );
        (
            "[A-Za-z0-9][ -~]{0,15}",
            prop_oneof![website, server, sqlite, mysql],
            proptest::option::of("[a-z]{1,6}"),
        )
            .prop_map(|(name, kind, note)| {
                let mut record = Record::new(name, kind);
                if let Some(note) = note {
                    record.extra.insert("x_note".into(), serde_json::Value::String(note));
                }
                record
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(records in proptest::collection::vec(arb_record(), 0..6)) {
            let records = RecordSet::from(records);
            let decoded = decode(&encode(&records).unwrap()).unwrap();
            prop_assert_eq!(decoded, records);
        }
    }
}
