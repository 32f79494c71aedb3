// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use khatabook::commands::exporter;
use khatabook::models::{Ledger, Transaction, TxType};
use khatabook::store::{Identity, LedgerStore};
use khatabook::{cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let store = LedgerStore::new(&conn, Identity::guest());
    assert!(store.save(&Ledger::new("L1".into(), "Asha Stores".into(), None, None)));
    assert!(store.upsert_transaction(
        "L1",
        Transaction {
            id: "T1".into(),
            r#type: TxType::Credit,
            amount: Decimal::from(100),
            date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            display_date: None,
            note: None,
            bill_photo: None,
            balance_after: Decimal::ZERO,
        }
    ));
    assert!(store.upsert_transaction(
        "L1",
        Transaction {
            id: "T2".into(),
            r#type: TxType::Debit,
            amount: Decimal::from(30),
            date: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
            display_date: None,
            note: None,
            bill_photo: None,
            balance_after: Decimal::ZERO,
        }
    ));
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(args.iter().copied());
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn statement_csv_carries_the_running_balance() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("statement.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &conn,
        &[
            "khatabook", "export", "statement", "--ledger", "L1", "--format", "csv", "--out",
            &out_str,
        ],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next().unwrap(), "date,type,amount,note,balanceAfter");
    assert_eq!(lines.next().unwrap(), "2025-01-01,credit,100,,100");
    assert_eq!(lines.next().unwrap(), "2025-01-02,debit,30,,70");
}

#[test]
fn statement_json_streams_pretty_json() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("statement.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &conn,
        &[
            "khatabook", "export", "statement", "--ledger", "L1", "--format", "json", "--out",
            &out_str,
        ],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2025-01-01",
                "type": "credit",
                "amount": "100",
                "note": null,
                "balanceAfter": "100"
            },
            {
                "date": "2025-01-02",
                "type": "debit",
                "amount": "30",
                "note": null,
                "balanceAfter": "70"
            }
        ])
    );
}

#[test]
fn statement_rejects_an_unknown_format() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("statement.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let err = run_export(
        &conn,
        &[
            "khatabook", "export", "statement", "--ledger", "L1", "--format", "xml", "--out",
            &out_str,
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out_path.exists());
}
