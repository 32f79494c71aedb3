// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use khatabook::db;
use khatabook::models::{Ledger, Transaction, TxType};
use khatabook::store::{Identity, LedgerStore};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn tx(id: &str, r#type: TxType, amount: i64, day: u32) -> Transaction {
    Transaction {
        id: id.to_string(),
        r#type,
        amount: Decimal::from(amount),
        date: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        display_date: None,
        note: None,
        bill_photo: None,
        balance_after: Decimal::ZERO,
    }
}

fn seed_ledger(store: &LedgerStore) {
    let ledger = Ledger::new("L1".into(), "Asha Stores".into(), None, None);
    assert!(store.save(&ledger));
}

#[test]
fn credit_then_debit_builds_chain() {
    let conn = setup();
    let store = LedgerStore::new(&conn, Identity::guest());
    seed_ledger(&store);

    assert!(store.upsert_transaction("L1", tx("T1", TxType::Credit, 100, 1)));
    assert!(store.upsert_transaction("L1", tx("T2", TxType::Debit, 30, 2)));

    let all = store.get_all();
    let ledger = &all["L1"];
    assert_eq!(ledger.balance, Decimal::from(70));
    let chain: Vec<Decimal> = ledger.transactions.iter().map(|t| t.balance_after).collect();
    assert_eq!(chain, vec![Decimal::from(100), Decimal::from(70)]);
}

#[test]
fn out_of_order_inserts_are_sorted_by_date() {
    let conn = setup();
    let store = LedgerStore::new(&conn, Identity::guest());
    seed_ledger(&store);

    assert!(store.upsert_transaction("L1", tx("T2", TxType::Debit, 30, 5)));
    assert!(store.upsert_transaction("L1", tx("T1", TxType::Credit, 100, 1)));

    let all = store.get_all();
    let ledger = &all["L1"];
    assert_eq!(ledger.transactions[0].id, "T1");
    assert_eq!(ledger.transactions[0].balance_after, Decimal::from(100));
    assert_eq!(ledger.transactions[1].balance_after, Decimal::from(70));
    assert_eq!(ledger.balance, Decimal::from(70));
}

#[test]
fn balance_equals_signed_sum_after_edits() {
    let conn = setup();
    let store = LedgerStore::new(&conn, Identity::guest());
    seed_ledger(&store);

    assert!(store.upsert_transaction("L1", tx("T1", TxType::Credit, 500, 1)));
    assert!(store.upsert_transaction("L1", tx("T2", TxType::Debit, 120, 2)));
    assert!(store.upsert_transaction("L1", tx("T3", TxType::Credit, 40, 3)));
    // Edit T2 in place: same id, new amount
    assert!(store.upsert_transaction("L1", tx("T2", TxType::Debit, 200, 2)));
    assert!(store.delete_transaction("L1", "T3"));

    let all = store.get_all();
    let ledger = &all["L1"];
    assert_eq!(ledger.balance, Decimal::from(300));
    assert_eq!(ledger.balance, ledger.signed_total());
    assert_eq!(ledger.transactions.len(), 2);
    let mut running = Decimal::ZERO;
    for t in &ledger.transactions {
        running += t.signed_amount();
        assert_eq!(t.balance_after, running);
    }
}

#[test]
fn delete_transaction_recomputes_with_uniform_signs() {
    let conn = setup();
    let store = LedgerStore::new(&conn, Identity::guest());
    seed_ledger(&store);

    assert!(store.upsert_transaction("L1", tx("T1", TxType::Credit, 100, 1)));
    assert!(store.upsert_transaction("L1", tx("T2", TxType::Credit, 50, 2)));
    assert!(store.upsert_transaction("L1", tx("T3", TxType::Debit, 30, 3)));

    // Removing a credit must subtract its amount, never add it
    assert!(store.delete_transaction("L1", "T2"));
    let all = store.get_all();
    assert_eq!(all["L1"].balance, Decimal::from(70));
}

#[test]
fn delete_ledger_removes_it_from_get_all() {
    let conn = setup();
    let store = LedgerStore::new(&conn, Identity::guest());
    seed_ledger(&store);

    assert!(store.delete_ledger("L1"));
    assert!(store.get_all().is_empty());
    assert!(!store.delete_ledger("L1"));
}

#[test]
fn corrupt_blob_reads_as_empty_collection() {
    let conn = setup();
    db::kv_put(&conn, "ledgers_guest", "{not json").unwrap();

    let store = LedgerStore::new(&conn, Identity::guest());
    assert!(store.get_all().is_empty());
    // And the store recovers: a save rebuilds the blob from scratch
    seed_ledger(&store);
    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn mutations_on_unknown_targets_return_false() {
    let conn = setup();
    let store = LedgerStore::new(&conn, Identity::guest());
    seed_ledger(&store);

    assert!(!store.upsert_transaction("nope", tx("T1", TxType::Credit, 10, 1)));
    assert!(!store.delete_transaction("L1", "missing"));
}

#[test]
fn identities_do_not_share_collections() {
    let conn = setup();
    let guest = LedgerStore::new(&conn, Identity::guest());
    seed_ledger(&guest);

    let user = LedgerStore::new(&conn, Identity::authenticated("u1"));
    assert!(user.get_all().is_empty());
}
