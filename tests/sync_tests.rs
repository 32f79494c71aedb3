// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use chrono::{Duration, TimeZone, Utc};
use khatabook::db;
use khatabook::models::{BackupSettings, Expense, Ledger, SyncStatus, Transaction, TxType};
use khatabook::remote::DocumentStore;
use khatabook::store::{self, ExpenseStore, Identity, LedgerStore, SettingsStore};
use khatabook::sync::SyncCoordinator;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[derive(Default)]
struct MemoryStore {
    docs: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    fn contains(&self, path: &str) -> bool {
        self.docs.lock().unwrap().contains_key(path)
    }

    fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn get(&self, path: &str) -> Option<Value> {
        self.docs.lock().unwrap().get(path).cloned()
    }

    fn insert(&self, path: &str, doc: Value) {
        self.docs.lock().unwrap().insert(path.to_string(), doc);
    }
}

impl DocumentStore for MemoryStore {
    fn put_doc(&self, path: &str, doc: &Value) -> Result<()> {
        self.docs
            .lock()
            .unwrap()
            .insert(path.to_string(), doc.clone());
        Ok(())
    }

    fn get_doc(&self, path: &str) -> Result<Option<Value>> {
        Ok(self.docs.lock().unwrap().get(path).cloned())
    }

    fn delete_doc(&self, path: &str) -> Result<()> {
        self.docs.lock().unwrap().remove(path);
        Ok(())
    }

    fn list_docs(&self, path: &str) -> Result<BTreeMap<String, Value>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix) && !k[prefix.len()..].contains('/'))
            .map(|(k, v)| (k[prefix.len()..].to_string(), v.clone()))
            .collect())
    }
}

/// Refuses every put after the first `allow` writes.
struct FlakyStore {
    inner: MemoryStore,
    allow: usize,
    puts: AtomicUsize,
}

impl FlakyStore {
    fn new(allow: usize) -> Self {
        Self {
            inner: MemoryStore::default(),
            allow,
            puts: AtomicUsize::new(0),
        }
    }
}

impl DocumentStore for FlakyStore {
    fn put_doc(&self, path: &str, doc: &Value) -> Result<()> {
        if self.puts.fetch_add(1, Ordering::SeqCst) >= self.allow {
            return Err(anyhow!("remote write refused"));
        }
        self.inner.put_doc(path, doc)
    }

    fn get_doc(&self, path: &str) -> Result<Option<Value>> {
        self.inner.get_doc(path)
    }

    fn delete_doc(&self, path: &str) -> Result<()> {
        self.inner.delete_doc(path)
    }

    fn list_docs(&self, path: &str) -> Result<BTreeMap<String, Value>> {
        self.inner.list_docs(path)
    }
}

fn tx(id: &str, r#type: TxType, amount: i64, day: u32) -> Transaction {
    Transaction {
        id: id.to_string(),
        r#type,
        amount: Decimal::from(amount),
        date: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
        display_date: None,
        note: None,
        bill_photo: None,
        balance_after: Decimal::ZERO,
    }
}

fn seed_user_data(conn: &Connection) -> Identity {
    store::login(conn, "u1").unwrap();
    let identity = Identity::current(conn);
    let ledgers = LedgerStore::new(conn, identity.clone());
    let ledger = Ledger::new("L1".into(), "Asha Stores".into(), None, None);
    assert!(ledgers.save(&ledger));
    assert!(ledgers.upsert_transaction("L1", tx("T1", TxType::Credit, 100, 1)));
    assert!(ledgers.upsert_transaction("L1", tx("T2", TxType::Debit, 30, 2)));
    let expenses = ExpenseStore::new(conn, identity.clone());
    assert!(expenses.save(&Expense {
        id: "E1".into(),
        title: "Tea".into(),
        amount: Decimal::from(20),
        category: "Food".into(),
        date: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    }));
    identity
}

#[test]
fn guest_push_writes_nothing() {
    let conn = setup();
    let remote = MemoryStore::default();
    let coordinator = SyncCoordinator::new(&conn, Identity::guest(), &remote);

    assert!(!coordinator.sync_all_to_remote().unwrap());
    assert_eq!(remote.len(), 0);
}

#[test]
fn push_writes_one_document_per_entity() {
    let conn = setup();
    let identity = seed_user_data(&conn);
    let remote = MemoryStore::default();
    let coordinator = SyncCoordinator::new(&conn, identity.clone(), &remote);

    assert!(coordinator.sync_all_to_remote().unwrap());

    assert!(remote.contains("users/u1/ledgers/L1"));
    assert!(remote.contains("users/u1/ledgers/L1/transactions/T1"));
    assert!(remote.contains("users/u1/ledgers/L1/transactions/T2"));
    assert!(remote.contains("users/u1/expenses/E1"));
    assert!(remote.contains("users/u1/settings/categories"));

    // The ledger document is a summary: transactions live in the subcollection
    let ledger_doc = remote.get("users/u1/ledgers/L1").unwrap();
    assert!(ledger_doc.get("transactions").is_none());
    assert_eq!(ledger_doc["name"], json!("Asha Stores"));

    let settings = SettingsStore::new(&conn, identity).get();
    assert!(settings.last_sync.is_some());
    assert_eq!(settings.sync_status, SyncStatus::Idle);
}

#[test]
fn failed_push_leaves_last_sync_unchanged() {
    let conn = setup();
    let identity = seed_user_data(&conn);
    let remote = FlakyStore::new(1);
    let coordinator = SyncCoordinator::new(&conn, identity.clone(), &remote);

    assert!(coordinator.sync_all_to_remote().is_err());

    let settings = SettingsStore::new(&conn, identity).get();
    assert!(settings.last_sync.is_none());
    assert_eq!(settings.sync_status, SyncStatus::Idle);
}

#[test]
fn pull_overwrites_local_wholesale_and_sorts_transactions() {
    let conn = setup();
    store::login(&conn, "u1").unwrap();
    let identity = Identity::current(&conn);

    // A local-only ledger that the remote store does not know about
    let ledgers = LedgerStore::new(&conn, identity.clone());
    assert!(ledgers.save(&Ledger::new("LOCAL".into(), "Stale".into(), None, None)));

    let remote = MemoryStore::default();
    remote.insert(
        "users/u1/ledgers/L9",
        json!({"id": "L9", "name": "Ravi Traders", "balance": "70"}),
    );
    remote.insert(
        "users/u1/ledgers/L9/transactions/T2",
        serde_json::to_value(Transaction {
            balance_after: Decimal::from(70),
            ..tx("T2", TxType::Debit, 30, 2)
        })
        .unwrap(),
    );
    remote.insert(
        "users/u1/ledgers/L9/transactions/T1",
        serde_json::to_value(Transaction {
            balance_after: Decimal::from(100),
            ..tx("T1", TxType::Credit, 100, 1)
        })
        .unwrap(),
    );

    let coordinator = SyncCoordinator::new(&conn, identity.clone(), &remote);
    let pulled = coordinator.fetch_all_from_remote().unwrap();

    assert_eq!(pulled.len(), 1);
    let local = ledgers.get_all();
    assert!(local.contains_key("L9"));
    assert!(!local.contains_key("LOCAL"));
    let ledger = &local["L9"];
    assert_eq!(ledger.balance, Decimal::from(70));
    assert_eq!(ledger.transactions[0].id, "T1");
    assert_eq!(ledger.transactions[1].id, "T2");
}

#[test]
fn deleted_ledger_is_not_resurrected_by_pull() {
    let conn = setup();
    let identity = seed_user_data(&conn);
    let remote = MemoryStore::default();
    let coordinator = SyncCoordinator::new(&conn, identity.clone(), &remote);
    assert!(coordinator.sync_all_to_remote().unwrap());

    let ledgers = LedgerStore::new(&conn, identity.clone());
    assert!(ledgers.delete_ledger("L1"));
    coordinator.delete_remote_ledger("L1").unwrap();

    // The cascade removed the subcollection too
    assert!(!remote.contains("users/u1/ledgers/L1"));
    assert!(!remote.contains("users/u1/ledgers/L1/transactions/T1"));
    assert!(!remote.contains("users/u1/ledgers/L1/transactions/T2"));

    let pulled = coordinator.fetch_all_from_remote().unwrap();
    assert!(!pulled.contains_key("L1"));
    assert!(!ledgers.get_all().contains_key("L1"));
}

#[test]
fn auto_sync_respects_the_cooldown_window() {
    let conn = setup();
    let identity = seed_user_data(&conn);
    let remote = MemoryStore::default();
    let coordinator = SyncCoordinator::new(&conn, identity.clone(), &remote);
    let settings = SettingsStore::new(&conn, identity);
    let now = Utc::now();

    settings
        .set(&BackupSettings {
            auto_backup: true,
            last_sync: Some(now - Duration::minutes(1)),
            sync_status: SyncStatus::Idle,
        })
        .unwrap();
    assert!(!coordinator.maybe_auto_sync(now).unwrap());
    assert_eq!(remote.len(), 0);

    settings
        .set(&BackupSettings {
            auto_backup: true,
            last_sync: Some(now - Duration::minutes(10)),
            sync_status: SyncStatus::Idle,
        })
        .unwrap();
    assert!(coordinator.maybe_auto_sync(now).unwrap());
    assert!(remote.contains("users/u1/ledgers/L1"));

    let refreshed = settings.get();
    assert!(refreshed.last_sync.unwrap() > now - Duration::minutes(1));
}

#[test]
fn auto_sync_is_a_noop_without_auto_backup() {
    let conn = setup();
    let identity = seed_user_data(&conn);
    let remote = MemoryStore::default();
    let coordinator = SyncCoordinator::new(&conn, identity, &remote);

    assert!(!coordinator.maybe_auto_sync(Utc::now()).unwrap());
    assert_eq!(remote.len(), 0);
}
