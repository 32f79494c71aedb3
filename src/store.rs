// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::db::{kv_delete, kv_get, kv_put};
use crate::models::{
    BackupSettings, Category, Expense, Ledger, Profile, SyncStatus, Transaction, ValidationError,
};

pub const LEDGERS: &str = "ledgers";
pub const EXPENSES: &str = "expenses";
pub const CATEGORIES: &str = "categories";
pub const SETTINGS: &str = "settings";
pub const PROFILE: &str = "profile";

pub const GUEST: &str = "guest";

const IDENTITY_KEY: &str = "identity";

/// The signed-in user id, or the guest fallback. Every collection key is
/// namespaced by it, so guest data and per-user data never mix.
#[derive(Debug, Clone)]
pub struct Identity {
    uid: Option<String>,
}

impl Identity {
    pub fn current(conn: &Connection) -> Identity {
        let uid = kv_get(conn, IDENTITY_KEY).unwrap_or_else(|err| {
            warn!("identity lookup failed, falling back to guest: {err:#}");
            None
        });
        Identity { uid }
    }

    pub fn authenticated(uid: impl Into<String>) -> Identity {
        Identity {
            uid: Some(uid.into()),
        }
    }

    pub fn guest() -> Identity {
        Identity { uid: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.uid.is_some()
    }

    pub fn uid(&self) -> &str {
        self.uid.as_deref().unwrap_or(GUEST)
    }

    pub fn key(&self, collection: &str) -> String {
        format!("{}_{}", collection, self.uid())
    }
}

pub fn login(conn: &Connection, uid: &str) -> Result<()> {
    kv_put(conn, IDENTITY_KEY, uid.trim())
}

pub fn logout(conn: &Connection) -> Result<()> {
    kv_delete(conn, IDENTITY_KEY)
}

/// Absent and corrupt blobs both read as the default; the failure is
/// logged, never surfaced.
fn load_blob<T: DeserializeOwned + Default>(conn: &Connection, key: &str) -> T {
    match kv_get(conn, key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("discarding corrupt blob at '{key}': {err}");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(err) => {
            warn!("read of '{key}' failed: {err:#}");
            T::default()
        }
    }
}

fn store_blob<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let raw =
        serde_json::to_string(value).with_context(|| format!("Serialize blob for '{}'", key))?;
    kv_put(conn, key, &raw)
}

/// Canonical per-identity collection of customer ledgers. Every mutation is
/// a whole-collection read-modify-write of one JSON blob; the boolean
/// contract methods log storage failures and report `false` instead of
/// erroring.
pub struct LedgerStore<'a> {
    conn: &'a Connection,
    identity: Identity,
}

impl<'a> LedgerStore<'a> {
    pub fn new(conn: &'a Connection, identity: Identity) -> Self {
        Self { conn, identity }
    }

    fn key(&self) -> String {
        self.identity.key(LEDGERS)
    }

    pub fn get_all(&self) -> BTreeMap<String, Ledger> {
        load_blob(self.conn, &self.key())
    }

    /// Upsert one ledger, then rewrite the entire collection.
    pub fn save(&self, ledger: &Ledger) -> bool {
        let mut all = self.get_all();
        all.insert(ledger.id.clone(), ledger.clone());
        self.persist(&all)
    }

    pub fn delete_ledger(&self, id: &str) -> bool {
        let mut all = self.get_all();
        if all.remove(id).is_none() {
            return false;
        }
        self.persist(&all)
    }

    /// Remove one transaction and rebuild the ledger's balance chain with
    /// the uniform sign convention (credit adds, debit subtracts).
    pub fn delete_transaction(&self, ledger_id: &str, tx_id: &str) -> bool {
        let mut all = self.get_all();
        let Some(ledger) = all.get_mut(ledger_id) else {
            return false;
        };
        let before = ledger.transactions.len();
        ledger.transactions.retain(|tx| tx.id != tx_id);
        if ledger.transactions.len() == before {
            return false;
        }
        ledger.recalculate();
        self.persist(&all)
    }

    /// The add/edit path: insert or replace by transaction id, then rebuild
    /// the chain.
    pub fn upsert_transaction(&self, ledger_id: &str, tx: Transaction) -> bool {
        let mut all = self.get_all();
        let Some(ledger) = all.get_mut(ledger_id) else {
            return false;
        };
        if let Some(slot) = ledger.transactions.iter_mut().find(|t| t.id == tx.id) {
            *slot = tx;
        } else {
            ledger.transactions.push(tx);
        }
        ledger.recalculate();
        self.persist(&all)
    }

    /// Wholesale overwrite, used by sync pull and backup import.
    pub fn replace_all(&self, all: &BTreeMap<String, Ledger>) -> Result<()> {
        store_blob(self.conn, &self.key(), all)
    }

    fn persist(&self, all: &BTreeMap<String, Ledger>) -> bool {
        match self.replace_all(all) {
            Ok(()) => true,
            Err(err) => {
                warn!("write of '{}' failed: {err:#}", self.key());
                false
            }
        }
    }
}

/// Daily expenses; independent of the ledgers, no balance linkage.
pub struct ExpenseStore<'a> {
    conn: &'a Connection,
    identity: Identity,
}

impl<'a> ExpenseStore<'a> {
    pub fn new(conn: &'a Connection, identity: Identity) -> Self {
        Self { conn, identity }
    }

    fn key(&self) -> String {
        self.identity.key(EXPENSES)
    }

    pub fn get_all(&self) -> Vec<Expense> {
        load_blob(self.conn, &self.key())
    }

    pub fn save(&self, expense: &Expense) -> bool {
        let mut all = self.get_all();
        if let Some(slot) = all.iter_mut().find(|e| e.id == expense.id) {
            *slot = expense.clone();
        } else {
            all.push(expense.clone());
        }
        self.persist(&all)
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut all = self.get_all();
        let before = all.len();
        all.retain(|e| e.id != id);
        if all.len() == before {
            return false;
        }
        self.persist(&all)
    }

    pub fn replace_all(&self, all: &[Expense]) -> Result<()> {
        store_blob(self.conn, &self.key(), &all)
    }

    fn persist(&self, all: &[Expense]) -> bool {
        match self.replace_all(all) {
            Ok(()) => true,
            Err(err) => {
                warn!("write of '{}' failed: {err:#}", self.key());
                false
            }
        }
    }
}

/// Expense categories. The built-in defaults are seeded on first read and
/// survive every mutation; user-added categories are free to change.
pub struct CategoryStore<'a> {
    conn: &'a Connection,
    identity: Identity,
}

impl<'a> CategoryStore<'a> {
    pub fn new(conn: &'a Connection, identity: Identity) -> Self {
        Self { conn, identity }
    }

    fn key(&self) -> String {
        self.identity.key(CATEGORIES)
    }

    pub fn get_all(&self) -> Vec<Category> {
        let mut all: Vec<Category> = load_blob(self.conn, &self.key());
        if seed_defaults(&mut all) {
            if let Err(err) = store_blob(self.conn, &self.key(), &all) {
                warn!("seeding default categories failed: {err:#}");
            }
        }
        all
    }

    pub fn add(&self, category: Category) -> Result<()> {
        let mut all = self.get_all();
        let name = category.id.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::UnknownCategory(name).into());
        }
        if all.iter().any(|c| c.id.eq_ignore_ascii_case(&name)) {
            return Err(ValidationError::DuplicateCategory(name).into());
        }
        all.push(Category {
            id: name,
            icon: category.icon,
            color: category.color,
        });
        store_blob(self.conn, &self.key(), &all)
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        if Category::is_default(from) {
            return Err(ValidationError::DefaultCategory(from.to_string()).into());
        }
        let to = to.trim();
        let mut all = self.get_all();
        if all
            .iter()
            .any(|c| c.id.eq_ignore_ascii_case(to) && !c.id.eq_ignore_ascii_case(from))
        {
            return Err(ValidationError::DuplicateCategory(to.to_string()).into());
        }
        let Some(slot) = all.iter_mut().find(|c| c.id.eq_ignore_ascii_case(from)) else {
            return Err(ValidationError::UnknownCategory(from.to_string()).into());
        };
        slot.id = to.to_string();
        store_blob(self.conn, &self.key(), &all)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        if Category::is_default(name) {
            return Err(ValidationError::DefaultCategory(name.to_string()).into());
        }
        let mut all = self.get_all();
        let before = all.len();
        all.retain(|c| !c.id.eq_ignore_ascii_case(name));
        if all.len() == before {
            return Err(ValidationError::UnknownCategory(name.to_string()).into());
        }
        store_blob(self.conn, &self.key(), &all)
    }

    /// Wholesale overwrite from sync/import; the defaults are re-seeded so
    /// a foreign collection can never remove them.
    pub fn replace_all(&self, categories: &[Category]) -> Result<()> {
        let mut all = categories.to_vec();
        seed_defaults(&mut all);
        store_blob(self.conn, &self.key(), &all)
    }
}

fn seed_defaults(all: &mut Vec<Category>) -> bool {
    let mut changed = false;
    for (index, default) in Category::defaults().into_iter().enumerate() {
        if !all.iter().any(|c| c.id.eq_ignore_ascii_case(&default.id)) {
            all.insert(index.min(all.len()), default);
            changed = true;
        }
    }
    changed
}

/// Per-identity backup settings (auto-backup flag, last sync stamp, status).
pub struct SettingsStore<'a> {
    conn: &'a Connection,
    identity: Identity,
}

impl<'a> SettingsStore<'a> {
    pub fn new(conn: &'a Connection, identity: Identity) -> Self {
        Self { conn, identity }
    }

    fn key(&self) -> String {
        self.identity.key(SETTINGS)
    }

    pub fn get(&self) -> BackupSettings {
        load_blob(self.conn, &self.key())
    }

    pub fn set(&self, settings: &BackupSettings) -> Result<()> {
        store_blob(self.conn, &self.key(), settings)
    }

    pub fn set_auto_backup(&self, on: bool) -> Result<()> {
        let mut settings = self.get();
        settings.auto_backup = on;
        self.set(&settings)
    }

    pub fn set_status(&self, status: SyncStatus) -> Result<()> {
        let mut settings = self.get();
        settings.sync_status = status;
        self.set(&settings)
    }

    /// A completed sync stamps `last_sync` and lands back on idle.
    pub fn mark_synced(&self, at: DateTime<Utc>) -> Result<()> {
        let mut settings = self.get();
        settings.last_sync = Some(at);
        settings.sync_status = SyncStatus::Idle;
        self.set(&settings)
    }
}

/// Business profile and bank details shown on statements.
pub struct ProfileStore<'a> {
    conn: &'a Connection,
    identity: Identity,
}

impl<'a> ProfileStore<'a> {
    pub fn new(conn: &'a Connection, identity: Identity) -> Self {
        Self { conn, identity }
    }

    fn key(&self) -> String {
        self.identity.key(PROFILE)
    }

    pub fn get(&self) -> Option<Profile> {
        load_blob(self.conn, &self.key())
    }

    pub fn set(&self, profile: &Profile) -> Result<()> {
        store_blob(self.conn, &self.key(), profile)
    }
}
