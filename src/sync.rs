// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use rusqlite::Connection;
use serde_json::json;

use crate::models::{Category, Expense, Ledger, SyncStatus, Transaction};
use crate::remote::{self, DocumentStore, HttpDocumentStore};
use crate::store::{
    CategoryStore, ExpenseStore, Identity, LedgerStore, ProfileStore, SettingsStore,
};

/// Unattended syncs fire at most once per cooldown window.
pub const AUTO_SYNC_COOLDOWN_MINUTES: i64 = 5;

/// Mirrors the local collections to and from the remote document store on a
/// best-effort, whole-collection basis. Writes are strictly sequential, one
/// document at a time; there is no batching, no retry, and no rollback of a
/// partially pushed snapshot.
pub struct SyncCoordinator<'a> {
    conn: &'a Connection,
    identity: Identity,
    remote: &'a dyn DocumentStore,
    in_flight: AtomicBool,
}

impl<'a> SyncCoordinator<'a> {
    pub fn new(conn: &'a Connection, identity: Identity, remote: &'a dyn DocumentStore) -> Self {
        Self {
            conn,
            identity,
            remote,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Push every collection. Returns Ok(false) without touching the network
    /// for a guest identity. `lastSync` advances only when every write
    /// succeeded; a failure leaves it unchanged and surfaces one error.
    pub fn sync_all_to_remote(&self) -> Result<bool> {
        if !self.identity.is_authenticated() {
            return Ok(false);
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(anyhow!("A sync is already running"));
        }
        let settings = SettingsStore::new(self.conn, self.identity.clone());
        settings.set_status(SyncStatus::Syncing)?;
        let result = self.push_all();
        self.in_flight.store(false, Ordering::SeqCst);
        settings.set_status(SyncStatus::Idle)?;
        result?;
        settings.mark_synced(Utc::now())?;
        info!("sync push complete for '{}'", self.identity.uid());
        Ok(true)
    }

    fn push_all(&self) -> Result<()> {
        let uid = self.identity.uid();
        let ledgers = LedgerStore::new(self.conn, self.identity.clone()).get_all();
        for (id, ledger) in &ledgers {
            self.remote
                .put_doc(&remote::ledger_doc(uid, id), &ledger_summary(ledger))?;
            for tx in &ledger.transactions {
                let doc = serde_json::to_value(tx).context("Serialize transaction")?;
                self.remote
                    .put_doc(&remote::transaction_doc(uid, id, &tx.id), &doc)?;
            }
        }

        for expense in &ExpenseStore::new(self.conn, self.identity.clone()).get_all() {
            let doc = serde_json::to_value(expense).context("Serialize expense")?;
            self.remote
                .put_doc(&remote::expense_doc(uid, &expense.id), &doc)?;
        }

        let categories = CategoryStore::new(self.conn, self.identity.clone()).get_all();
        self.remote.put_doc(
            &remote::categories_doc(uid),
            &serde_json::to_value(&categories).context("Serialize categories")?,
        )?;

        if let Some(profile) = ProfileStore::new(self.conn, self.identity.clone()).get() {
            self.remote.put_doc(
                &remote::profile_doc(uid),
                &serde_json::to_value(&profile).context("Serialize profile")?,
            )?;
        }
        Ok(())
    }

    /// Pull everything; the remote copy wins wholesale, no merge. Each
    /// ledger's transactions come back sorted ascending by date.
    pub fn fetch_all_from_remote(&self) -> Result<BTreeMap<String, Ledger>> {
        if !self.identity.is_authenticated() {
            return Err(anyhow!("Sign in before pulling from the remote store"));
        }
        let uid = self.identity.uid();

        let mut ledgers: BTreeMap<String, Ledger> = BTreeMap::new();
        for (id, doc) in self.remote.list_docs(&remote::ledger_collection(uid))? {
            let mut ledger: Ledger = serde_json::from_value(doc)
                .with_context(|| format!("Malformed remote ledger '{}'", id))?;
            let mut transactions = Vec::new();
            for (tx_id, tx_doc) in self
                .remote
                .list_docs(&remote::transaction_collection(uid, &id))?
            {
                let tx: Transaction = serde_json::from_value(tx_doc)
                    .with_context(|| format!("Malformed remote transaction '{}'", tx_id))?;
                transactions.push(tx);
            }
            transactions.sort_by(|a, b| a.date.cmp(&b.date));
            ledger.transactions = transactions;
            ledgers.insert(ledger.id.clone(), ledger);
        }
        LedgerStore::new(self.conn, self.identity.clone()).replace_all(&ledgers)?;

        let mut expenses = Vec::new();
        for (id, doc) in self.remote.list_docs(&remote::expense_collection(uid))? {
            let expense: Expense = serde_json::from_value(doc)
                .with_context(|| format!("Malformed remote expense '{}'", id))?;
            expenses.push(expense);
        }
        ExpenseStore::new(self.conn, self.identity.clone()).replace_all(&expenses)?;

        if let Some(doc) = self.remote.get_doc(&remote::categories_doc(uid))? {
            let categories: Vec<Category> =
                serde_json::from_value(doc).context("Malformed remote category list")?;
            CategoryStore::new(self.conn, self.identity.clone()).replace_all(&categories)?;
        }

        SettingsStore::new(self.conn, self.identity.clone()).mark_synced(Utc::now())?;
        info!("sync pull complete for '{}'", uid);
        Ok(ledgers)
    }

    /// Remote removal of one ledger. The transaction subcollection goes
    /// first so nothing is left orphaned.
    pub fn delete_remote_ledger(&self, ledger_id: &str) -> Result<()> {
        if !self.identity.is_authenticated() {
            return Ok(());
        }
        let uid = self.identity.uid();
        for (tx_id, _) in self
            .remote
            .list_docs(&remote::transaction_collection(uid, ledger_id))?
        {
            self.remote
                .delete_doc(&remote::transaction_doc(uid, ledger_id, &tx_id))?;
        }
        self.remote.delete_doc(&remote::ledger_doc(uid, ledger_id))
    }

    /// Time-debounced unattended push: only when auto-backup is on and the
    /// last sync is older than the cooldown window. Pure time debounce, no
    /// change detection.
    pub fn maybe_auto_sync(&self, now: DateTime<Utc>) -> Result<bool> {
        let settings = SettingsStore::new(self.conn, self.identity.clone()).get();
        if !settings.auto_backup {
            return Ok(false);
        }
        if let Some(last) = settings.last_sync {
            if now - last < Duration::minutes(AUTO_SYNC_COOLDOWN_MINUTES) {
                return Ok(false);
            }
        }
        self.sync_all_to_remote()
    }
}

/// The ledger document carries the summary only; transactions live in the
/// subcollection.
fn ledger_summary(ledger: &Ledger) -> serde_json::Value {
    json!({
        "id": ledger.id,
        "name": ledger.name,
        "phone": ledger.phone,
        "address": ledger.address,
        "balance": ledger.balance,
    })
}

/// Best-effort hook for mutating commands: push if auto-backup is enabled
/// and a remote is configured. Failures are logged and swallowed so the
/// local mutation always stands.
pub fn fire_and_forget_push(conn: &Connection) {
    let identity = Identity::current(conn);
    if !SettingsStore::new(conn, identity.clone()).get().auto_backup {
        return;
    }
    match HttpDocumentStore::from_settings(conn) {
        Ok(Some(remote)) => {
            let coordinator = SyncCoordinator::new(conn, identity, &remote);
            if let Err(err) = coordinator.sync_all_to_remote() {
                warn!("background sync failed: {err:#}");
            }
        }
        Ok(None) => {}
        Err(err) => warn!("remote store unavailable: {err:#}"),
    }
}

/// Ledger deletes additionally drop the remote documents, best-effort.
pub fn fire_and_forget_remote_delete(conn: &Connection, ledger_id: &str) {
    let identity = Identity::current(conn);
    if !SettingsStore::new(conn, identity.clone()).get().auto_backup {
        return;
    }
    match HttpDocumentStore::from_settings(conn) {
        Ok(Some(remote)) => {
            let coordinator = SyncCoordinator::new(conn, identity, &remote);
            if let Err(err) = coordinator.delete_remote_ledger(ledger_id) {
                warn!("remote delete of ledger '{ledger_id}' failed: {err:#}");
            }
        }
        Ok(None) => {}
        Err(err) => warn!("remote store unavailable: {err:#}"),
    }
}

/// Called once per invocation, right after the database opens: the
/// unattended sync sits behind the cooldown so reopening the app does not
/// hammer the remote store.
pub fn auto_sync_if_due(conn: &Connection) {
    let identity = Identity::current(conn);
    match HttpDocumentStore::from_settings(conn) {
        Ok(Some(remote)) => {
            let coordinator = SyncCoordinator::new(conn, identity, &remote);
            match coordinator.maybe_auto_sync(Utc::now()) {
                Ok(true) => info!("auto-sync pushed"),
                Ok(false) => {}
                Err(err) => warn!("auto-sync failed: {err:#}"),
            }
        }
        Ok(None) => {}
        Err(err) => warn!("remote store unavailable: {err:#}"),
    }
}
