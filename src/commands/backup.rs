// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{BACKUP_VERSION, BackupFile, ValidationError};
use crate::store::{CategoryStore, ExpenseStore, Identity, LedgerStore};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => export(conn, sub),
        Some(("import", sub)) => import(conn, sub),
        _ => Ok(()),
    }
}

fn export(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap().trim();
    let identity = Identity::current(conn);

    let file = BackupFile {
        version: BACKUP_VERSION,
        export_date: Utc::now(),
        ledgers: LedgerStore::new(conn, identity.clone()).get_all(),
        expenses: ExpenseStore::new(conn, identity.clone()).get_all(),
        categories: CategoryStore::new(conn, identity).get_all(),
    };
    std::fs::write(out, serde_json::to_string_pretty(&file)?)
        .with_context(|| format!("Write backup {}", out))?;
    println!(
        "Exported {} ledgers, {} expenses, {} categories to {}",
        file.ledgers.len(),
        file.expenses.len(),
        file.categories.len(),
        out
    );
    Ok(())
}

/// A backup is usable when `version` and `ledgers` are present and every
/// ledger carries an id, a name, a numeric (or decimal-string) balance, and
/// an array for `transactions` when the key exists at all.
pub fn validate_backup_file(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if !obj.contains_key("version") {
        return false;
    }
    let Some(ledgers) = obj.get("ledgers").and_then(Value::as_object) else {
        return false;
    };
    for ledger in ledgers.values() {
        let Some(ledger) = ledger.as_object() else {
            return false;
        };
        if !ledger.get("id").is_some_and(Value::is_string) {
            return false;
        }
        if !ledger.get("name").is_some_and(Value::is_string) {
            return false;
        }
        match ledger.get("balance") {
            Some(Value::Number(_)) => {}
            Some(Value::String(s)) if s.parse::<Decimal>().is_ok() => {}
            _ => return false,
        }
        if let Some(txs) = ledger.get("transactions") {
            if !txs.is_array() {
                return false;
            }
        }
    }
    true
}

/// Validate first; a rejected file leaves local storage untouched.
fn import(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("Open backup {}", path))?;
    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("Parse backup {}", path))?;
    if !validate_backup_file(&value) {
        return Err(ValidationError::Backup.into());
    }
    let file: BackupFile =
        serde_json::from_value(value).with_context(|| format!("Parse backup {}", path))?;

    let identity = Identity::current(conn);
    LedgerStore::new(conn, identity.clone()).replace_all(&file.ledgers)?;
    ExpenseStore::new(conn, identity.clone()).replace_all(&file.expenses)?;
    CategoryStore::new(conn, identity).replace_all(&file.categories)?;

    crate::sync::fire_and_forget_push(conn);
    println!(
        "Imported {} ledgers, {} expenses, {} categories from {}",
        file.ledgers.len(),
        file.expenses.len(),
        file.categories.len(),
        path
    );
    Ok(())
}
