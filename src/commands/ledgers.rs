// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Ledger;
use crate::store::{Identity, LedgerStore};
use crate::utils::{fmt_money, maybe_print_json, new_id, pretty_table, validate_phone};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let phone = sub
        .get_one::<String>("phone")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let address = sub
        .get_one::<String>("address")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(ref phone) = phone {
        validate_phone(phone)?;
    }

    let ledger = Ledger::new(new_id(), name, phone, address);
    let store = LedgerStore::new(conn, Identity::current(conn));
    if !store.save(&ledger) {
        return Err(anyhow!("Could not save ledger '{}'", ledger.name));
    }
    crate::sync::fire_and_forget_push(conn);
    println!("Added ledger '{}' ({})", ledger.name, ledger.id);
    Ok(())
}

#[derive(Serialize)]
pub struct LedgerRow {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub balance: String,
    pub transactions: usize,
}

pub fn rows(conn: &Connection) -> Vec<LedgerRow> {
    LedgerStore::new(conn, Identity::current(conn))
        .get_all()
        .into_values()
        .map(|l| LedgerRow {
            id: l.id.clone(),
            name: l.name.clone(),
            phone: l.phone.clone().unwrap_or_default(),
            balance: fmt_money(&l.balance),
            transactions: l.transactions.len(),
        })
        .collect()
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = rows(conn);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let table_rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.name.clone(),
                    r.phone.clone(),
                    r.balance.clone(),
                    r.transactions.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Name", "Phone", "Balance", "Txns"], table_rows)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let all = LedgerStore::new(conn, Identity::current(conn)).get_all();
    let ledger = all
        .get(id.as_str())
        .ok_or_else(|| anyhow!("Ledger '{}' not found", id))?;

    if maybe_print_json(json_flag, jsonl_flag, ledger)? {
        return Ok(());
    }

    println!(
        "{} ({}){}",
        ledger.name,
        ledger.id,
        ledger
            .phone
            .as_deref()
            .map(|p| format!(" · {}", p))
            .unwrap_or_default()
    );
    let rows: Vec<Vec<String>> = ledger
        .transactions
        .iter()
        .map(|tx| {
            vec![
                tx.date.format("%Y-%m-%d").to_string(),
                tx.r#type.as_str().to_string(),
                fmt_money(&tx.amount),
                tx.note.clone().unwrap_or_default(),
                fmt_money(&tx.balance_after),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Type", "Amount", "Note", "Balance"], rows)
    );
    println!("Balance: {}", fmt_money(&ledger.balance));
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let store = LedgerStore::new(conn, Identity::current(conn));
    if !store.delete_ledger(id) {
        return Err(anyhow!("Ledger '{}' not found", id));
    }
    crate::sync::fire_and_forget_remote_delete(conn, id);
    println!("Removed ledger '{}'", id);
    Ok(())
}
