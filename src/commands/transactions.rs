// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, TxType};
use crate::store::{Identity, LedgerStore};
use crate::utils::{fmt_money, maybe_print_json, new_id, parse_amount, parse_date, pretty_table};
use anyhow::{Result, anyhow};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger_id = sub.get_one::<String>("ledger").unwrap();
    let r#type: TxType = sub.get_one::<String>("type").unwrap().parse()?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => Utc::now(),
    };
    let note = sub.get_one::<String>("note").cloned();
    let bill_photo = sub.get_one::<String>("bill-photo").cloned();

    let tx = Transaction {
        id: new_id(),
        r#type,
        amount,
        date,
        display_date: Some(date.format("%d %b %Y").to_string()),
        note,
        bill_photo,
        balance_after: Decimal::ZERO,
    };
    let tx_id = tx.id.clone();

    let store = LedgerStore::new(conn, Identity::current(conn));
    if !store.upsert_transaction(ledger_id, tx) {
        return Err(anyhow!("Ledger '{}' not found", ledger_id));
    }
    crate::sync::fire_and_forget_push(conn);
    println!(
        "Recorded {} {} on ledger '{}' ({})",
        r#type.as_str(),
        fmt_money(&amount),
        ledger_id,
        tx_id
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger_id = sub.get_one::<String>("ledger").unwrap();
    let id = sub.get_one::<String>("id").unwrap();

    let store = LedgerStore::new(conn, Identity::current(conn));
    let all = store.get_all();
    let ledger = all
        .get(ledger_id.as_str())
        .ok_or_else(|| anyhow!("Ledger '{}' not found", ledger_id))?;
    let mut tx = ledger
        .transactions
        .iter()
        .find(|t| t.id == *id)
        .cloned()
        .ok_or_else(|| anyhow!("Transaction '{}' not found on ledger '{}'", id, ledger_id))?;

    if let Some(t) = sub.get_one::<String>("type") {
        tx.r#type = t.parse()?;
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        tx.amount = parse_amount(a)?;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        tx.date = parse_date(d)?;
        tx.display_date = Some(tx.date.format("%d %b %Y").to_string());
    }
    if let Some(n) = sub.get_one::<String>("note") {
        tx.note = Some(n.clone());
    }
    if let Some(p) = sub.get_one::<String>("bill-photo") {
        tx.bill_photo = Some(p.clone());
    }

    if !store.upsert_transaction(ledger_id, tx) {
        return Err(anyhow!("Could not save transaction '{}'", id));
    }
    crate::sync::fire_and_forget_push(conn);
    println!("Updated transaction '{}'", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger_id = sub.get_one::<String>("ledger").unwrap();
    let id = sub.get_one::<String>("id").unwrap();
    let store = LedgerStore::new(conn, Identity::current(conn));
    if !store.delete_transaction(ledger_id, id) {
        return Err(anyhow!(
            "Transaction '{}' not found on ledger '{}'",
            id,
            ledger_id
        ));
    }
    // A delete reshapes the whole chain, so the mirror gets a full resync.
    crate::sync::fire_and_forget_push(conn);
    println!("Removed transaction '{}'", id);
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub r#type: String,
    pub amount: String,
    pub note: String,
    pub balance_after: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let ledger_id = sub.get_one::<String>("ledger").unwrap();
    let all = LedgerStore::new(conn, Identity::current(conn)).get_all();
    let ledger = all
        .get(ledger_id.as_str())
        .ok_or_else(|| anyhow!("Ledger '{}' not found", ledger_id))?;

    let mut txs: Vec<&Transaction> = ledger.transactions.iter().collect();
    txs.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txs.truncate(*limit);
    }

    Ok(txs
        .into_iter()
        .map(|tx| TransactionRow {
            id: tx.id.clone(),
            date: tx.date.format("%Y-%m-%d").to_string(),
            r#type: tx.r#type.as_str().to_string(),
            amount: fmt_money(&tx.amount),
            note: tx.note.clone().unwrap_or_default(),
            balance_after: fmt_money(&tx.balance_after),
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.date.clone(),
                    r.r#type.clone(),
                    r.amount.clone(),
                    r.note.clone(),
                    r.balance_after.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Type", "Amount", "Note", "Balance"], rows)
        );
    }
    Ok(())
}
