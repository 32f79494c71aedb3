// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use crate::store::{Identity, LedgerStore};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("statement", sub)) => export_statement(conn, sub),
        _ => Ok(()),
    }
}

fn export_statement(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ledger_id = sub.get_one::<String>("ledger").unwrap();
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let all = LedgerStore::new(conn, Identity::current(conn)).get_all();
    let ledger = all
        .get(ledger_id.as_str())
        .ok_or_else(|| anyhow!("Ledger '{}' not found", ledger_id))?;

    let mut txs: Vec<&Transaction> = ledger.transactions.iter().collect();
    txs.sort_by(|a, b| a.date.cmp(&b.date));

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "type", "amount", "note", "balanceAfter"])?;
            for tx in txs {
                wtr.write_record([
                    tx.date.format("%Y-%m-%d").to_string(),
                    tx.r#type.as_str().to_string(),
                    tx.amount.to_string(),
                    tx.note.clone().unwrap_or_default(),
                    tx.balance_after.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for tx in txs {
                items.push(json!({
                    "date": tx.date.format("%Y-%m-%d").to_string(),
                    "type": tx.r#type.as_str(),
                    "amount": tx.amount,
                    "note": tx.note,
                    "balanceAfter": tx.balance_after,
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
        }
    }
    println!("Exported statement for '{}' to {}", ledger.name, out);
    Ok(())
}
