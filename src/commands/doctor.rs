// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use crate::store::{CategoryStore, ExpenseStore, Identity, LedgerStore};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let identity = Identity::current(conn);
    let mut rows = Vec::new();

    // 1) Ledger balance invariants
    let ledgers = LedgerStore::new(conn, identity.clone()).get_all();
    for (key, ledger) in &ledgers {
        if *key != ledger.id {
            rows.push(vec![
                "key_mismatch".into(),
                format!("'{}' stored under '{}'", ledger.id, key),
            ]);
        }
        let mut txs: Vec<&Transaction> = ledger.transactions.iter().collect();
        txs.sort_by(|a, b| a.date.cmp(&b.date));

        let mut running = Decimal::ZERO;
        for tx in txs {
            if tx.amount <= Decimal::ZERO {
                rows.push(vec![
                    "non_positive_amount".into(),
                    format!("{} / {}", ledger.name, tx.id),
                ]);
            }
            running += tx.signed_amount();
            if tx.balance_after != running {
                rows.push(vec![
                    "balance_chain_drift".into(),
                    format!(
                        "{} / {} (stored {}, expected {})",
                        ledger.name, tx.id, tx.balance_after, running
                    ),
                ]);
            }
        }
        if ledger.balance != running {
            rows.push(vec![
                "balance_drift".into(),
                format!(
                    "{} (stored {}, expected {})",
                    ledger.name, ledger.balance, running
                ),
            ]);
        }
    }

    // 2) Expenses pointing at unknown categories
    let categories = CategoryStore::new(conn, identity.clone()).get_all();
    for expense in ExpenseStore::new(conn, identity).get_all() {
        if !categories
            .iter()
            .any(|c| c.id.eq_ignore_ascii_case(&expense.category))
        {
            rows.push(vec![
                "unknown_expense_category".into(),
                format!("{} ({})", expense.title, expense.category),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
