// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{ExpenseStore, Identity, LedgerStore};
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(conn, sub)?,
        Some(("spend-by-category", sub)) => spend_by_category(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn balances(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let ledgers = LedgerStore::new(conn, Identity::current(conn)).get_all();
    let mut data = Vec::new();
    let mut to_receive = Decimal::ZERO;
    let mut to_give = Decimal::ZERO;
    for ledger in ledgers.values() {
        if ledger.balance > Decimal::ZERO {
            to_receive += ledger.balance;
        } else {
            to_give += -ledger.balance;
        }
        data.push(vec![
            ledger.name.clone(),
            ledger.phone.clone().unwrap_or_default(),
            fmt_money(&ledger.balance),
        ]);
    }
    data.push(vec!["(to receive)".into(), String::new(), fmt_money(&to_receive)]);
    data.push(vec!["(to give)".into(), String::new(), fmt_money(&to_give)]);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Ledger", "Phone", "Balance"], data));
    }
    Ok(())
}

fn spend_by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;

    use std::collections::HashMap;
    let mut agg: HashMap<String, Decimal> = HashMap::new();
    for expense in ExpenseStore::new(conn, Identity::current(conn)).get_all() {
        if expense.date.format("%Y-%m").to_string() != month {
            continue;
        }
        *agg.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
    }

    let mut items: Vec<_> = agg.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    let data: Vec<Vec<String>> = items
        .into_iter()
        .map(|(cat, amt)| vec![cat, fmt_money(&amt)])
        .collect();

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Category", "Spent"], data));
    }
    Ok(())
}
