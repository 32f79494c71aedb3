// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Expense, ValidationError};
use crate::store::{CategoryStore, ExpenseStore, Identity};
use crate::utils::{fmt_money, maybe_print_json, new_id, parse_amount, parse_date, parse_month, pretty_table};
use anyhow::{Result, anyhow};
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let title = sub.get_one::<String>("title").unwrap().trim().to_string();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let category_raw = sub.get_one::<String>("category").unwrap().trim();
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => Utc::now(),
    };

    let identity = Identity::current(conn);
    let category = CategoryStore::new(conn, identity.clone())
        .get_all()
        .into_iter()
        .find(|c| c.id.eq_ignore_ascii_case(category_raw))
        .map(|c| c.id)
        .ok_or_else(|| ValidationError::UnknownCategory(category_raw.to_string()))?;

    let expense = Expense {
        id: new_id(),
        title,
        amount,
        category,
        date,
    };
    if !ExpenseStore::new(conn, identity).save(&expense) {
        return Err(anyhow!("Could not save expense '{}'", expense.title));
    }
    crate::sync::fire_and_forget_push(conn);
    println!(
        "Recorded expense '{}' {} ({})",
        expense.title,
        fmt_money(&expense.amount),
        expense.id
    );
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub title: String,
    pub category: String,
    pub amount: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<ExpenseRow>> {
    let month = match sub.get_one::<String>("month") {
        Some(m) => Some(parse_month(m)?),
        None => None,
    };
    let mut expenses = ExpenseStore::new(conn, Identity::current(conn)).get_all();
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(month) = month {
        expenses.retain(|e| e.date.format("%Y-%m").to_string() == month);
    }
    if let Some(limit) = sub.get_one::<usize>("limit") {
        expenses.truncate(*limit);
    }
    Ok(expenses
        .into_iter()
        .map(|e| ExpenseRow {
            id: e.id.clone(),
            date: e.date.format("%Y-%m-%d").to_string(),
            title: e.title.clone(),
            category: e.category.clone(),
            amount: fmt_money(&e.amount),
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
                    r.title.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Title", "Category", "Amount"], rows)
        );
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    if !ExpenseStore::new(conn, Identity::current(conn)).delete(id) {
        return Err(anyhow!("Expense '{}' not found", id));
    }
    crate::sync::fire_and_forget_push(conn);
    println!("Removed expense '{}'", id);
    Ok(())
}
