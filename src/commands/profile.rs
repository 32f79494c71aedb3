// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{BankDetails, Profile};
use crate::store::{Identity, ProfileStore};
use crate::utils::{maybe_print_json, pretty_table, validate_phone};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = ProfileStore::new(conn, Identity::current(conn));
    let existing = store.get();

    let name = sub
        .get_one::<String>("name")
        .map(|s| s.trim().to_string())
        .or_else(|| existing.as_ref().map(|p| p.name.clone()))
        .ok_or_else(|| anyhow!("Profile needs at least a name; pass --name"))?;

    let mut profile = existing.unwrap_or(Profile {
        name: name.clone(),
        business_name: None,
        phone: None,
        email: None,
        address: None,
        bank: None,
    });
    profile.name = name;

    if let Some(v) = sub.get_one::<String>("business") {
        profile.business_name = Some(v.trim().to_string());
    }
    if let Some(v) = sub.get_one::<String>("phone") {
        validate_phone(v)?;
        profile.phone = Some(v.trim().to_string());
    }
    if let Some(v) = sub.get_one::<String>("email") {
        profile.email = Some(v.trim().to_string());
    }
    if let Some(v) = sub.get_one::<String>("address") {
        profile.address = Some(v.trim().to_string());
    }

    let account_name = sub.get_one::<String>("account-name");
    let account_number = sub.get_one::<String>("account-number");
    if account_name.is_some() || account_number.is_some() {
        let mut bank = profile.bank.take().unwrap_or(BankDetails {
            account_name: String::new(),
            account_number: String::new(),
            ifsc: None,
            upi_id: None,
        });
        if let Some(v) = account_name {
            bank.account_name = v.trim().to_string();
        }
        if let Some(v) = account_number {
            bank.account_number = v.trim().to_string();
        }
        if let Some(v) = sub.get_one::<String>("ifsc") {
            bank.ifsc = Some(v.trim().to_string());
        }
        if let Some(v) = sub.get_one::<String>("upi") {
            bank.upi_id = Some(v.trim().to_string());
        }
        if bank.account_name.is_empty() || bank.account_number.is_empty() {
            return Err(anyhow!(
                "Bank details need both --account-name and --account-number"
            ));
        }
        profile.bank = Some(bank);
    } else if let Some(v) = sub.get_one::<String>("upi") {
        // UPI works without a full bank account
        let mut bank = profile.bank.take().unwrap_or(BankDetails {
            account_name: profile.name.clone(),
            account_number: String::new(),
            ifsc: None,
            upi_id: None,
        });
        bank.upi_id = Some(v.trim().to_string());
        profile.bank = Some(bank);
    }

    store.set(&profile)?;
    crate::sync::fire_and_forget_push(conn);
    println!("Profile saved for '{}'", profile.name);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = ProfileStore::new(conn, Identity::current(conn))
        .get()
        .ok_or_else(|| anyhow!("No profile yet; run `khatabook profile set --name <NAME>`"))?;

    if maybe_print_json(json_flag, jsonl_flag, &profile)? {
        return Ok(());
    }

    let mut rows = vec![vec!["Name".to_string(), profile.name.clone()]];
    if let Some(v) = &profile.business_name {
        rows.push(vec!["Business".to_string(), v.clone()]);
    }
    if let Some(v) = &profile.phone {
        rows.push(vec!["Phone".to_string(), v.clone()]);
    }
    if let Some(v) = &profile.email {
        rows.push(vec!["Email".to_string(), v.clone()]);
    }
    if let Some(v) = &profile.address {
        rows.push(vec!["Address".to_string(), v.clone()]);
    }
    if let Some(bank) = &profile.bank {
        rows.push(vec!["Account".to_string(), bank.account_name.clone()]);
        rows.push(vec!["Account no.".to_string(), bank.account_number.clone()]);
        if let Some(v) = &bank.ifsc {
            rows.push(vec!["IFSC".to_string(), v.clone()]);
        }
        if let Some(v) = &bank.upi_id {
            rows.push(vec!["UPI".to_string(), v.clone()]);
        }
    }
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}
