// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::remote::{self, HttpDocumentStore};
use crate::store::{self, Identity, SettingsStore};
use crate::sync::SyncCoordinator;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-remote", sub)) => {
            let url = sub.get_one::<String>("url").unwrap();
            db::kv_put(conn, remote::REMOTE_URL_KEY, url.trim())?;
            println!("Remote store set to {}", url.trim());
        }
        Some(("login", sub)) => {
            let uid = sub.get_one::<String>("uid").unwrap().trim().to_string();
            if uid.is_empty() || uid == store::GUEST {
                return Err(anyhow!("'{}' is not a usable uid", uid));
            }
            store::login(conn, &uid)?;
            println!("Signed in as '{}'", uid);
        }
        Some(("logout", _)) => {
            store::logout(conn)?;
            println!("Signed out; collections fall back to the guest namespace");
        }
        Some(("push", _)) => push(conn)?,
        Some(("pull", _)) => pull(conn)?,
        Some(("status", sub)) => status(conn, sub)?,
        Some(("auto", sub)) => {
            let on = sub.get_one::<String>("state").unwrap() == "on";
            SettingsStore::new(conn, Identity::current(conn)).set_auto_backup(on)?;
            println!("Auto backup {}", if on { "enabled" } else { "disabled" });
        }
        _ => {}
    }
    Ok(())
}

fn require_remote(conn: &Connection) -> Result<HttpDocumentStore> {
    HttpDocumentStore::from_settings(conn)?.ok_or_else(|| {
        anyhow!("No remote store configured; run `khatabook sync set-remote --url <URL>`")
    })
}

fn push(conn: &Connection) -> Result<()> {
    let remote = require_remote(conn)?;
    let identity = Identity::current(conn);
    let coordinator = SyncCoordinator::new(conn, identity.clone(), &remote);
    if coordinator.sync_all_to_remote().context("Sync failed")? {
        println!("Pushed all collections for '{}'", identity.uid());
    } else {
        println!("Not signed in; nothing was pushed. Run `khatabook sync login --uid <UID>`.");
    }
    Ok(())
}

fn pull(conn: &Connection) -> Result<()> {
    let remote = require_remote(conn)?;
    let identity = Identity::current(conn);
    let coordinator = SyncCoordinator::new(conn, identity, &remote);
    let ledgers = coordinator.fetch_all_from_remote().context("Sync failed")?;
    println!("Pulled {} ledgers from the remote store", ledgers.len());
    Ok(())
}

#[derive(Serialize)]
struct SyncStatusRow {
    identity: String,
    remote: String,
    auto_backup: bool,
    last_sync: String,
    status: String,
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let identity = Identity::current(conn);
    let settings = SettingsStore::new(conn, identity.clone()).get();
    let row = SyncStatusRow {
        identity: identity.uid().to_string(),
        remote: db::kv_get(conn, remote::REMOTE_URL_KEY)?.unwrap_or_else(|| "(not set)".into()),
        auto_backup: settings.auto_backup,
        last_sync: settings
            .last_sync
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".into()),
        status: settings.sync_status.as_str().to_string(),
    };

    if !maybe_print_json(json_flag, jsonl_flag, &row)? {
        let rows = vec![
            vec!["Identity".to_string(), row.identity],
            vec!["Remote".to_string(), row.remote],
            vec!["Auto backup".to_string(), row.auto_backup.to_string()],
            vec!["Last sync".to_string(), row.last_sync],
            vec!["Status".to_string(), row.status],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}
