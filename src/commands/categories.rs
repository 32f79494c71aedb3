// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Category;
use crate::store::{CategoryStore, Identity};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = CategoryStore::new(conn, Identity::current(conn));
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let icon = sub.get_one::<String>("icon").unwrap();
            let color = sub.get_one::<String>("color").unwrap();
            store.add(Category {
                id: name.clone(),
                icon: icon.clone(),
                color: color.clone(),
            })?;
            crate::sync::fire_and_forget_push(conn);
            println!("Added category '{}'", name);
        }
        Some(("rename", sub)) => {
            let from = sub.get_one::<String>("from").unwrap();
            let to = sub.get_one::<String>("to").unwrap();
            store.rename(from, to)?;
            crate::sync::fire_and_forget_push(conn);
            println!("Renamed category '{}' -> '{}'", from, to);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            store.delete(name)?;
            crate::sync::fire_and_forget_push(conn);
            println!("Removed category '{}'", name);
        }
        Some(("list", sub)) => {
            let json_flag = sub.get_flag("json");
            let jsonl_flag = sub.get_flag("jsonl");
            let data = store.get_all();
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows: Vec<Vec<String>> = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.clone(),
                            c.icon.clone(),
                            c.color.clone(),
                            if Category::is_default(&c.id) { "yes" } else { "" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Category", "Icon", "Color", "Built-in"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
