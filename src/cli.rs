// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("khatabook")
        .about("Khatabook: offline-first customer credit ledger, daily expenses, and cloud backup")
        .subcommand(Command::new("init").about("Initialize the local database"))
        .subcommand(ledger_cmd())
        .subcommand(tx_cmd())
        .subcommand(expense_cmd())
        .subcommand(category_cmd())
        .subcommand(profile_cmd())
        .subcommand(backup_cmd())
        .subcommand(sync_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(Command::new("doctor").about("Audit balances and invariants across collections"))
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON Lines"),
    )
}

fn ledger_cmd() -> Command {
    Command::new("ledger")
        .about("Customer ledgers (khata accounts)")
        .subcommand(
            Command::new("add")
                .about("Add a customer ledger")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("phone").long("phone"))
                .arg(Arg::new("address").long("address")),
        )
        .subcommand(json_flags(
            Command::new("list").about("List ledgers with balances"),
        ))
        .subcommand(json_flags(
            Command::new("show")
                .about("Show one ledger and its transactions")
                .arg(Arg::new("id").long("id").required(true)),
        ))
        .subcommand(
            Command::new("rm")
                .about("Remove a ledger")
                .arg(Arg::new("id").long("id").required(true)),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Credit/debit transactions on a ledger")
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(Arg::new("ledger").long("ledger").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("credit (received) or debit (given)"),
                )
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .allow_hyphen_values(true),
                )
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
                .arg(Arg::new("note").long("note"))
                .arg(Arg::new("bill-photo").long("bill-photo").help("Local URI of the bill photo")),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit a transaction")
                .arg(Arg::new("ledger").long("ledger").required(true))
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("amount").long("amount").allow_hyphen_values(true))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("note").long("note"))
                .arg(Arg::new("bill-photo").long("bill-photo")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(Arg::new("ledger").long("ledger").required(true))
                .arg(Arg::new("id").long("id").required(true)),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List a ledger's transactions, newest first")
                .arg(Arg::new("ledger").long("ledger").required(true))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
}

fn expense_cmd() -> Command {
    Command::new("expense")
        .about("Daily business expenses")
        .subcommand(
            Command::new("add")
                .about("Record an expense")
                .arg(Arg::new("title").long("title").required(true))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .allow_hyphen_values(true),
                )
                .arg(Arg::new("category").long("category").default_value("Other"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List expenses, newest first")
                .arg(Arg::new("month").long("month").help("Filter by YYYY-MM"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("rm")
                .about("Delete an expense")
                .arg(Arg::new("id").long("id").required(true)),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Expense categories")
        .subcommand(
            Command::new("add")
                .about("Add a category")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("icon").long("icon").default_value("category"))
                .arg(Arg::new("color").long("color").default_value("#95a5a6")),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a user-added category")
                .arg(Arg::new("from").long("from").required(true))
                .arg(Arg::new("to").long("to").required(true)),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a user-added category")
                .arg(Arg::new("name").long("name").required(true)),
        )
        .subcommand(json_flags(Command::new("list").about("List categories")))
}

fn profile_cmd() -> Command {
    Command::new("profile")
        .about("Business profile and bank details")
        .subcommand(
            Command::new("set")
                .about("Set profile fields (unset fields keep their value)")
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("business").long("business"))
                .arg(Arg::new("phone").long("phone"))
                .arg(Arg::new("email").long("email"))
                .arg(Arg::new("address").long("address"))
                .arg(Arg::new("account-name").long("account-name"))
                .arg(Arg::new("account-number").long("account-number"))
                .arg(Arg::new("ifsc").long("ifsc"))
                .arg(Arg::new("upi").long("upi")),
        )
        .subcommand(json_flags(Command::new("show").about("Show the profile")))
}

fn backup_cmd() -> Command {
    Command::new("backup")
        .about("Single-file JSON backup")
        .subcommand(
            Command::new("export")
                .about("Export all collections to a backup file")
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("import")
                .about("Validate and import a backup file")
                .arg(Arg::new("path").long("path").required(true)),
        )
}

fn sync_cmd() -> Command {
    Command::new("sync")
        .about("Cloud backup against the remote document store")
        .subcommand(
            Command::new("set-remote")
                .about("Configure the remote store base URL")
                .arg(Arg::new("url").long("url").required(true)),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in; collections move off the guest namespace")
                .arg(Arg::new("uid").long("uid").required(true)),
        )
        .subcommand(Command::new("logout").about("Sign out; back to the guest namespace"))
        .subcommand(Command::new("push").about("Push every collection to the remote store"))
        .subcommand(Command::new("pull").about("Pull every collection; remote wins wholesale"))
        .subcommand(json_flags(Command::new("status").about("Show sync state")))
        .subcommand(
            Command::new("auto")
                .about("Toggle auto backup")
                .arg(
                    Arg::new("state")
                        .required(true)
                        .value_parser(["on", "off"]),
                ),
        )
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Summaries")
        .subcommand(json_flags(
            Command::new("balances").about("Per-ledger balances and the net position"),
        ))
        .subcommand(json_flags(
            Command::new("spend-by-category")
                .about("Expense totals per category for one month")
                .arg(Arg::new("month").long("month").required(true)),
        ))
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export data files")
        .subcommand(
            Command::new("statement")
                .about("Write a ledger statement with running balance")
                .arg(Arg::new("ledger").long("ledger").required(true))
                .arg(Arg::new("format").long("format").default_value("csv"))
                .arg(Arg::new("out").long("out").required(true)),
        )
}
