// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const BACKUP_VERSION: u32 = 1;

/// Built-in expense categories: always present, never renamed or removed.
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Food", "restaurant", "#e74c3c"),
    ("Travel", "flight", "#3498db"),
    ("Study", "school", "#9b59b6"),
    ("Rent", "home", "#e67e22"),
    ("Entertainment", "movie", "#1abc9c"),
    ("Health", "healing", "#2ecc71"),
    ("Salary", "payments", "#f1c40f"),
    ("Other", "category", "#95a5a6"),
];

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid transaction type '{0}', expected credit|debit")]
    TxType(String),
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Invalid phone number '{0}'")]
    Phone(String),
    #[error("Category '{0}' is a built-in default and cannot be changed")]
    DefaultCategory(String),
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),
    #[error("Category '{0}' not found")]
    UnknownCategory(String),
    #[error("Not a valid backup file")]
    Backup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Credit,
    Debit,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Credit => "credit",
            TxType::Debit => "debit",
        }
    }
}

impl std::str::FromStr for TxType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(TxType::Credit),
            "debit" => Ok(TxType::Debit),
            other => Err(ValidationError::TxType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub r#type: TxType,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_photo: Option<String>,
    #[serde(default)]
    pub balance_after: Decimal,
}

impl Transaction {
    /// Credit adds to the balance, debit subtracts.
    pub fn signed_amount(&self) -> Decimal {
        match self.r#type {
            TxType::Credit => self.amount,
            TxType::Debit => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(id: String, name: String, phone: Option<String>, address: Option<String>) -> Self {
        Self {
            id,
            name,
            phone,
            address,
            balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    /// Rebuild the running-balance chain: sort ascending by date, walk the
    /// list accumulating the signed amounts, assign `balance_after` at each
    /// step. The final running total becomes the ledger's `balance`.
    pub fn recalculate(&mut self) {
        self.transactions.sort_by(|a, b| a.date.cmp(&b.date));
        let mut running = Decimal::ZERO;
        for tx in &mut self.transactions {
            running += tx.signed_amount();
            tx.balance_after = running;
        }
        self.balance = running;
    }

    pub fn signed_total(&self) -> Decimal {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: Decimal,
    pub category: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The display name doubles as the id; unique case-insensitively.
    pub id: String,
    pub icon: String,
    pub color: String,
}

impl Category {
    pub fn defaults() -> Vec<Category> {
        DEFAULT_CATEGORIES
            .iter()
            .map(|(name, icon, color)| Category {
                id: (*name).to_string(),
                icon: (*icon).to_string(),
                color: (*color).to_string(),
            })
            .collect()
    }

    pub fn is_default(name: &str) -> bool {
        DEFAULT_CATEGORIES
            .iter()
            .any(|(default, _, _)| default.eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackupSettings {
    #[serde(default)]
    pub auto_backup: bool,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
}

/// Single-file backup format shared by export and import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub version: u32,
    #[serde(default = "Utc::now")]
    pub export_date: DateTime<Utc>,
    pub ledgers: BTreeMap<String, Ledger>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub categories: Vec<Category>,
}
