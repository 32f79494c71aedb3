// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use rusqlite::Connection;
use serde_json::Value;

use crate::db::kv_get;
use crate::utils::http_client;

pub const REMOTE_URL_KEY: &str = "sync_remote_url";

/// Opaque remote document store: hierarchical paths, JSON documents, calls
/// that may fail. The sync layer never sees anything more specific.
pub trait DocumentStore {
    fn put_doc(&self, path: &str, doc: &Value) -> Result<()>;
    fn get_doc(&self, path: &str) -> Result<Option<Value>>;
    /// Deleting a missing document is not an error.
    fn delete_doc(&self, path: &str) -> Result<()>;
    /// All documents directly under `path`, keyed by document id.
    fn list_docs(&self, path: &str) -> Result<BTreeMap<String, Value>>;
}

pub struct HttpDocumentStore {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// None when no remote has been configured yet.
    pub fn from_settings(conn: &Connection) -> Result<Option<Self>> {
        match kv_get(conn, REMOTE_URL_KEY)? {
            Some(url) if !url.trim().is_empty() => Ok(Some(Self::new(url)?)),
            _ => Ok(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl DocumentStore for HttpDocumentStore {
    fn put_doc(&self, path: &str, doc: &Value) -> Result<()> {
        self.client
            .put(self.url(path))
            .json(doc)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Put document {}", path))?;
        Ok(())
    }

    fn get_doc(&self, path: &str) -> Result<Option<Value>> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .with_context(|| format!("Get document {}", path))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let doc = resp
            .error_for_status()
            .and_then(|r| r.json())
            .with_context(|| format!("Get document {}", path))?;
        Ok(Some(doc))
    }

    fn delete_doc(&self, path: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .with_context(|| format!("Delete document {}", path))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        resp.error_for_status()
            .with_context(|| format!("Delete document {}", path))?;
        Ok(())
    }

    fn list_docs(&self, path: &str) -> Result<BTreeMap<String, Value>> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .with_context(|| format!("List collection {}", path))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(BTreeMap::new());
        }
        let docs = resp
            .error_for_status()
            .and_then(|r| r.json())
            .with_context(|| format!("List collection {}", path))?;
        Ok(docs)
    }
}

pub fn ledger_collection(uid: &str) -> String {
    format!("users/{uid}/ledgers")
}

pub fn ledger_doc(uid: &str, ledger_id: &str) -> String {
    format!("users/{uid}/ledgers/{ledger_id}")
}

pub fn transaction_collection(uid: &str, ledger_id: &str) -> String {
    format!("users/{uid}/ledgers/{ledger_id}/transactions")
}

pub fn transaction_doc(uid: &str, ledger_id: &str, tx_id: &str) -> String {
    format!("users/{uid}/ledgers/{ledger_id}/transactions/{tx_id}")
}

pub fn expense_collection(uid: &str) -> String {
    format!("users/{uid}/expenses")
}

pub fn expense_doc(uid: &str, expense_id: &str) -> String {
    format!("users/{uid}/expenses/{expense_id}")
}

pub fn categories_doc(uid: &str) -> String {
    format!("users/{uid}/settings/categories")
}

pub fn profile_doc(uid: &str) -> String {
    format!("users/{uid}/settings/profile")
}
