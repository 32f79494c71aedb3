// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use khatabook::db;
use khatabook::models::{Category, DEFAULT_CATEGORIES};
use khatabook::store::{CategoryStore, Identity};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn user_category(name: &str) -> Category {
    Category {
        id: name.to_string(),
        icon: "category".into(),
        color: "#607d8b".into(),
    }
}

#[test]
fn defaults_are_seeded_on_first_read() {
    let conn = setup();
    let store = CategoryStore::new(&conn, Identity::guest());

    let all = store.get_all();
    assert_eq!(all.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(all[0].id, "Food");
    for (name, _, _) in DEFAULT_CATEGORIES {
        assert!(all.iter().any(|c| c.id == *name));
    }
}

#[test]
fn default_categories_are_immutable() {
    let conn = setup();
    let store = CategoryStore::new(&conn, Identity::guest());

    let err = store.delete("Food").unwrap_err();
    assert!(err.to_string().contains("built-in"));
    let err = store.rename("rent", "Lease").unwrap_err();
    assert!(err.to_string().contains("built-in"));
    assert_eq!(store.get_all().len(), DEFAULT_CATEGORIES.len());
}

#[test]
fn duplicates_are_rejected_case_insensitively() {
    let conn = setup();
    let store = CategoryStore::new(&conn, Identity::guest());

    let err = store.add(user_category("food")).unwrap_err();
    assert!(err.to_string().contains("already exists"));

    store.add(user_category("Chai")).unwrap();
    let err = store.add(user_category("CHAI")).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn user_categories_can_be_renamed_and_removed() {
    let conn = setup();
    let store = CategoryStore::new(&conn, Identity::guest());

    store.add(user_category("Chai")).unwrap();
    store.rename("chai", "Tea").unwrap();
    assert!(store.get_all().iter().any(|c| c.id == "Tea"));

    let err = store.rename("Tea", "food").unwrap_err();
    assert!(err.to_string().contains("already exists"));

    store.delete("tea").unwrap();
    assert_eq!(store.get_all().len(), DEFAULT_CATEGORIES.len());

    let err = store.delete("Tea").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn replace_all_keeps_the_defaults_present() {
    let conn = setup();
    let store = CategoryStore::new(&conn, Identity::guest());

    store.replace_all(&[user_category("Imported")]).unwrap();
    let all = store.get_all();
    assert!(all.iter().any(|c| c.id == "Imported"));
    for (name, _, _) in DEFAULT_CATEGORIES {
        assert!(all.iter().any(|c| c.id == *name));
    }
}
