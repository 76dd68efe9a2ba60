// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{account, at, category, tx};
use ledgersync::db;
use ledgersync::models::Direction;
use ledgersync::storage::{
    AccountStorage, CategoriesStorage, CounterStore, DateRange, MemoryAccounts, MemoryCategories,
    MemoryCounter, MemoryTransactions, SqliteAccounts, SqliteCategories, SqliteSettings,
    SqliteTransactions, TransactionsStorage,
};
use rust_decimal_macros::dec;

fn check_transactions(store: &dyn TransactionsStorage) {
    store.upsert(&tx(1, 2, 10, 2)).unwrap();
    store.upsert(&tx(2, 2, 20, 10)).unwrap();
    store.upsert(&tx(-1, 1, 30, 20)).unwrap();

    let mut edited = tx(2, 2, 20, 10);
    edited.amount = dec!(21.5);
    edited.comment = Some("fixed".into());
    store.upsert(&edited).unwrap();

    let mut ids: Vec<i64> = store
        .get_by_date_range(DateRange::new(Some(at(2)), Some(at(10))))
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2]);

    let open_ended = store
        .get_by_date_range(DateRange::new(Some(at(15)), None))
        .unwrap();
    assert_eq!(open_ended.len(), 1);
    assert_eq!(open_ended[0].id, -1);

    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.contains(&edited));

    store.delete(1).unwrap();
    store.delete(1).unwrap();
    assert_eq!(store.get_all().unwrap().len(), 2);
}

fn check_categories(store: &dyn CategoriesStorage) {
    store
        .replace_all(&[
            category(1, "Salary", '💰', Direction::Income),
            category(2, "Groceries", '🛒', Direction::Outcome),
        ])
        .unwrap();
    assert_eq!(store.get_by_direction(Direction::Income).unwrap().len(), 1);

    store
        .replace_all(&[category(3, "Taxi", '🚕', Direction::Outcome)])
        .unwrap();
    let all = store.get_all().unwrap();
    assert_eq!(all, vec![category(3, "Taxi", '🚕', Direction::Outcome)]);
    assert!(store.get_by_direction(Direction::Income).unwrap().is_empty());
}

fn check_account(store: &dyn AccountStorage) {
    assert!(store.get().unwrap().is_none());
    store.save(&account(1000, "RUB")).unwrap();
    store.save(&account(1500, "EUR")).unwrap();
    let saved = store.get().unwrap().unwrap();
    assert_eq!(saved.balance, dec!(1500));
    assert_eq!(saved.currency, "EUR");
}

fn check_counter(store: &dyn CounterStore) {
    assert_eq!(store.load("k").unwrap(), None);
    store.store("k", 4).unwrap();
    store.store("k", 5).unwrap();
    assert_eq!(store.load("k").unwrap(), Some(5));
    store.clear("k").unwrap();
    assert_eq!(store.load("k").unwrap(), None);
}

#[test]
fn sqlite_stores_honor_contracts() {
    let conn = db::open_in_memory().unwrap();
    check_transactions(&SqliteTransactions::new(conn.clone()));
    check_categories(&SqliteCategories::new(conn.clone()));
    check_account(&SqliteAccounts::new(conn.clone()));
    check_counter(&SqliteSettings::new(conn));
}

#[test]
fn memory_stores_honor_contracts() {
    check_transactions(&MemoryTransactions::new());
    check_categories(&MemoryCategories::new());
    check_account(&MemoryAccounts::new());
    check_counter(&MemoryCounter::new());
}

#[test]
fn seeded_memory_mirror() {
    let store = MemoryTransactions::with([tx(1, 2, 10, 2), tx(2, 2, 10, 3)]);
    assert_eq!(store.get_all().unwrap().len(), 2);
}
