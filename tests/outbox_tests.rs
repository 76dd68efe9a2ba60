// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::tx;
use ledgersync::db;
use ledgersync::outbox::{AccountChange, AccountOutbox, OutboxAction, TransactionOutbox};
use rust_decimal_macros::dec;
use tempfile::tempdir;

#[test]
fn entries_survive_reopen_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.sqlite");

    {
        let conn = db::open_or_init(&path).unwrap();
        let outbox = TransactionOutbox::new(conn.clone());
        outbox.push(OutboxAction::Create, tx(-1, 2, 10, 2)).unwrap();
        outbox.push(OutboxAction::Update, tx(5, 2, 20, 3)).unwrap();
        outbox.push(OutboxAction::Delete, tx(6, 2, 0, 3)).unwrap();
        let accounts = AccountOutbox::new(conn);
        accounts
            .push(AccountChange::ChangeTransactionImpact(dec!(-10.55)))
            .unwrap();
        accounts
            .push(AccountChange::ChangeCurrency("EUR".into()))
            .unwrap();
    }

    let conn = db::open_or_init(&path).unwrap();
    let entries = TransactionOutbox::new(conn.clone()).all_entries().unwrap();
    let actions: Vec<_> = entries.iter().map(|e| (e.action, e.payload.id)).collect();
    assert_eq!(
        actions,
        vec![
            (OutboxAction::Create, -1),
            (OutboxAction::Update, 5),
            (OutboxAction::Delete, 6)
        ]
    );
    assert_eq!(entries[0].payload, tx(-1, 2, 10, 2));

    let changes: Vec<_> = AccountOutbox::new(conn)
        .all_entries()
        .unwrap()
        .into_iter()
        .map(|e| e.change)
        .collect();
    assert_eq!(
        changes,
        vec![
            AccountChange::ChangeTransactionImpact(dec!(-10.55)),
            AccountChange::ChangeCurrency("EUR".into()),
        ]
    );
}

#[test]
fn removing_an_entry_keeps_the_rest_ordered() {
    let conn = db::open_in_memory().unwrap();
    let outbox = TransactionOutbox::new(conn);
    let a = outbox.push(OutboxAction::Create, tx(-1, 2, 10, 2)).unwrap();
    let b = outbox.push(OutboxAction::Create, tx(-2, 2, 10, 2)).unwrap();
    let c = outbox.push(OutboxAction::Create, tx(-3, 2, 10, 2)).unwrap();

    outbox.remove(b.id).unwrap();
    let ids: Vec<_> = outbox.all_entries().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![a.id, c.id]);

    outbox.clear().unwrap();
    assert!(outbox.is_empty().unwrap());
}

#[test]
fn entry_ids_are_unique() {
    let conn = db::open_in_memory().unwrap();
    let outbox = AccountOutbox::new(conn);
    let first = outbox.push(AccountChange::ChangeBalance(dec!(1))).unwrap();
    let second = outbox.push(AccountChange::ChangeBalance(dec!(1))).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(outbox.len().unwrap(), 2);
}
