// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{FakeApi, at, harness, july, tx};
use ledgersync::errors::{ApiError, Error};
use ledgersync::models::{Direction, Transaction};
use ledgersync::outbox::{AccountChange, OutboxAction};
use ledgersync::services::CancelToken;
use ledgersync::view::ScreenState;
use rust_decimal_macros::dec;
use std::time::Duration;

fn ids(rows: &[Transaction]) -> Vec<i64> {
    let mut ids: Vec<i64> = rows.iter().map(|t| t.id).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn offline_create_round_trip() {
    let api = FakeApi::new();
    api.state.lock().unwrap().transactions.push(tx(1, 2, 300, 2));
    let (services, stores) = harness(&api);

    let online = services.transactions.get_transactions(july()).await.unwrap();
    assert_eq!(ids(&online), vec![1]);

    api.set_offline(true);
    let local = services
        .transactions
        .add_transaction(tx(0, 2, 120, 6), Direction::Outcome)
        .await
        .unwrap();
    assert_eq!(local.id, -1);
    assert!(local.is_provisional());

    let entries = stores.transaction_outbox.all_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, OutboxAction::Create);
    let changes = stores.account_outbox.all_entries().unwrap();
    assert_eq!(
        changes[0].change,
        AccountChange::ChangeTransactionImpact(dec!(-120))
    );

    let offline = services.transactions.get_transactions(july()).await.unwrap();
    assert_eq!(ids(&offline), vec![-1, 1]);
    let provisional = offline.iter().find(|t| t.id == -1).unwrap();
    assert_eq!(provisional, &local);

    api.set_offline(false);
    services.transactions.get_transactions(july()).await.unwrap();
    assert!(stores.transaction_outbox.is_empty().unwrap());
    assert!(stores.account_outbox.is_empty().unwrap());

    let after = services.transactions.get_transactions(july()).await.unwrap();
    assert_eq!(ids(&after), vec![1, 100]);
    assert_eq!(api.server_account().balance, dec!(880));
}

#[tokio::test]
async fn offline_edit_and_delete_queue_balance_deltas() {
    let api = FakeApi::new();
    api.state.lock().unwrap().transactions.extend([tx(1, 1, 500, 2), tx(2, 2, 80, 3)]);
    let (services, stores) = harness(&api);
    services.accounts.get_account().await.unwrap();
    services.transactions.get_transactions(july()).await.unwrap();

    api.set_offline(true);
    let edited = Transaction {
        amount: dec!(650),
        ..tx(1, 1, 500, 2)
    };
    services
        .transactions
        .edit_transaction(edited, dec!(500), Direction::Income)
        .await
        .unwrap();
    services
        .transactions
        .delete_transaction(2, dec!(80), Direction::Outcome)
        .await
        .unwrap();

    let changes: Vec<_> = stores
        .account_outbox
        .all_entries()
        .unwrap()
        .into_iter()
        .map(|e| e.change)
        .collect();
    assert_eq!(
        changes,
        vec![
            AccountChange::ChangeTransactionImpact(dec!(150)),
            AccountChange::ChangeTransactionImpact(dec!(80)),
        ]
    );

    let view = services.transactions.get_transactions(july()).await.unwrap();
    assert_eq!(ids(&view), vec![1]);
    assert_eq!(view[0].amount, dec!(650));

    let local = services.accounts.get_account().await.unwrap();
    assert_eq!(local.balance, dec!(1230));
}

#[tokio::test]
async fn offline_account_update_is_projected() {
    let api = FakeApi::new();
    let (services, stores) = harness(&api);
    services.accounts.get_account().await.unwrap();

    api.set_offline(true);
    services
        .transactions
        .add_transaction(tx(0, 2, 100, 6), Direction::Outcome)
        .await
        .unwrap();
    services
        .transactions
        .add_transaction(tx(0, 1, 30, 7), Direction::Income)
        .await
        .unwrap();
    assert_eq!(services.accounts.local_account().unwrap().balance, dec!(930));

    let projected = services
        .accounts
        .update_account(dec!(2000), "USD")
        .await
        .unwrap();
    assert_eq!(projected.balance, dec!(2000));
    assert_eq!(projected.currency, "USD");
    assert_eq!(services.accounts.pending_changes().unwrap(), 4);

    let changes = stores.account_outbox.all_entries().unwrap();
    assert_eq!(changes[2].change, AccountChange::ChangeBalance(dec!(1070)));

    let seen = services.accounts.get_account().await.unwrap();
    assert_eq!(seen.balance, dec!(2000));
    assert_eq!(seen.currency, "USD");
}

#[tokio::test]
async fn only_connectivity_failures_are_queued() {
    let api = FakeApi::new();
    let (services, stores) = harness(&api);

    api.fail_op("create", ApiError::Unauthorized);
    let err = services
        .transactions
        .add_transaction(tx(0, 2, 10, 6), Direction::Outcome)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::Unauthorized)));

    api.fail_op("update", ApiError::ServerError(500));
    let err = services
        .transactions
        .edit_transaction(tx(1, 2, 10, 6), dec!(5), Direction::Outcome)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::ServerError(500))));

    api.fail_op("delete", ApiError::DecodeError("bad".into()));
    assert!(
        services
            .transactions
            .delete_transaction(1, dec!(5), Direction::Outcome)
            .await
            .is_err()
    );

    assert!(stores.transaction_outbox.is_empty().unwrap());
    assert!(stores.account_outbox.is_empty().unwrap());
    assert_eq!(services.ids.peek().unwrap(), -1);
}

#[tokio::test]
async fn server_error_on_read_is_not_masked() {
    let api = FakeApi::new();
    let (services, _stores) = harness(&api);
    api.fail_op("fetch_transactions", ApiError::ServerError(502));
    let err = services
        .transactions
        .get_transactions(july())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::ServerError(502))));
    assert!(!err.is_offline());
}

#[tokio::test]
async fn offline_without_cached_account_fails() {
    let api = FakeApi::new();
    let (services, _stores) = harness(&api);
    api.set_offline(true);
    let err = services.accounts.get_account().await.unwrap_err();
    assert!(matches!(err, Error::NoLocalAccount));
}

#[tokio::test]
async fn cancelled_load_writes_nothing() {
    let api = FakeApi::new();
    api.state.lock().unwrap().transactions.push(tx(1, 2, 300, 2));
    let (services, stores) = harness(&api);
    stores.transactions.upsert(&tx(9, 2, 10, 4)).unwrap();
    api.state.lock().unwrap().hang_fetch_transactions = true;

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let mut screen: ScreenState<Transaction> = ScreenState {
        items: vec![tx(9, 2, 10, 4)],
        error: Some("earlier failure".into()),
        ..ScreenState::default()
    };
    screen.begin();
    let result = services
        .transactions
        .get_transactions_cancellable(july(), &cancel)
        .await;
    assert!(matches!(&result, Err(e) if e.is_cancelled()));
    screen.finish(result);

    assert!(!screen.is_loading);
    assert!(screen.error.is_none());
    assert_eq!(ids(&screen.items), vec![9]);
    let mirror = stores.transactions.get_all().unwrap();
    assert_eq!(ids(&mirror), vec![9]);
}

#[tokio::test]
async fn cancel_during_follow_up_sync_keeps_entry_queued() {
    let api = FakeApi::new();
    let (services, stores) = harness(&api);
    stores
        .transaction_outbox
        .push(OutboxAction::Create, tx(-1, 2, 40, 5))
        .unwrap();
    api.state.lock().unwrap().delay_create = Some(Duration::from_millis(100));

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = services
        .transactions
        .get_transactions_cancellable(july(), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(
        api.calls(),
        vec!["fetch_accounts", "fetch_transactions:1", "create:-1"]
    );
    assert!(api.server_transactions().is_empty());
    assert!(stores.transactions.get_all().unwrap().is_empty());
    let left = stores.transaction_outbox.all_entries().unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].payload.id, -1);

    api.state.lock().unwrap().delay_create = None;
    let rows = services.transactions.get_transactions(july()).await.unwrap();
    assert!(rows.is_empty());
    assert!(stores.transaction_outbox.is_empty().unwrap());
    assert_eq!(ids(&stores.transactions.get_all().unwrap()), vec![100]);
}

#[tokio::test]
async fn cancel_before_start_returns_immediately() {
    let api = FakeApi::new();
    let (services, stores) = harness(&api);
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = services
        .transactions
        .get_transactions_cancellable(july(), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(stores.transactions.get_all().unwrap().is_empty());
}

#[tokio::test]
async fn online_load_replaces_stale_mirror_rows() {
    let api = FakeApi::new();
    api.state.lock().unwrap().transactions.push(tx(1, 2, 300, 2));
    let (services, stores) = harness(&api);
    stores.transactions.upsert(&tx(8, 2, 10, 4)).unwrap();

    let rows = services.transactions.get_transactions(july()).await.unwrap();
    assert_eq!(ids(&rows), vec![1]);
    assert_eq!(ids(&stores.transactions.get_all().unwrap()), vec![1]);
}

#[tokio::test]
async fn categories_fall_back_to_cache() {
    let api = FakeApi::new();
    let (services, _stores) = harness(&api);
    assert_eq!(services.categories.get_all().await.unwrap().len(), 3);

    api.set_offline(true);
    let cached = services.categories.get_all().await.unwrap();
    assert_eq!(cached.len(), 3);
    let outcome = services
        .categories
        .get_by_direction(Direction::Outcome)
        .await
        .unwrap();
    assert_eq!(outcome.len(), 2);
    let found = services.categories.search("grc").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Groceries");
}

#[tokio::test]
async fn direction_fetch_keeps_other_direction_cached() {
    let api = FakeApi::new();
    let (services, stores) = harness(&api);
    services.categories.get_all().await.unwrap();

    api.state.lock().unwrap().categories.retain(|c| c.id != 1);
    services
        .categories
        .get_by_direction(Direction::Outcome)
        .await
        .unwrap();
    assert_eq!(stores.categories.get_all().unwrap().len(), 3);
}

#[tokio::test]
async fn offline_create_outside_range_is_hidden() {
    let api = FakeApi::new();
    let (services, _stores) = harness(&api);
    services.accounts.get_account().await.unwrap();
    api.set_offline(true);
    let mut draft = tx(0, 2, 10, 1);
    draft.transaction_date = at(1) - chrono::Duration::days(40);
    services
        .transactions
        .add_transaction(draft, Direction::Outcome)
        .await
        .unwrap();
    let view = services.transactions.get_transactions(july()).await.unwrap();
    assert!(view.is_empty());
}
