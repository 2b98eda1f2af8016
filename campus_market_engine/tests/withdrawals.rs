//! Withdrawal flow: minimums, balance guards, and rollback when the payout gateway fails.
mod common;

use campus_market_engine::{
    db_types::{BalancePool, EntryType},
    sqlite::db::ledger,
    traits::{AccountApiError, BankDetails},
};
use cm_common::Naira;
use common::new_rig;

fn gtb_account() -> BankDetails {
    BankDetails {
        bank_code: "058".to_string(),
        account_number: "0123456789".to_string(),
        account_name: "Chinedu O.".to_string(),
    }
}

/// Puts spendable money on an account directly through the balance manager.
async fn top_up(rig: &common::TestRig, account_id: i64, amount: i64) {
    let mut conn = rig.db.pool().acquire().await.unwrap();
    ledger::apply_delta(
        account_id,
        BalancePool::Available,
        Naira::from(amount),
        EntryType::Credit,
        &format!("topup:{account_id}:{amount}"),
        "Test top-up",
        &mut conn,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn withdrawals_below_the_minimum_are_rejected() {
    let rig = new_rig().await;
    let api = rig.account_api();
    let err = api.withdraw(rig.seller.id, Naira::from(500), &gtb_account(), &rig.gateway).await.unwrap_err();
    assert!(matches!(err, AccountApiError::BelowMinimum { .. }));
}

#[tokio::test]
async fn withdrawals_cannot_overdraw_the_available_pool() {
    let rig = new_rig().await;
    top_up(&rig, rig.seller.id, 2_000).await;
    let api = rig.account_api();
    let err = api.withdraw(rig.seller.id, Naira::from(3_000), &gtb_account(), &rig.gateway).await.unwrap_err();
    match err {
        AccountApiError::InsufficientBalance { available, requested } => {
            assert_eq!(available, Naira::from(2_000));
            assert_eq!(requested, Naira::from(3_000));
        },
        other => panic!("expected InsufficientBalance, got {other}"),
    }
    // The rejected attempt left no ledger row behind.
    let rows = rig.ledger(rig.seller.id).await;
    assert!(rows.iter().all(|e| e.entry_type != EntryType::Withdrawal));
}

#[tokio::test]
async fn successful_withdrawal_debits_and_records_once() {
    let rig = new_rig().await;
    top_up(&rig, rig.seller.id, 5_000).await;
    let api = rig.account_api();

    let receipt = api.withdraw(rig.seller.id, Naira::from(3_000), &gtb_account(), &rig.gateway).await.unwrap();
    assert_eq!(receipt.amount, Naira::from(3_000));
    assert!(!receipt.transfer_code.is_empty());

    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.available_balance, Naira::from(2_000));
    let withdrawal = rig
        .ledger(rig.seller.id)
        .await
        .into_iter()
        .find(|e| e.entry_type == EntryType::Withdrawal)
        .expect("withdrawal row must exist");
    assert_eq!(withdrawal.amount, Naira::from(-3_000));
    assert_eq!(withdrawal.balance_before, Naira::from(5_000));
    assert_eq!(withdrawal.balance_after, Naira::from(2_000));
}

#[tokio::test]
async fn gateway_failure_rolls_the_debit_back() {
    let rig = new_rig().await;
    top_up(&rig, rig.seller.id, 5_000).await;
    rig.gateway.fail_transfers(true);
    let api = rig.account_api();

    let err = api.withdraw(rig.seller.id, Naira::from(3_000), &gtb_account(), &rig.gateway).await.unwrap_err();
    assert!(matches!(err, AccountApiError::TransferFailed(_)));

    // No partial state: balance untouched, no Withdrawal row.
    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.available_balance, Naira::from(5_000));
    let rows = rig.ledger(rig.seller.id).await;
    assert!(rows.iter().all(|e| e.entry_type != EntryType::Withdrawal));

    // The gateway coming back makes the same request succeed.
    rig.gateway.fail_transfers(false);
    api.withdraw(rig.seller.id, Naira::from(3_000), &gtb_account(), &rig.gateway).await.unwrap();
    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.available_balance, Naira::from(2_000));
}
