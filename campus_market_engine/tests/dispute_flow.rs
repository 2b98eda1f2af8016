//! Dispute lifecycle tests: opening, the message thread, and both refund paths of resolution.
mod common;

use campus_market_engine::{
    db_types::{DisputeStatus, EntryType, OrderStatus},
    traits::{AccountManagement, DisputeDecision, DisputeError, OrderFlowError, RefundPolicy},
};
use cm_common::Naira;
use common::new_rig;

fn buyer_favor(refund: i64) -> DisputeDecision {
    DisputeDecision {
        status: DisputeStatus::ResolvedBuyerFavor,
        resolution: "Item not as described".to_string(),
        refund_amount: Some(Naira::from(refund)),
        penalize_buyer: false,
        penalize_seller: false,
    }
}

#[tokio::test]
async fn dispute_opens_only_once_per_order() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;

    let dispute = api
        .open_dispute(rig.buyer.id, &order.order_number, "Wrong edition delivered", Some("photo.jpg".into()))
        .await
        .unwrap();
    assert_eq!(dispute.status, DisputeStatus::Open);
    let order = rig.refetch(&order).await;
    assert!(order.is_disputed);

    // The buyer's opening statement is the first message in the thread.
    let thread = rig.db.fetch_dispute_messages(dispute.id).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].sender_id, rig.buyer.id);

    let err = api.open_dispute(rig.buyer.id, &order.order_number, "again", None).await.unwrap_err();
    assert!(matches!(err, DisputeError::AlreadyDisputed(_)));
}

#[tokio::test]
async fn dispute_requires_a_delivered_or_completed_order() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.paid_order().await;
    let err = api.open_dispute(rig.buyer.id, &order.order_number, "too slow", None).await.unwrap_err();
    assert!(matches!(err, DisputeError::NotEligibleStatus(OrderStatus::Pending)));
}

#[tokio::test]
async fn only_the_buyer_can_open_a_dispute() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let err = api.open_dispute(rig.rider.id, &order.order_number, "hmm", None).await.unwrap_err();
    assert!(matches!(err, DisputeError::NotYourOrder(_)));
}

#[tokio::test]
async fn seller_response_moves_the_dispute_under_review() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "damaged", None).await.unwrap();

    api.respond(rig.seller.id, dispute.id, "It left my stall intact", Some("receipt.jpg".into()))
        .await
        .unwrap();
    let dispute = rig.db.fetch_dispute(dispute.id).await.unwrap().unwrap();
    assert_eq!(dispute.status, DisputeStatus::UnderReview);
    assert_eq!(dispute.seller_evidence.as_deref(), Some("receipt.jpg"));

    // Strangers cannot post into the thread.
    let err = api.respond(rig.rider.id, dispute.id, "me too", None).await.unwrap_err();
    assert!(matches!(err, DisputeError::NotAuthorized));
}

#[tokio::test]
async fn buyer_favor_refund_before_release_comes_out_of_escrow() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "not as described", None).await.unwrap();

    api.resolve(rig.admin.id, dispute.id, buyer_favor(4740)).await.unwrap();

    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.pending_balance, Naira::from(0));
    let buyer = rig.account(rig.buyer.id).await;
    assert_eq!(buyer.available_balance, Naira::from(4740));
    // One credit row for the buyer, referencing the dispute.
    let credit = rig
        .ledger(rig.buyer.id)
        .await
        .into_iter()
        .find(|e| e.entry_type == EntryType::Credit)
        .expect("buyer should have a refund credit");
    assert_eq!(credit.reference, format!("dispute:{}", dispute.id));
    assert_eq!(credit.amount, Naira::from(4740));

    // Resolution unfreezes the order.
    let order = rig.refetch(&order).await;
    assert!(!order.is_disputed);

    // The emptied escrow means a later confirmation releases nothing extra to the seller.
    let breakdown = rig.order_api().confirm_delivery(rig.buyer.id, &order.order_number).await.unwrap();
    assert_eq!(breakdown.seller, Naira::from(0));
    assert_eq!(breakdown.rider, Naira::from(560));
    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.available_balance, Naira::from(0));
}

#[tokio::test]
async fn partial_refund_leaves_the_remainder_for_settlement() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "one item missing", None).await.unwrap();

    api.resolve(rig.admin.id, dispute.id, buyer_favor(2000)).await.unwrap();

    let breakdown = rig.order_api().confirm_delivery(rig.buyer.id, &order.order_number).await.unwrap();
    assert_eq!(breakdown.seller, Naira::from(2740));
    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.available_balance, Naira::from(2740));
    assert_eq!(seller.pending_balance, Naira::from(0));
}

#[tokio::test]
async fn refund_after_settlement_debits_available_funds() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.completed_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "broke after a day", None).await.unwrap();

    api.resolve(rig.admin.id, dispute.id, buyer_favor(4740)).await.unwrap();

    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.available_balance, Naira::from(0));
    let buyer = rig.account(rig.buyer.id).await;
    assert_eq!(buyer.available_balance, Naira::from(4740));
    // The clawback is a Debit row on the seller's available pool.
    let debit = rig
        .ledger(rig.seller.id)
        .await
        .into_iter()
        .find(|e| e.entry_type == EntryType::Debit)
        .expect("seller should have a clawback debit");
    assert_eq!(debit.amount, Naira::from(-4740));
}

#[tokio::test]
async fn deny_settled_policy_rejects_post_settlement_refunds() {
    let rig = new_rig().await;
    let api = rig.dispute_api().with_refund_policy(RefundPolicy::DenySettled);
    let order = rig.completed_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "broke after a day", None).await.unwrap();

    let err = api.resolve(rig.admin.id, dispute.id, buyer_favor(4740)).await.unwrap_err();
    assert!(matches!(err, DisputeError::RefundAfterSettlement(_)));

    // Nothing moved.
    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.available_balance, Naira::from(4740));
    let buyer = rig.account(rig.buyer.id).await;
    assert_eq!(buyer.available_balance, Naira::from(0));
}

#[tokio::test]
async fn resolution_is_terminal() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "damaged", None).await.unwrap();

    api.resolve(rig.admin.id, dispute.id, buyer_favor(1000)).await.unwrap();
    let err = api.resolve(rig.admin.id, dispute.id, buyer_favor(1000)).await.unwrap_err();
    assert!(matches!(err, DisputeError::AlreadyResolved(_)));

    // Nor can the thread continue.
    let err = api.respond(rig.buyer.id, dispute.id, "hello?", None).await.unwrap_err();
    assert!(matches!(err, DisputeError::AlreadyResolved(_)));
}

#[tokio::test]
async fn buyer_favor_with_seller_penalty_suspends_the_seller() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "counterfeit", None).await.unwrap();

    let decision = DisputeDecision {
        status: DisputeStatus::ResolvedBuyerFavor,
        resolution: "Counterfeit item".to_string(),
        refund_amount: Some(Naira::from(4740)),
        penalize_buyer: false,
        penalize_seller: true,
    };
    api.resolve(rig.admin.id, dispute.id, decision).await.unwrap();

    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.penalty_points, 3);
    assert!(seller.is_suspended);
    assert!(seller.suspended_until.is_some());
    let penalties = rig.db.fetch_penalties_for_account(rig.seller.id).await.unwrap();
    assert_eq!(penalties.len(), 1);
    assert_eq!(penalties[0].dispute_id, Some(dispute.id));
}

#[tokio::test]
async fn dismissed_dispute_with_buyer_penalty_warns_the_buyer() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "frivolous", None).await.unwrap();

    let decision = DisputeDecision {
        status: DisputeStatus::Dismissed,
        resolution: "No evidence of a problem".to_string(),
        refund_amount: None,
        penalize_buyer: true,
        penalize_seller: false,
    };
    api.resolve(rig.admin.id, dispute.id, decision).await.unwrap();

    let buyer = rig.account(rig.buyer.id).await;
    assert_eq!(buyer.penalty_points, 2);
    assert_eq!(buyer.warning_count, 1);
    assert!(buyer.last_warning_at.is_some());
    assert!(!buyer.is_suspended);
}

#[tokio::test]
async fn settlement_is_frozen_while_a_dispute_is_live() {
    let rig = new_rig().await;
    let order = rig.delivered_order().await;
    rig.dispute_api().open_dispute(rig.buyer.id, &order.order_number, "hold on", None).await.unwrap();

    let err = rig.order_api().confirm_delivery(rig.buyer.id, &order.order_number).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::DisputeInProgress(_)));
}

#[tokio::test]
async fn only_admins_resolve_disputes() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let order = rig.delivered_order().await;
    let dispute = api.open_dispute(rig.buyer.id, &order.order_number, "damaged", None).await.unwrap();

    let err = api.resolve(rig.seller.id, dispute.id, buyer_favor(100)).await.unwrap_err();
    assert!(matches!(err, DisputeError::NotAuthorized));
}
