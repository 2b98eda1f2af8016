//! Standalone penalty issuance: point/ban lookup tables, trust downgrades, and the
//! auto-suspension policy hook.
mod common;

use campus_market_engine::{
    db_types::{PenaltyAction, TrustLevel},
    sqlite::db::accounts,
    traits::{DisputeError, PenaltyPolicy},
    DisputeApi,
};
use chrono::{Duration, Utc};
use common::new_rig;

#[tokio::test]
async fn warning_adds_one_point_and_bumps_the_warning_counter() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let penalty =
        api.issue_penalty(rig.admin.id, rig.seller.id, PenaltyAction::Warning, "late handoff").await.unwrap();
    assert_eq!(penalty.points_added, 1);
    assert!(penalty.banned_until.is_none());

    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.penalty_points, 1);
    assert_eq!(seller.warning_count, 1);
    assert!(!seller.is_suspended);
}

#[tokio::test]
async fn temp_ban_suspends_for_its_duration() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    api.issue_penalty(rig.admin.id, rig.rider.id, PenaltyAction::TempBan7Days, "order tampering")
        .await
        .unwrap();

    let rider = rig.account(rig.rider.id).await;
    assert_eq!(rider.penalty_points, 10);
    assert!(rider.is_suspended);
    let until = rider.suspended_until.expect("temp ban must set an expiry");
    let expected = Utc::now() + Duration::days(7);
    assert!((until - expected).num_minutes().abs() < 5);
}

#[tokio::test]
async fn permanent_ban_is_effectively_forever() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    api.issue_penalty(rig.admin.id, rig.seller.id, PenaltyAction::PermanentBan, "fraud").await.unwrap();

    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.penalty_points, 50);
    assert!(seller.is_suspended);
    let until = seller.suspended_until.unwrap();
    assert!(until > Utc::now() + Duration::days(365 * 50));
}

#[tokio::test]
async fn downgrade_steps_one_tier_and_floors_at_bronze() {
    let rig = new_rig().await;
    let api = rig.dispute_api();

    // Start the seller at Gold.
    let mut conn = rig.db.pool().acquire().await.unwrap();
    accounts::set_trust_level(rig.seller.id, TrustLevel::Gold, &mut conn).await.unwrap();
    drop(conn);

    api.issue_penalty(rig.admin.id, rig.seller.id, PenaltyAction::TrustLevelDowngrade, "misleading listing")
        .await
        .unwrap();
    let seller = rig.account(rig.seller.id).await;
    assert_eq!(seller.trust_level, TrustLevel::Silver);

    api.issue_penalty(rig.admin.id, rig.seller.id, PenaltyAction::TrustLevelDowngrade, "again").await.unwrap();
    api.issue_penalty(rig.admin.id, rig.seller.id, PenaltyAction::TrustLevelDowngrade, "and again")
        .await
        .unwrap();
    let seller = rig.account(rig.seller.id).await;
    // Bronze is the floor, however many downgrades land.
    assert_eq!(seller.trust_level, TrustLevel::Bronze);
}

#[tokio::test]
async fn accumulated_points_trigger_the_auto_suspension_policy() {
    let rig = new_rig().await;
    let policy = PenaltyPolicy { auto_suspend_at: Some(3), suspension: Duration::days(2) };
    let api = DisputeApi::new(rig.db.clone(), Default::default()).with_penalty_policy(policy);

    api.issue_penalty(rig.admin.id, rig.buyer.id, PenaltyAction::Warning, "spam").await.unwrap();
    let buyer = rig.account(rig.buyer.id).await;
    assert!(!buyer.is_suspended);

    api.issue_penalty(rig.admin.id, rig.buyer.id, PenaltyAction::Warning, "spam").await.unwrap();
    api.issue_penalty(rig.admin.id, rig.buyer.id, PenaltyAction::Warning, "spam").await.unwrap();
    let buyer = rig.account(rig.buyer.id).await;
    assert_eq!(buyer.penalty_points, 3);
    assert!(buyer.is_suspended, "threshold reached: the policy hook must suspend");
}

#[tokio::test]
async fn points_without_a_policy_have_no_automatic_consequence() {
    let rig = new_rig().await;
    let policy = PenaltyPolicy { auto_suspend_at: None, suspension: Duration::days(7) };
    let api = DisputeApi::new(rig.db.clone(), Default::default()).with_penalty_policy(policy);

    for _ in 0..5 {
        api.issue_penalty(rig.admin.id, rig.buyer.id, PenaltyAction::Warning, "spam").await.unwrap();
    }
    let buyer = rig.account(rig.buyer.id).await;
    assert_eq!(buyer.penalty_points, 5);
    assert!(!buyer.is_suspended);
}

#[tokio::test]
async fn only_admins_issue_penalties() {
    let rig = new_rig().await;
    let api = rig.dispute_api();
    let err = api
        .issue_penalty(rig.seller.id, rig.buyer.id, PenaltyAction::Warning, "revenge")
        .await
        .unwrap_err();
    assert!(matches!(err, DisputeError::NotAuthorized));
}
