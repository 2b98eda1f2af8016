use log::debug;
use sqlx::SqliteConnection;

use cm_common::Naira;

use crate::{
    db_types::{Dispute, DisputeMessage, DisputeStatus, Order, Role},
    traits::DisputeError,
};

pub async fn insert_dispute(
    order: &Order,
    reason: &str,
    buyer_evidence: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Dispute, DisputeError> {
    let dispute: Dispute = sqlx::query_as(
        r#"
        INSERT INTO disputes (order_id, buyer_id, seller_id, reason, buyer_evidence)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
        "#,
    )
    .bind(order.id)
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(reason)
    .bind(buyer_evidence)
    .fetch_one(conn)
    .await?;
    debug!("⚖️ Dispute #{} recorded against order {}", dispute.id, order.order_number);
    Ok(dispute)
}

pub async fn dispute_by_id(dispute_id: i64, conn: &mut SqliteConnection) -> Result<Option<Dispute>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM disputes WHERE id = $1").bind(dispute_id).fetch_optional(conn).await
}

pub async fn insert_message(
    dispute_id: i64,
    sender_id: i64,
    sender_role: Role,
    message: &str,
    evidence: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<DisputeMessage, DisputeError> {
    let message: DisputeMessage = sqlx::query_as(
        r#"
        INSERT INTO dispute_messages (dispute_id, sender_id, sender_role, message, evidence)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
        "#,
    )
    .bind(dispute_id)
    .bind(sender_id)
    .bind(sender_role)
    .bind(message)
    .bind(evidence)
    .fetch_one(conn)
    .await?;
    Ok(message)
}

/// The seller's first response bumps an `Open` dispute to `UnderReview` and stores their
/// evidence. A no-op if the dispute has already advanced.
pub async fn advance_to_review(
    dispute_id: i64,
    seller_evidence: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE disputes SET status = 'UnderReview', seller_evidence = COALESCE($1, seller_evidence), \
         updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = 'Open'",
    )
    .bind(seller_evidence)
    .bind(dispute_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Applies the terminal resolution, compare-and-set on the dispute still being live. `None`
/// means another resolution got there first.
pub async fn resolve(
    dispute_id: i64,
    status: DisputeStatus,
    resolution: &str,
    refund_amount: Option<Naira>,
    admin_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Dispute>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE disputes SET
            status = $1,
            resolution = $2,
            refund_amount = $3,
            resolved_by = $4,
            resolved_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $5 AND status IN ('Open', 'UnderReview')
        RETURNING *;
        "#,
    )
    .bind(status)
    .bind(resolution)
    .bind(refund_amount)
    .bind(admin_id)
    .bind(dispute_id)
    .fetch_optional(conn)
    .await
}

pub async fn messages_for_dispute(
    dispute_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<DisputeMessage>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM dispute_messages WHERE dispute_id = $1 ORDER BY id ASC")
        .bind(dispute_id)
        .fetch_all(conn)
        .await
}
