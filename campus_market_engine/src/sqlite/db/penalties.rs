use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Penalty, PenaltyAction},
    traits::DisputeError,
};

/// Appends a penalty record. For dispute-driven penalties the unique (dispute, user) index makes
/// the insert idempotent: a retried resolution returns the existing record instead of stacking a
/// second one. The boolean is true when a fresh row was written — only then may the caller apply
/// the penalty's account effects.
pub async fn insert_penalty(
    user_id: i64,
    action: PenaltyAction,
    reason: &str,
    points_added: i64,
    banned_until: Option<DateTime<Utc>>,
    dispute_id: Option<i64>,
    issued_by: i64,
    conn: &mut SqliteConnection,
) -> Result<(Penalty, bool), DisputeError> {
    let inserted: Option<Penalty> = sqlx::query_as(
        r#"
        INSERT INTO penalties (user_id, action, reason, points_added, banned_until, dispute_id, issued_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (dispute_id, user_id) DO NOTHING
        RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(reason)
    .bind(points_added)
    .bind(banned_until)
    .bind(dispute_id)
    .bind(issued_by)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(penalty) => {
            debug!("⚖️ Penalty {} recorded against account #{user_id}", penalty.action);
            Ok((penalty, true))
        },
        // Conflict: this dispute already penalized this user.
        None => {
            let existing: Penalty =
                sqlx::query_as("SELECT * FROM penalties WHERE dispute_id = $1 AND user_id = $2")
                    .bind(dispute_id)
                    .bind(user_id)
                    .fetch_one(conn)
                    .await?;
            Ok((existing, false))
        },
    }
}

pub async fn penalties_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Penalty>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM penalties WHERE user_id = $1 ORDER BY id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}
