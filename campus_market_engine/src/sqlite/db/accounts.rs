use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Account, NewAccount, TrustLevel},
    traits::AccountApiError,
};

pub async fn account_by_id(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Account>, AccountApiError> {
    let account = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

pub async fn account_by_username(
    username: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Account>, AccountApiError> {
    let account = sqlx::query_as("SELECT * FROM accounts WHERE username = $1")
        .bind(username)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

pub async fn insert_account(account: NewAccount, conn: &mut SqliteConnection) -> Result<Account, AccountApiError> {
    let account: Account =
        sqlx::query_as("INSERT INTO accounts (username, roles) VALUES ($1, $2) RETURNING *")
            .bind(account.username)
            .bind(account.roles)
            .fetch_one(conn)
            .await?;
    debug!("🧑️ Created account #{} ({})", account.id, account.username);
    Ok(account)
}

/// Adds penalty points and, for warnings, bumps the warning counter and timestamp.
pub async fn add_penalty_points(
    account_id: i64,
    points: i64,
    is_warning: bool,
    conn: &mut SqliteConnection,
) -> Result<i64, AccountApiError> {
    let row: Option<(i64,)> = if is_warning {
        sqlx::query_as(
            "UPDATE accounts SET penalty_points = penalty_points + $1, warning_count = warning_count + 1, \
             last_warning_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $2 RETURNING penalty_points",
        )
        .bind(points)
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?
    } else {
        sqlx::query_as(
            "UPDATE accounts SET penalty_points = penalty_points + $1, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $2 RETURNING penalty_points",
        )
        .bind(points)
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?
    };
    row.map(|(total,)| total).ok_or(AccountApiError::AccountNotFound(account_id))
}

pub async fn suspend_account(
    account_id: i64,
    until: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    sqlx::query(
        "UPDATE accounts SET is_suspended = 1, suspended_until = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(until)
    .bind(account_id)
    .execute(conn)
    .await?;
    debug!("🧑️ Account #{account_id} suspended until {until}");
    Ok(())
}

pub async fn set_trust_level(
    account_id: i64,
    level: TrustLevel,
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    sqlx::query("UPDATE accounts SET trust_level = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(level)
        .bind(account_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Bumps the completion counter and returns the refreshed account so the caller can recompute the
/// trust level from the new history.
pub async fn incr_completed_orders(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Account, AccountApiError> {
    let account: Option<Account> = sqlx::query_as(
        "UPDATE accounts SET completed_orders = completed_orders + 1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $1 RETURNING *",
    )
    .bind(account_id)
    .fetch_optional(conn)
    .await?;
    account.ok_or(AccountApiError::AccountNotFound(account_id))
}
