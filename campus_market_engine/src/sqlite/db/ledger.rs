//! The balance manager: the only module that writes `pending_balance`/`available_balance`.
//!
//! Every successful delta is one guarded `UPDATE` on the account row plus exactly one ledger row
//! whose `balance_before`/`balance_after` come from the same atomic statement — there is no
//! separate read-then-write for concurrent callers to interleave with.
//!
//! Reconciliation invariant: for each account and pool, the sum of row amounts (counting an
//! Escrow row only while it is `Held`) equals the stored balance. Credit/Debit/Withdrawal rows
//! are append-only; Escrow rows are the documented exception — they flip `Held → Released` at
//! settlement and shrink when a dispute refund is carved out of the hold.
use log::trace;
use sqlx::SqliteConnection;

use cm_common::Naira;

use crate::{
    db_types::{BalancePool, EntryType, EscrowStatus, LedgerEntry},
    traits::LedgerError,
};

/// Atomically adjusts the named pool by `delta` and appends the matching ledger row.
///
/// A decrement that would take the pool below zero fails: with `InsufficientFunds` on the
/// available pool (the caller asked for more than is there), or `BalanceUnderflow` on the pending
/// pool (settlement amounts are miscomputed — that is a bug, never a user error).
pub async fn apply_delta(
    account_id: i64,
    pool: BalancePool,
    delta: Naira,
    entry_type: EntryType,
    reference: &str,
    description: &str,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, LedgerError> {
    let col = pool.column();
    let sql = format!(
        "UPDATE accounts SET {col} = {col} + $1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $2 AND {col} + $1 >= 0 RETURNING {col}"
    );
    let after: Option<(Naira,)> =
        sqlx::query_as(&sql).bind(delta).bind(account_id).fetch_optional(&mut *conn).await?;
    let after = match after {
        Some((balance,)) => balance,
        None => return Err(underflow_error(account_id, pool, delta, &mut *conn).await),
    };
    let before = after - delta;
    trace!("🧾️ Account #{account_id} {pool} {before} -> {after} ({entry_type} [{reference}])");
    let escrow_status = (entry_type == EntryType::Escrow).then_some(EscrowStatus::Held);
    insert_entry(account_id, entry_type, pool, delta, reference, escrow_status, before, after, description, conn)
        .await
}

/// Places `amount` on hold in the account's pending pool, recorded as a Held escrow row.
pub async fn open_escrow(
    account_id: i64,
    amount: Naira,
    reference: &str,
    description: &str,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, LedgerError> {
    apply_delta(account_id, BalancePool::Pending, amount, EntryType::Escrow, reference, description, conn).await
}

/// Releases a held escrow: the row flips to `Released`, the held amount leaves the pending pool,
/// and one Credit row moves it into the available pool. Returns the credit row.
///
/// The flip is a compare-and-set, so two concurrent releases of the same hold cannot both
/// succeed.
pub async fn release_escrow(
    reference: &str,
    description: &str,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, LedgerError> {
    let row = held_escrow(reference, &mut *conn).await?;
    let flipped = sqlx::query("UPDATE ledger_entries SET escrow_status = 'Released' WHERE id = $1 AND escrow_status = 'Held'")
        .bind(row.id)
        .execute(&mut *conn)
        .await?;
    if flipped.rows_affected() == 0 {
        return Err(LedgerError::EscrowAlreadyReleased(reference.to_string()));
    }
    debit_pending(row.account_id, row.amount, &mut *conn).await?;
    let credit_ref = format!("{reference}:release");
    apply_delta(
        row.account_id,
        BalancePool::Available,
        row.amount,
        EntryType::Credit,
        &credit_ref,
        description,
        conn,
    )
    .await
}

/// Carves `amount` out of a held escrow without releasing it: the hold (and the seller's pending
/// pool) shrink so that a later release can only pay out the remainder.
pub async fn reduce_escrow(
    reference: &str,
    amount: Naira,
    conn: &mut SqliteConnection,
) -> Result<(), LedgerError> {
    let row = held_escrow(reference, &mut *conn).await?;
    if row.amount < amount {
        return Err(LedgerError::EscrowOverdrawn {
            reference: reference.to_string(),
            held: row.amount,
            requested: amount,
        });
    }
    let shrunk = sqlx::query(
        "UPDATE ledger_entries SET amount = amount - $1 WHERE id = $2 AND escrow_status = 'Held' AND amount >= $1",
    )
    .bind(amount)
    .bind(row.id)
    .execute(&mut *conn)
    .await?;
    if shrunk.rows_affected() == 0 {
        return Err(LedgerError::EscrowAlreadyReleased(reference.to_string()));
    }
    debit_pending(row.account_id, amount, conn).await
}

/// The held escrow row for a deterministic reference.
pub async fn held_escrow(reference: &str, conn: &mut SqliteConnection) -> Result<LedgerEntry, LedgerError> {
    let row: Option<LedgerEntry> =
        sqlx::query_as("SELECT * FROM ledger_entries WHERE reference = $1 AND entry_type = 'Escrow'")
            .bind(reference)
            .fetch_optional(&mut *conn)
            .await?;
    match row {
        None => Err(LedgerError::EscrowNotFound(reference.to_string())),
        Some(row) if row.escrow_status == Some(EscrowStatus::Released) => {
            Err(LedgerError::EscrowAlreadyReleased(reference.to_string()))
        },
        Some(row) => Ok(row),
    }
}

pub async fn entries_for_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ledger_entries WHERE account_id = $1 ORDER BY id DESC")
        .bind(account_id)
        .fetch_all(conn)
        .await
}

pub async fn entry_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ledger_entries WHERE reference = $1")
        .bind(reference)
        .fetch_optional(conn)
        .await
}

/// Removes a released hold's amount from the pending pool. The status flip on the escrow row is
/// the ledger record for this move; no extra row is written.
async fn debit_pending(account_id: i64, amount: Naira, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    let updated = sqlx::query(
        "UPDATE accounts SET pending_balance = pending_balance - $1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $2 AND pending_balance >= $1",
    )
    .bind(amount)
    .bind(account_id)
    .execute(conn)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(LedgerError::BalanceUnderflow { account_id, pool: BalancePool::Pending });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_entry(
    account_id: i64,
    entry_type: EntryType,
    pool: BalancePool,
    amount: Naira,
    reference: &str,
    escrow_status: Option<EscrowStatus>,
    before: Naira,
    after: Naira,
    description: &str,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, LedgerError> {
    let entry = sqlx::query_as(
        r#"
        INSERT INTO ledger_entries (
            account_id,
            entry_type,
            pool,
            amount,
            reference,
            escrow_status,
            balance_before,
            balance_after,
            description
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *;
        "#,
    )
    .bind(account_id)
    .bind(entry_type)
    .bind(pool)
    .bind(amount)
    .bind(reference)
    .bind(escrow_status)
    .bind(before)
    .bind(after)
    .bind(description)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

async fn underflow_error(
    account_id: i64,
    pool: BalancePool,
    delta: Naira,
    conn: &mut SqliteConnection,
) -> LedgerError {
    let balance: Result<Option<(Naira,)>, sqlx::Error> =
        sqlx::query_as(&format!("SELECT {} FROM accounts WHERE id = $1", pool.column()))
            .bind(account_id)
            .fetch_optional(conn)
            .await;
    match balance {
        Err(e) => LedgerError::DatabaseError(e.to_string()),
        Ok(None) => LedgerError::AccountNotFound(account_id),
        Ok(Some((available,))) => match pool {
            BalancePool::Available => {
                LedgerError::InsufficientFunds { account_id, available, requested: -delta }
            },
            BalancePool::Pending => LedgerError::BalanceUnderflow { account_id, pool },
        },
    }
}
