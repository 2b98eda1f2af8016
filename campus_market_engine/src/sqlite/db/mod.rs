//! # SQLite database methods
//!
//! "Low-level" database interactions, maintained as simple functions (rather than stateful
//! structs) that accept a `&mut SqliteConnection` argument. Callers obtain a connection from a
//! pool, or create an atomic transaction as the need arises and call through with `&mut *tx`.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod accounts;
pub mod disputes;
pub mod ledger;
pub mod orders;
pub mod penalties;
pub mod products;

const SQLITE_DB_URL: &str = "sqlite://data/campus_market.db";

pub fn db_url() -> String {
    let result = env::var("CM_DATABASE_URL").unwrap_or_else(|_| {
        info!("CM_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    use std::str::FromStr;
    use std::time::Duration;
    let opts = sqlx::sqlite::SqliteConnectOptions::from_str(url)?
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Delete);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(opts).await?;
    Ok(pool)
}
