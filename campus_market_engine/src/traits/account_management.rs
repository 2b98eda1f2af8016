use cm_common::Naira;
use thiserror::Error;

use crate::{
    db_types::{Account, Dispute, DisputeMessage, LedgerEntry, Order, OrderNumber, Penalty, Product},
    cme_api::order_objects::OrderQueryFilter,
    traits::marketplace_database::LedgerError,
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
    #[error("The requested account #{0} does not exist")]
    AccountNotFound(i64),
    #[error("Account #{0} is suspended")]
    AccountSuspended(i64),
    #[error("Withdrawals must be at least {minimum}; {requested} requested")]
    BelowMinimum { minimum: Naira, requested: Naira },
    #[error("Insufficient available balance: {available} available, {requested} requested")]
    InsufficientBalance { available: Naira, requested: Naira },
    #[error("The payout transfer was not accepted: {0}")]
    TransferFailed(String),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Query surface over accounts, orders, the ledger, and dispute threads. The write flows live on
/// [`super::MarketplaceDatabase`]; this trait never mutates anything.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the account with the given id. `None` if it does not exist.
    async fn fetch_account(&self, account_id: i64) -> Result<Option<Account>, AccountApiError>;

    async fn fetch_account_by_username(&self, username: &str) -> Result<Option<Account>, AccountApiError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, AccountApiError>;

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError>;

    async fn fetch_orders_for_account(&self, account_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// The account's full transaction history, newest first.
    async fn fetch_ledger_for_account(&self, account_id: i64) -> Result<Vec<LedgerEntry>, AccountApiError>;

    async fn fetch_dispute(&self, dispute_id: i64) -> Result<Option<Dispute>, AccountApiError>;

    /// The message thread for a dispute, oldest first.
    async fn fetch_dispute_messages(&self, dispute_id: i64) -> Result<Vec<DisputeMessage>, AccountApiError>;

    async fn fetch_penalties_for_account(&self, account_id: i64) -> Result<Vec<Penalty>, AccountApiError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;
}
