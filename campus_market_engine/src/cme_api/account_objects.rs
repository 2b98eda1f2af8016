use cm_common::Naira;
use serde::Serialize;

use crate::db_types::{Account, LedgerEntry, Order, TrustLevel};

/// An account's balances as shown to the user. Display values are clamped at zero for
/// presentation; the stored balances are never altered by this view.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceView {
    pub account_id: i64,
    pub pending: i64,
    pub available: i64,
    pub trust_level: TrustLevel,
    pub is_suspended: bool,
}

impl From<&Account> for BalanceView {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            pending: account.pending_balance.display_value(),
            available: account.available_balance.display_value(),
            trust_level: account.trust_level,
            is_suspended: account.is_suspended,
        }
    }
}

/// An account with its orders and full transaction history.
#[derive(Debug, Clone, Serialize)]
pub struct AccountHistory {
    pub account: Account,
    pub orders: Vec<Order>,
    pub ledger: Vec<LedgerEntry>,
}

impl AccountHistory {
    pub fn new(account: Account) -> Self {
        Self { account, orders: vec![], ledger: vec![] }
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_ledger(mut self, ledger: Vec<LedgerEntry>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Sum of ledger amounts per pool; equal to the stored balances when the books are straight.
    pub fn reconciled_available(&self) -> Naira {
        self.ledger
            .iter()
            .filter(|e| e.pool == crate::db_types::BalancePool::Available)
            .map(|e| e.amount)
            .sum()
    }
}
