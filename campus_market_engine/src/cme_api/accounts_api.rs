use std::fmt::Debug;

use chrono::Utc;
use cm_common::Naira;
use log::*;

use crate::{
    cme_api::{
        account_objects::{AccountHistory, BalanceView},
        order_objects::{OrderQueryFilter, WithdrawalReceipt},
    },
    db_types::{Account, Dispute, DisputeMessage, Order, OrderNumber},
    fees::MIN_WITHDRAWAL,
    traits::{AccountApiError, AccountManagement, BankDetails, MarketplaceDatabase, PayoutGateway},
};

/// Unified read API over accounts, plus the withdrawal flow.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the account with the given id. `None` if it does not exist.
    pub async fn account_by_id(&self, account_id: i64) -> Result<Option<Account>, AccountApiError> {
        self.db.fetch_account(account_id).await
    }

    /// The account's balances as presented to the user (display-clamped, stored values untouched).
    pub async fn balance(&self, account_id: i64) -> Result<BalanceView, AccountApiError> {
        let account = self
            .db
            .fetch_account(account_id)
            .await?
            .ok_or(AccountApiError::AccountNotFound(account_id))?;
        Ok(BalanceView::from(&account))
    }

    /// The account with its orders and complete transaction history.
    pub async fn history(&self, account_id: i64) -> Result<AccountHistory, AccountApiError> {
        let account = self
            .db
            .fetch_account(account_id)
            .await?
            .ok_or(AccountApiError::AccountNotFound(account_id))?;
        let orders = self.db.fetch_orders_for_account(account_id).await?;
        let ledger = self.db.fetch_ledger_for_account(account_id).await?;
        Ok(AccountHistory::new(account).with_orders(orders).with_ledger(ledger))
    }

    pub async fn order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_number(order_number).await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        self.db.search_orders(query).await
    }

    pub async fn dispute(&self, dispute_id: i64) -> Result<Option<Dispute>, AccountApiError> {
        self.db.fetch_dispute(dispute_id).await
    }

    pub async fn dispute_thread(&self, dispute_id: i64) -> Result<Vec<DisputeMessage>, AccountApiError> {
        self.db.fetch_dispute_messages(dispute_id).await
    }
}

impl<B> AccountApi<B>
where B: MarketplaceDatabase
{
    /// Withdraws from the account's available balance to a bank account.
    ///
    /// Validation happens before any state is read or written; the debit and the gateway transfer
    /// then apply as one unit — a declined transfer leaves the balance untouched.
    pub async fn withdraw<G: PayoutGateway + Sync>(
        &self,
        account_id: i64,
        amount: Naira,
        recipient: &BankDetails,
        gateway: &G,
    ) -> Result<WithdrawalReceipt, AccountApiError> {
        if amount < MIN_WITHDRAWAL {
            return Err(AccountApiError::BelowMinimum { minimum: MIN_WITHDRAWAL, requested: amount });
        }
        let account = self
            .db
            .fetch_account(account_id)
            .await?
            .ok_or(AccountApiError::AccountNotFound(account_id))?;
        if account.is_currently_suspended(Utc::now()) {
            return Err(AccountApiError::AccountSuspended(account_id));
        }
        let receipt = self.db.withdraw(account_id, amount, recipient, gateway).await?;
        debug!("💸️ Withdrawal of {amount} from account #{account_id} accepted as [{}]", receipt.reference);
        Ok(WithdrawalReceipt {
            account_id,
            amount,
            reference: receipt.reference,
            transfer_code: receipt.transfer_code,
            created_at: receipt.created_at,
        })
    }
}
