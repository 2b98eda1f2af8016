use chrono::Duration;
use cm_common::Naira;
use thiserror::Error;

use crate::{
    db_types::{
        BalancePool,
        Dispute,
        DisputeMessage,
        DisputeStatus,
        LedgerEntry,
        NewOrder,
        Order,
        OrderNumber,
        OrderStatus,
        Penalty,
        PenaltyAction,
    },
    fees::Settlement,
    traits::{
        account_management::{AccountApiError, AccountManagement},
        payment_gateway::{BankDetails, PayoutGateway, TransferReceipt, VerifiedPayment},
    },
};

/// An admin's resolution of a dispute.
#[derive(Debug, Clone)]
pub struct DisputeDecision {
    /// Must be one of the four terminal resolution states.
    pub status: DisputeStatus,
    pub resolution: String,
    pub refund_amount: Option<Naira>,
    pub penalize_buyer: bool,
    pub penalize_seller: bool,
}

/// What a buyer-favour refund may touch when the order has already settled and the seller's funds
/// sit in the available pool rather than in escrow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefundPolicy {
    /// Debit the seller's available balance; fails rather than letting it go negative.
    #[default]
    DebitAvailable,
    /// Refuse refunds on completed orders altogether.
    DenySettled,
}

/// Evaluated after every penalty write. Explicit policy, not inference: accumulating points has
/// no consequence unless a threshold is configured here.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyPolicy {
    /// Total penalty points at which the account is automatically suspended.
    pub auto_suspend_at: Option<i64>,
    /// How long the automatic suspension lasts.
    pub suspension: Duration,
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        Self { auto_suspend_at: Some(10), suspension: Duration::days(7) }
    }
}

//--------------------------------------    Error types       --------------------------------------------------------

/// Failures of the balance manager. Every balance write in the system funnels through the ledger
/// module, so these are the only ways money movement can fail.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested account #{0} does not exist")]
    AccountNotFound(i64),
    #[error("Insufficient funds on account #{account_id}: {available} available, {requested} requested")]
    InsufficientFunds { account_id: i64, available: Naira, requested: Naira },
    #[error("Balance underflow on the {pool} pool of account #{account_id}; settlement amounts are miscomputed")]
    BalanceUnderflow { account_id: i64, pool: BalancePool },
    #[error("No held escrow found for reference {0}")]
    EscrowNotFound(String),
    #[error("Escrow {0} has already been released")]
    EscrowAlreadyReleased(String),
    #[error("Escrow {reference} holds {held}, cannot carve out {requested}")]
    EscrowOverdrawn { reference: String, held: Naira, requested: Naira },
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("Product #{0} is not available for purchase")]
    ProductUnavailable(i64),
    #[error("Product #{product_id} has {available} left; {requested} requested")]
    OutOfStock { product_id: i64, available: i64, requested: i64 },
    #[error("Sellers cannot buy their own products")]
    SelfPurchase,
    #[error("Order quantity must be at least 1; got {0}")]
    InvalidQuantity(i64),
    #[error("The requested account #{0} does not exist")]
    AccountNotFound(i64),
    #[error("Account #{0} is suspended")]
    AccountSuspended(i64),
    #[error("Account #{account_id} does not hold the {role} role")]
    RoleRequired { account_id: i64, role: crate::db_types::Role },
    #[error("Payment {0} has already been processed")]
    PaymentAlreadyProcessed(String),
    #[error("Payment verification failed: {0}")]
    VerificationFailed(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Order {0} already has a rider assigned")]
    AlreadyAssigned(OrderNumber),
    #[error("Order {0} is not open for rider acceptance")]
    NotPending(OrderNumber),
    #[error("Order {0} is not assigned to you")]
    NotYourDelivery(OrderNumber),
    #[error("Cannot move a delivery from {from} to {to}")]
    InvalidStatusProgression { from: OrderStatus, to: OrderStatus },
    #[error("Order {0} does not belong to you")]
    NotYourOrder(OrderNumber),
    #[error("Order {0} has not been delivered yet")]
    NotDelivered(OrderNumber),
    #[error("Funds for order {0} have already been released")]
    AlreadyReleased(OrderNumber),
    #[error("Order {0} is frozen by an open dispute")]
    DisputeInProgress(OrderNumber),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Account(#[from] AccountApiError),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum DisputeError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Order {0} does not belong to you")]
    NotYourOrder(OrderNumber),
    #[error("Order {0} already has a dispute in progress")]
    AlreadyDisputed(OrderNumber),
    #[error("Disputes can only be raised on delivered or completed orders, not {0}")]
    NotEligibleStatus(OrderStatus),
    #[error("The requested dispute #{0} does not exist")]
    DisputeNotFound(i64),
    #[error("Dispute #{0} has already been resolved")]
    AlreadyResolved(i64),
    #[error("You are not a party to this dispute")]
    NotAuthorized,
    #[error("{0} is not a resolution status")]
    NotResolutionStatus(DisputeStatus),
    #[error("Dispute #{0}: order has already settled and the refund policy denies post-settlement refunds")]
    RefundAfterSettlement(i64),
    #[error("The requested account #{0} does not exist")]
    AccountNotFound(i64),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

impl From<sqlx::Error> for DisputeError {
    fn from(e: sqlx::Error) -> Self {
        DisputeError::DatabaseError(e.to_string())
    }
}

impl From<AccountApiError> for DisputeError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::AccountNotFound(id) => DisputeError::AccountNotFound(id),
            other => DisputeError::DatabaseError(other.to_string()),
        }
    }
}

//--------------------------------------  MarketplaceDatabase  -------------------------------------------------------

/// The highest-level contract for storage backends.
///
/// Every method that performs more than one write applies as a single atomic unit: a failure
/// anywhere leaves no partial state, and the guard conditions (order status, rider slot, balance
/// floors) are checked-and-set inside the same unit, never read-then-written.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + AccountManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Validates a purchase and prices a checkout draft. Read-only: nothing persists until the
    /// gateway confirms the payment.
    async fn validate_new_order(
        &self,
        buyer_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<NewOrder, OrderFlowError>;

    /// Takes a gateway-verified payment and, in one transaction: rejects duplicates of the same
    /// reference, re-checks the product, inserts the order in `Pending`, decrements stock exactly
    /// once, and opens the seller's escrow hold.
    async fn process_verified_payment(&self, payment: VerifiedPayment) -> Result<Order, OrderFlowError>;

    /// Assigns a rider to a pending order. First writer wins: the rider slot is claimed with a
    /// compare-and-set, and the rider's delivery-fee escrow opens in the same transaction.
    async fn assign_rider(
        &self,
        rider_id: i64,
        order_number: &OrderNumber,
    ) -> Result<(Order, LedgerEntry), OrderFlowError>;

    /// Moves a delivery one step along `RiderAssigned → PickedUp → OnTheWay → Delivered`.
    /// Only the assigned rider may call this; `Delivered` stamps `delivered_at` once.
    async fn progress_delivery(
        &self,
        rider_id: i64,
        order_number: &OrderNumber,
        new_status: OrderStatus,
    ) -> Result<Order, OrderFlowError>;

    /// The terminal settlement: `Delivered → Completed`, both escrow holds released to available
    /// balances, platform commission credited, completion counters bumped and trust levels
    /// recomputed. Callable only by the buyer, exactly once per order.
    async fn settle_order(
        &self,
        buyer_id: i64,
        order_number: &OrderNumber,
    ) -> Result<(Order, Settlement), OrderFlowError>;

    /// Opens a dispute on a delivered or completed order and freezes settlement for it.
    /// At most one live dispute per order, enforced with a compare-and-set on the order's
    /// dispute flag.
    async fn open_dispute(
        &self,
        buyer_id: i64,
        order_number: &OrderNumber,
        reason: &str,
        evidence: Option<String>,
    ) -> Result<Dispute, DisputeError>;

    /// Appends a message to a dispute thread. The seller's first response while the dispute is
    /// `Open` advances it to `UnderReview` and records the seller's evidence.
    async fn add_dispute_message(
        &self,
        sender_id: i64,
        dispute_id: i64,
        message: &str,
        evidence: Option<String>,
    ) -> Result<DisputeMessage, DisputeError>;

    /// Applies an admin's resolution: optional refund (routed per `policy` and the order's
    /// settlement state), optional penalties for either party, terminal status on the dispute and
    /// the order unfrozen — one transaction.
    async fn resolve_dispute(
        &self,
        admin_id: i64,
        dispute_id: i64,
        decision: DisputeDecision,
        policy: RefundPolicy,
        penalty_policy: &PenaltyPolicy,
    ) -> Result<Dispute, DisputeError>;

    /// Issues a standalone penalty: appends the penalty record and applies its point, suspension
    /// and trust-level effects to the account in the same transaction, then evaluates
    /// `penalty_policy`.
    async fn issue_penalty(
        &self,
        admin_id: i64,
        user_id: i64,
        action: PenaltyAction,
        reason: &str,
        penalty_policy: &PenaltyPolicy,
    ) -> Result<Penalty, DisputeError>;

    /// Withdraws from the available pool: guarded debit plus a Withdrawal ledger row, committed
    /// only once the payout gateway accepts the transfer. Gateway failure rolls the debit back.
    async fn withdraw<G: PayoutGateway + Sync>(
        &self,
        user_id: i64,
        amount: Naira,
        recipient: &BankDetails,
        gateway: &G,
    ) -> Result<TransferReceipt, AccountApiError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}
