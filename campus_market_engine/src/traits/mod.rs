//! Backend and collaborator contracts.
//!
//! * [`MarketplaceDatabase`] defines the write flows a storage backend must support: order
//!   creation and settlement, escrow management, dispute resolution and penalties. Every method
//!   that touches more than one row is specified as a single atomic unit.
//! * [`AccountManagement`] provides the query surface over accounts, orders, the ledger and
//!   dispute threads.
//! * [`PaymentVerifier`] and [`PayoutGateway`] abstract the external money rails: transaction
//!   verification on the way in, bank transfers on the way out.
mod account_management;
mod marketplace_database;
mod payment_gateway;

pub use account_management::{AccountApiError, AccountManagement};
pub use marketplace_database::{
    DisputeDecision,
    DisputeError,
    LedgerError,
    MarketplaceDatabase,
    OrderFlowError,
    PenaltyPolicy,
    RefundPolicy,
};
pub use payment_gateway::{
    BankDetails,
    GatewayError,
    PaymentMetadata,
    PaymentVerifier,
    PayoutGateway,
    TransferReceipt,
    VerifiedPayment,
};
