//! Campus Market Engine
//!
//! The settlement core of the campus marketplace: the order lifecycle from verified payment through
//! delivery to fund release, the escrow holds backing every order, the append-only ledger behind
//! each account's balance pools, and the dispute/penalty machinery that can override a settlement.
//!
//! The library is split into two layers:
//! 1. Database management ([`mod@sqlite`]). SQLite is the supported backend. Callers should never
//!    need to touch the database directly; the data types in [`db_types`] are the public face of
//!    the stored records.
//! 2. The public API ([`cme_api`]): [`OrderFlowApi`] for the payment → delivery → settlement flow,
//!    [`DisputeApi`] for adjudication and penalties, and [`AccountApi`] for queries and
//!    withdrawals. Backends implement the traits in [`traits`] to drive these APIs.
//!
//! The engine emits events (order paid, order completed, dispute resolved) through a small hook
//! system in [`events`]; subscribe to them to drive notifications without coupling the core to a
//! delivery transport.
pub mod db_types;
pub mod events;
pub mod fees;
pub mod helpers;
mod cme_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use cme_api::{
    account_objects,
    accounts_api::AccountApi,
    dispute_api::DisputeApi,
    order_flow_api::OrderFlowApi,
    order_objects,
};
pub use traits::{
    AccountApiError,
    AccountManagement,
    DisputeError,
    LedgerError,
    MarketplaceDatabase,
    OrderFlowError,
    PaymentVerifier,
    PayoutGateway,
};
