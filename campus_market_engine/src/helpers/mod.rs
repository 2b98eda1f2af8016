//! Identifier and reference generation.
//!
//! Ledger references are deterministic where a row must be findable again (escrow holds, dispute
//! refunds) and random where they only need to be unique (order numbers, withdrawal references).
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderNumber;

fn random_tag(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// Human-readable order number, e.g. `CM-X4J9Q2ZK`.
pub fn new_order_number() -> OrderNumber {
    OrderNumber(format!("CM-{}", random_tag(8).to_uppercase()))
}

/// Gateway transaction reference for a checkout draft.
pub fn new_payment_reference() -> String {
    format!("pay_{}", random_tag(16).to_lowercase())
}

pub fn new_withdrawal_reference() -> String {
    format!("wd_{}", random_tag(16).to_lowercase())
}

/// The escrow hold for `(order, leg)`. Deterministic: release and dispute refunds look the row up
/// by this string, and the unique index on it enforces at most one hold per order and leg.
pub fn escrow_reference(order_number: &OrderNumber, leg: &str) -> String {
    format!("escrow:{}:{leg}", order_number.as_str())
}

pub fn commission_reference(order_number: &OrderNumber) -> String {
    format!("commission:{}", order_number.as_str())
}

pub fn dispute_reference(dispute_id: i64) -> String {
    format!("dispute:{dispute_id}")
}
