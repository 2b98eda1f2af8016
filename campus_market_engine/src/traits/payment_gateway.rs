use chrono::{DateTime, Utc};
use cm_common::Naira;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    RequestFailed(String),
    #[error("Gateway declined the transaction: {0}")]
    Declined(String),
    #[error("Gateway response could not be interpreted: {0}")]
    MalformedResponse(String),
}

/// The metadata attached to a gateway transaction at checkout and read back at verification.
/// The settlement math depends on these snapshots, so the contract is bit-exact: a verified
/// transaction missing any field cannot create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub product_id: i64,
    pub buyer_id: i64,
    pub quantity: i64,
    pub product_price: Naira,
    pub delivery_fee: Naira,
    pub total_amount: Naira,
}

/// A transaction the gateway has confirmed as paid.
#[derive(Debug, Clone)]
pub struct VerifiedPayment {
    pub reference: String,
    pub amount: Naira,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub reference: String,
    pub transfer_code: String,
    pub amount: Naira,
    pub created_at: DateTime<Utc>,
}

/// Verifies inbound payment references against the gateway.
#[allow(async_fn_in_trait)]
pub trait PaymentVerifier {
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, GatewayError>;
}

/// Initiates outbound bank transfers for withdrawals.
#[allow(async_fn_in_trait)]
pub trait PayoutGateway {
    async fn transfer(
        &self,
        recipient: &BankDetails,
        amount: Naira,
        reference: &str,
    ) -> Result<TransferReceipt, GatewayError>;
}
