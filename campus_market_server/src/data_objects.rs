use campus_market_engine::{
    db_types::{DisputeStatus, OrderStatus, PenaltyAction},
    traits::DisputeDecision,
};
use cm_common::Naira;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenDisputeRequest {
    pub order_number: String,
    pub reason: String,
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisputeMessageRequest {
    pub message: String,
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveDisputeRequest {
    pub status: DisputeStatus,
    pub resolution: String,
    pub refund_amount: Option<Naira>,
    #[serde(default)]
    pub penalize_buyer: bool,
    #[serde(default)]
    pub penalize_seller: bool,
}

impl From<ResolveDisputeRequest> for DisputeDecision {
    fn from(r: ResolveDisputeRequest) -> Self {
        DisputeDecision {
            status: r.status,
            resolution: r.resolution,
            refund_amount: r.refund_amount,
            penalize_buyer: r.penalize_buyer,
            penalize_seller: r.penalize_seller,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePenaltyRequest {
    pub user_id: i64,
    pub action: PenaltyAction,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    pub amount: Naira,
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }
}
