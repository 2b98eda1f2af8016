use chrono::{DateTime, Utc};
use cm_common::Naira;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{LedgerEntry, Order, OrderNumber, OrderStatus},
    fees::Settlement,
};

/// Search criteria for orders. Empty fields are not constrained.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQueryFilter {
    pub buyer_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub rider_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub disputed_only: bool,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_buyer_id(mut self, buyer_id: i64) -> Self {
        self.buyer_id = Some(buyer_id);
        self
    }

    pub fn with_seller_id(mut self, seller_id: i64) -> Self {
        self.seller_id = Some(seller_id);
        self
    }

    pub fn with_rider_id(mut self, rider_id: i64) -> Self {
        self.rider_id = Some(rider_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn disputed_only(mut self) -> Self {
        self.disputed_only = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buyer_id.is_none()
            && self.seller_id.is_none()
            && self.rider_id.is_none()
            && self.status.is_none()
            && !self.disputed_only
            && self.since.is_none()
            && self.until.is_none()
    }
}

/// Result of a rider claiming an order: the updated order plus the delivery-fee escrow that was
/// opened for them.
#[derive(Debug, Clone, Serialize)]
pub struct RiderAssignment {
    pub order: Order,
    pub escrow: LedgerEntry,
}

/// What the buyer's delivery confirmation released, by recipient.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementBreakdown {
    pub order_number: OrderNumber,
    pub seller: Naira,
    pub rider: Naira,
    pub platform: Naira,
    pub total: Naira,
}

impl SettlementBreakdown {
    pub fn new(order: &Order, settlement: Settlement) -> Self {
        Self {
            order_number: order.order_number.clone(),
            seller: settlement.seller,
            rider: settlement.rider,
            platform: settlement.platform,
            total: settlement.total(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalReceipt {
    pub account_id: i64,
    pub amount: Naira,
    pub reference: String,
    pub transfer_code: String,
    pub created_at: DateTime<Utc>,
}
