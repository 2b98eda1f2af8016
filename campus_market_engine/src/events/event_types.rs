use crate::{
    db_types::{Dispute, Order},
    fees::Settlement,
};

/// Payment verified and escrow opened; the order is live for riders.
#[derive(Debug, Clone)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Buyer confirmed delivery and both escrow holds were released.
#[derive(Debug, Clone)]
pub struct OrderCompletedEvent {
    pub order: Order,
    pub settlement: Settlement,
}

impl OrderCompletedEvent {
    pub fn new(order: Order, settlement: Settlement) -> Self {
        Self { order, settlement }
    }
}

/// An admin closed a dispute; funds may have been redirected and penalties issued.
#[derive(Debug, Clone)]
pub struct DisputeResolvedEvent {
    pub dispute: Dispute,
}

impl DisputeResolvedEvent {
    pub fn new(dispute: Dispute) -> Self {
        Self { dispute }
    }
}
