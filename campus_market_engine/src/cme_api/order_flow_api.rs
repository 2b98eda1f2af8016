use std::fmt::Debug;

use log::*;

use crate::{
    cme_api::order_objects::{RiderAssignment, SettlementBreakdown},
    db_types::{NewOrder, Order, OrderNumber, OrderStatus},
    events::{EventProducers, OrderCompletedEvent, OrderPaidEvent},
    traits::{MarketplaceDatabase, OrderFlowError, PaymentVerifier},
};

/// `OrderFlowApi` drives an order from checkout through payment, delivery and settlement.
///
/// Authorization is explicit: every method takes the acting account's id as its first argument;
/// the engine never reads ambient session state.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: MarketplaceDatabase
{
    /// Validates a purchase and prices a checkout draft for the buyer.
    ///
    /// Nothing is persisted: the draft carries the payment reference and the bit-exact amounts the
    /// caller must attach to the gateway transaction. The order itself is only created once
    /// [`Self::confirm_payment`] verifies that transaction.
    pub async fn create_order(
        &self,
        buyer_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<NewOrder, OrderFlowError> {
        let draft = self.db.validate_new_order(buyer_id, product_id, quantity).await?;
        debug!(
            "🛒️ Checkout draft [{}] priced at {} for buyer #{buyer_id}",
            draft.payment_reference, draft.total_amount
        );
        Ok(draft)
    }

    /// Verifies a gateway payment reference and creates the order it paid for.
    ///
    /// Idempotent with respect to the reference: a retried confirmation of an already-processed
    /// payment fails with [`OrderFlowError::PaymentAlreadyProcessed`] and changes nothing.
    /// Verification failure leaves no state behind — the gateway is consulted before anything is
    /// written.
    pub async fn confirm_payment<G: PaymentVerifier>(
        &self,
        reference: &str,
        gateway: &G,
    ) -> Result<Order, OrderFlowError> {
        let verified = gateway
            .verify(reference)
            .await
            .map_err(|e| OrderFlowError::VerificationFailed(e.to_string()))?;
        trace!("🔄️💰️ Payment [{reference}] verified for {}", verified.amount);
        let order = self.db.process_verified_payment(verified).await?;
        debug!("🔄️💰️ Order {} created from payment [{reference}]", order.order_number);
        self.call_order_paid_hook(&order).await;
        Ok(order)
    }

    /// Claims a pending order for a rider. Exactly one rider can ever win the claim; the loser of
    /// a race receives [`OrderFlowError::AlreadyAssigned`] and no escrow is opened for them.
    pub async fn accept_order(
        &self,
        rider_id: i64,
        order_number: &OrderNumber,
    ) -> Result<RiderAssignment, OrderFlowError> {
        let (order, escrow) = self.db.assign_rider(rider_id, order_number).await?;
        debug!("🛵️ Order {order_number} claimed by rider #{rider_id}");
        Ok(RiderAssignment { order, escrow })
    }

    /// Advances a delivery one step. Only the assigned rider may call this, and steps cannot be
    /// skipped or repeated.
    pub async fn update_delivery_status(
        &self,
        rider_id: i64,
        order_number: &OrderNumber,
        new_status: OrderStatus,
    ) -> Result<Order, OrderFlowError> {
        if !new_status.is_rider_step() {
            return Err(OrderFlowError::InvalidStatusProgression {
                from: new_status,
                to: new_status,
            });
        }
        let order = self.db.progress_delivery(rider_id, order_number, new_status).await?;
        trace!("🛵️ Order {order_number} is now {new_status}");
        Ok(order)
    }

    /// The buyer's delivery confirmation: releases both escrow holds, credits the platform
    /// commission and completes the order. Succeeds exactly once per order.
    pub async fn confirm_delivery(
        &self,
        buyer_id: i64,
        order_number: &OrderNumber,
    ) -> Result<SettlementBreakdown, OrderFlowError> {
        let (order, settlement) = self.db.settle_order(buyer_id, order_number).await?;
        debug!(
            "✅️ Order {order_number} settled: {} to seller, {} to rider, {} commission",
            settlement.seller, settlement.rider, settlement.platform
        );
        let breakdown = SettlementBreakdown::new(&order, settlement);
        self.call_order_completed_hook(order, settlement).await;
        Ok(breakdown)
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            let event = OrderPaidEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_completed_hook(&self, order: Order, settlement: crate::fees::Settlement) {
        for emitter in &self.producers.order_completed_producer {
            let event = OrderCompletedEvent::new(order.clone(), settlement);
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
