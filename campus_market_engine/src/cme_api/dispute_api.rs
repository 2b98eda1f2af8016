use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Dispute, DisputeMessage, OrderNumber, Penalty, PenaltyAction},
    events::{DisputeResolvedEvent, EventProducers},
    traits::{DisputeDecision, DisputeError, MarketplaceDatabase, PenaltyPolicy, RefundPolicy},
};

/// `DisputeApi` handles buyer-initiated adjudication and the penalties that come out of it.
///
/// The refund and penalty policies are fixed at construction; handlers pass only the acting
/// account ids.
pub struct DisputeApi<B> {
    db: B,
    producers: EventProducers,
    refund_policy: RefundPolicy,
    penalty_policy: PenaltyPolicy,
}

impl<B> Debug for DisputeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DisputeApi")
    }
}

impl<B> DisputeApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self {
            db,
            producers,
            refund_policy: RefundPolicy::default(),
            penalty_policy: PenaltyPolicy::default(),
        }
    }

    pub fn with_refund_policy(mut self, policy: RefundPolicy) -> Self {
        self.refund_policy = policy;
        self
    }

    pub fn with_penalty_policy(mut self, policy: PenaltyPolicy) -> Self {
        self.penalty_policy = policy;
        self
    }
}

impl<B> DisputeApi<B>
where B: MarketplaceDatabase
{
    /// Raises a dispute on a delivered or completed order. The order is frozen against settlement
    /// until an admin resolves the dispute; at most one live dispute per order.
    pub async fn open_dispute(
        &self,
        buyer_id: i64,
        order_number: &OrderNumber,
        reason: &str,
        evidence: Option<String>,
    ) -> Result<Dispute, DisputeError> {
        let dispute = self.db.open_dispute(buyer_id, order_number, reason, evidence).await?;
        debug!("⚖️ Dispute #{} opened on order {order_number}", dispute.id);
        Ok(dispute)
    }

    /// Appends a message to the dispute thread. Only the two parties and admins may post. A
    /// seller's first response moves the dispute to `UnderReview`.
    pub async fn respond(
        &self,
        sender_id: i64,
        dispute_id: i64,
        message: &str,
        evidence: Option<String>,
    ) -> Result<DisputeMessage, DisputeError> {
        self.db.add_dispute_message(sender_id, dispute_id, message, evidence).await
    }

    /// Applies an admin's terminal decision: redirect funds per the refund policy, issue any
    /// penalties, unfreeze the order. A dispute resolves exactly once.
    pub async fn resolve(
        &self,
        admin_id: i64,
        dispute_id: i64,
        decision: DisputeDecision,
    ) -> Result<Dispute, DisputeError> {
        let dispute = self
            .db
            .resolve_dispute(admin_id, dispute_id, decision, self.refund_policy, &self.penalty_policy)
            .await?;
        debug!("⚖️ Dispute #{dispute_id} resolved as {}", dispute.status);
        self.call_dispute_resolved_hook(&dispute).await;
        Ok(dispute)
    }

    /// A standalone administrative penalty, outside any dispute.
    pub async fn issue_penalty(
        &self,
        admin_id: i64,
        user_id: i64,
        action: PenaltyAction,
        reason: &str,
    ) -> Result<Penalty, DisputeError> {
        let penalty = self.db.issue_penalty(admin_id, user_id, action, reason, &self.penalty_policy).await?;
        debug!("⚖️ Penalty {action} issued to account #{user_id} by admin #{admin_id}");
        Ok(penalty)
    }

    async fn call_dispute_resolved_hook(&self, dispute: &Dispute) {
        for emitter in &self.producers.dispute_resolved_producer {
            let event = DisputeResolvedEvent::new(dispute.clone());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
