//! `SqliteDatabase` is the concrete SQLite backend for the campus market engine.
//!
//! Every write flow runs inside a single `sqlx` transaction, and every guard (order status, rider
//! slot, balance floor, dispute flag) is a compare-and-set inside that transaction, so a
//! check-then-mutate interleaving between two requests has nowhere to happen.
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::{SqliteConnection, SqlitePool};

use cm_common::Naira;

use crate::{
    cme_api::order_objects::OrderQueryFilter,
    db_types::{
        Account,
        BalancePool,
        Dispute,
        DisputeMessage,
        DisputeStatus,
        EntryType,
        LedgerEntry,
        NewAccount,
        NewOrder,
        NewProduct,
        Order,
        OrderNumber,
        OrderStatus,
        Penalty,
        PenaltyAction,
        Product,
        Role,
        TrustLevel,
    },
    fees::{self, Settlement, DELIVERY_FEE, PLATFORM_ACCOUNT_ID, RIDER_PAYOUT},
    helpers,
    sqlite::db::{accounts, disputes, ledger, orders, penalties, products},
    traits::{
        AccountApiError,
        AccountManagement,
        BankDetails,
        DisputeDecision,
        DisputeError,
        LedgerError,
        MarketplaceDatabase,
        OrderFlowError,
        PayoutGateway,
        PenaltyPolicy,
        RefundPolicy,
        TransferReceipt,
        VerifiedPayment,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = super::db::new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Account and product rows normally arrive from the signup and catalog services; these
    /// helpers exist for bootstrap and tests.
    pub async fn create_account(&self, account: NewAccount) -> Result<Account, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::insert_account(account, &mut conn).await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_product(product, &mut conn).await
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn validate_new_order(
        &self,
        buyer_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<NewOrder, OrderFlowError> {
        if quantity < 1 {
            return Err(OrderFlowError::InvalidQuantity(quantity));
        }
        let mut conn = self.pool.acquire().await?;
        let buyer = accounts::account_by_id(buyer_id, &mut conn)
            .await?
            .ok_or(OrderFlowError::AccountNotFound(buyer_id))?;
        if buyer.is_currently_suspended(Utc::now()) {
            return Err(OrderFlowError::AccountSuspended(buyer_id));
        }
        let product = products::product_by_id(product_id, &mut conn)
            .await?
            .ok_or(OrderFlowError::ProductNotFound(product_id))?;
        if !product.is_active {
            return Err(OrderFlowError::ProductUnavailable(product_id));
        }
        if product.seller_id == buyer_id {
            return Err(OrderFlowError::SelfPurchase);
        }
        if product.quantity < quantity {
            return Err(OrderFlowError::OutOfStock {
                product_id,
                available: product.quantity,
                requested: quantity,
            });
        }
        let subtotal = product.price * quantity;
        let commission = fees::commission_for(subtotal);
        Ok(NewOrder {
            payment_reference: helpers::new_payment_reference(),
            buyer_id,
            seller_id: product.seller_id,
            product_id,
            quantity,
            product_price: product.price,
            delivery_fee: DELIVERY_FEE,
            platform_commission: commission,
            total_amount: subtotal + DELIVERY_FEE,
        })
    }

    async fn process_verified_payment(&self, payment: VerifiedPayment) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        if orders::fetch_order_by_reference(&payment.reference, &mut tx).await?.is_some() {
            return Err(OrderFlowError::PaymentAlreadyProcessed(payment.reference));
        }
        let m = &payment.metadata;
        if m.quantity < 1 {
            return Err(OrderFlowError::VerificationFailed(format!(
                "verified metadata carries quantity {}",
                m.quantity
            )));
        }
        let buyer = accounts::account_by_id(m.buyer_id, &mut tx)
            .await?
            .ok_or(OrderFlowError::AccountNotFound(m.buyer_id))?;
        let product = products::product_by_id(m.product_id, &mut tx)
            .await?
            .ok_or(OrderFlowError::ProductUnavailable(m.product_id))?;
        if product.seller_id == buyer.id {
            return Err(OrderFlowError::SelfPurchase);
        }
        // The settlement math depends on these snapshots; a transaction whose amounts don't
        // reconcile was not initialised by our checkout and cannot create an order.
        let subtotal = m.product_price * m.quantity;
        if m.delivery_fee != DELIVERY_FEE
            || m.total_amount != subtotal + m.delivery_fee
            || payment.amount != m.total_amount
        {
            return Err(OrderFlowError::VerificationFailed(format!(
                "amounts in [{}] do not reconcile: {} paid for a {} order",
                payment.reference, payment.amount, m.total_amount
            )));
        }
        if !products::decrement_stock(m.product_id, m.quantity, &mut tx).await? {
            return Err(OrderFlowError::OutOfStock {
                product_id: m.product_id,
                available: product.quantity,
                requested: m.quantity,
            });
        }
        let draft = NewOrder {
            payment_reference: payment.reference.clone(),
            buyer_id: buyer.id,
            seller_id: product.seller_id,
            product_id: product.id,
            quantity: m.quantity,
            product_price: m.product_price,
            delivery_fee: m.delivery_fee,
            platform_commission: fees::commission_for(subtotal),
            total_amount: m.total_amount,
        };
        let order_number = helpers::new_order_number();
        let order = orders::insert_order(&order_number, &draft, &mut tx).await?;
        let split = Settlement::for_order(&order);
        ledger::open_escrow(
            order.seller_id,
            split.seller,
            &helpers::escrow_reference(&order.order_number, "seller"),
            &format!("Escrow hold for order {}", order.order_number),
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        debug!("🗃️ Order {} created and seller escrow of {} opened", order.order_number, split.seller);
        Ok(order)
    }

    async fn assign_rider(
        &self,
        rider_id: i64,
        order_number: &OrderNumber,
    ) -> Result<(Order, LedgerEntry), OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let rider = accounts::account_by_id(rider_id, &mut tx)
            .await?
            .ok_or(OrderFlowError::AccountNotFound(rider_id))?;
        if !rider.roles.contains(Role::Rider) {
            return Err(OrderFlowError::RoleRequired { account_id: rider_id, role: Role::Rider });
        }
        if rider.is_currently_suspended(Utc::now()) {
            return Err(OrderFlowError::AccountSuspended(rider_id));
        }
        let Some(order) = orders::claim_rider_slot(order_number, rider_id, &mut tx).await? else {
            // Lost the claim; find out why for a specific error.
            return match orders::fetch_order_by_number(order_number, &mut tx).await? {
                None => Err(OrderFlowError::OrderNotFound(order_number.clone())),
                Some(o) if o.rider_id.is_some() => Err(OrderFlowError::AlreadyAssigned(order_number.clone())),
                Some(_) => Err(OrderFlowError::NotPending(order_number.clone())),
            };
        };
        let escrow = ledger::open_escrow(
            rider_id,
            RIDER_PAYOUT,
            &helpers::escrow_reference(order_number, "rider"),
            &format!("Delivery fee hold for order {order_number}"),
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        debug!("🗃️ Rider #{rider_id} assigned to {order_number}; {RIDER_PAYOUT} in escrow");
        Ok((order, escrow))
    }

    async fn progress_delivery(
        &self,
        rider_id: i64,
        order_number: &OrderNumber,
        new_status: OrderStatus,
    ) -> Result<Order, OrderFlowError> {
        let Some(from) = new_status.delivery_predecessor() else {
            return Err(OrderFlowError::InvalidStatusProgression { from: new_status, to: new_status });
        };
        let mut conn = self.pool.acquire().await?;
        match orders::progress_status(order_number, rider_id, from, new_status, &mut conn).await? {
            Some(order) => Ok(order),
            None => match orders::fetch_order_by_number(order_number, &mut conn).await? {
                None => Err(OrderFlowError::OrderNotFound(order_number.clone())),
                Some(o) if o.rider_id != Some(rider_id) => {
                    Err(OrderFlowError::NotYourDelivery(order_number.clone()))
                },
                Some(o) => Err(OrderFlowError::InvalidStatusProgression { from: o.status, to: new_status }),
            },
        }
    }

    async fn settle_order(
        &self,
        buyer_id: i64,
        order_number: &OrderNumber,
    ) -> Result<(Order, Settlement), OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_number(order_number, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_number.clone()))?;
        if order.buyer_id != buyer_id {
            return Err(OrderFlowError::NotYourOrder(order_number.clone()));
        }
        if order.is_disputed {
            return Err(OrderFlowError::DisputeInProgress(order_number.clone()));
        }
        match order.status {
            OrderStatus::Completed => return Err(OrderFlowError::AlreadyReleased(order_number.clone())),
            OrderStatus::Delivered => {},
            _ => return Err(OrderFlowError::NotDelivered(order_number.clone())),
        }
        let Some(rider_id) = order.rider_id else {
            return Err(OrderFlowError::DatabaseError(format!(
                "order {order_number} reached Delivered without a rider"
            )));
        };
        // The status flip is the serialisation point for concurrent confirmations.
        let order = orders::complete_order(order_number, buyer_id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::AlreadyReleased(order_number.clone()))?;

        let seller_credit = ledger::release_escrow(
            &helpers::escrow_reference(order_number, "seller"),
            &format!("Settlement for order {order_number}"),
            &mut tx,
        )
        .await?;
        let rider_credit = ledger::release_escrow(
            &helpers::escrow_reference(order_number, "rider"),
            &format!("Delivery fee for order {order_number}"),
            &mut tx,
        )
        .await?;
        ledger::apply_delta(
            PLATFORM_ACCOUNT_ID,
            BalancePool::Available,
            order.platform_commission,
            EntryType::Credit,
            &helpers::commission_reference(order_number),
            &format!("Commission on order {order_number}"),
            &mut tx,
        )
        .await?;

        let seller = accounts::incr_completed_orders(order.seller_id, &mut tx).await?;
        accounts::set_trust_level(
            seller.id,
            TrustLevel::from_history(seller.completed_orders, seller.average_rating),
            &mut tx,
        )
        .await?;
        let rider = accounts::incr_completed_orders(rider_id, &mut tx).await?;
        accounts::set_trust_level(
            rider.id,
            TrustLevel::from_history(rider.completed_orders, rider.average_rating),
            &mut tx,
        )
        .await?;

        let settlement = Settlement {
            seller: seller_credit.amount,
            rider: rider_credit.amount,
            platform: order.platform_commission,
        };
        tx.commit().await?;
        debug!("🗃️ Order {order_number} completed; escrow released and commission booked");
        Ok((order, settlement))
    }

    async fn open_dispute(
        &self,
        buyer_id: i64,
        order_number: &OrderNumber,
        reason: &str,
        evidence: Option<String>,
    ) -> Result<Dispute, DisputeError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_number(order_number, &mut tx)
            .await?
            .ok_or_else(|| DisputeError::OrderNotFound(order_number.clone()))?;
        if order.buyer_id != buyer_id {
            return Err(DisputeError::NotYourOrder(order_number.clone()));
        }
        if !matches!(order.status, OrderStatus::Delivered | OrderStatus::Completed) {
            return Err(DisputeError::NotEligibleStatus(order.status));
        }
        if !orders::flag_disputed(order.id, &mut tx).await? {
            return Err(DisputeError::AlreadyDisputed(order_number.clone()));
        }
        let dispute = disputes::insert_dispute(&order, reason, evidence.as_deref(), &mut tx).await?;
        disputes::insert_message(dispute.id, buyer_id, Role::Buyer, reason, evidence.as_deref(), &mut tx).await?;
        tx.commit().await?;
        Ok(dispute)
    }

    async fn add_dispute_message(
        &self,
        sender_id: i64,
        dispute_id: i64,
        message: &str,
        evidence: Option<String>,
    ) -> Result<DisputeMessage, DisputeError> {
        let mut tx = self.pool.begin().await?;
        let dispute = disputes::dispute_by_id(dispute_id, &mut tx)
            .await?
            .ok_or(DisputeError::DisputeNotFound(dispute_id))?;
        if dispute.status.is_resolved() {
            return Err(DisputeError::AlreadyResolved(dispute_id));
        }
        let sender_role = if sender_id == dispute.buyer_id {
            Role::Buyer
        } else if sender_id == dispute.seller_id {
            Role::Seller
        } else {
            let account = accounts::account_by_id(sender_id, &mut tx)
                .await?
                .ok_or(DisputeError::NotAuthorized)?;
            if !account.roles.contains(Role::Admin) {
                return Err(DisputeError::NotAuthorized);
            }
            Role::Admin
        };
        let posted =
            disputes::insert_message(dispute_id, sender_id, sender_role, message, evidence.as_deref(), &mut tx)
                .await?;
        // First seller response takes the dispute under review.
        if sender_role == Role::Seller && dispute.status == DisputeStatus::Open {
            disputes::advance_to_review(dispute_id, evidence.as_deref(), &mut tx).await?;
            trace!("⚖️ Dispute #{dispute_id} moved under review on seller response");
        }
        tx.commit().await?;
        Ok(posted)
    }

    async fn resolve_dispute(
        &self,
        admin_id: i64,
        dispute_id: i64,
        decision: DisputeDecision,
        policy: RefundPolicy,
        penalty_policy: &PenaltyPolicy,
    ) -> Result<Dispute, DisputeError> {
        if !decision.status.is_resolved() {
            return Err(DisputeError::NotResolutionStatus(decision.status));
        }
        let mut tx = self.pool.begin().await?;
        let admin = accounts::account_by_id(admin_id, &mut tx)
            .await?
            .ok_or(DisputeError::AccountNotFound(admin_id))?;
        if !admin.roles.contains(Role::Admin) {
            return Err(DisputeError::NotAuthorized);
        }
        let dispute = disputes::dispute_by_id(dispute_id, &mut tx)
            .await?
            .ok_or(DisputeError::DisputeNotFound(dispute_id))?;
        if dispute.status.is_resolved() {
            return Err(DisputeError::AlreadyResolved(dispute_id));
        }
        let order = orders::fetch_order_by_id(dispute.order_id, &mut tx).await?.ok_or_else(|| {
            DisputeError::DatabaseError(format!("dispute #{dispute_id} references a missing order"))
        })?;

        if decision.status == DisputeStatus::ResolvedBuyerFavor {
            if let Some(refund) = decision.refund_amount.filter(Naira::is_positive) {
                // Where the refund comes from depends on whether settlement already ran: before
                // release the funds still sit in the seller's escrow; after release they are in
                // the seller's available pool and the refund policy decides.
                if order.status == OrderStatus::Completed {
                    match policy {
                        RefundPolicy::DenySettled => {
                            return Err(DisputeError::RefundAfterSettlement(dispute_id));
                        },
                        RefundPolicy::DebitAvailable => {
                            ledger::apply_delta(
                                dispute.seller_id,
                                BalancePool::Available,
                                -refund,
                                EntryType::Debit,
                                &format!("{}:refund", helpers::dispute_reference(dispute_id)),
                                &format!("Refund clawback for dispute #{dispute_id}"),
                                &mut tx,
                            )
                            .await?;
                        },
                    }
                } else {
                    ledger::reduce_escrow(
                        &helpers::escrow_reference(&order.order_number, "seller"),
                        refund,
                        &mut tx,
                    )
                    .await?;
                }
                ledger::apply_delta(
                    dispute.buyer_id,
                    BalancePool::Available,
                    refund,
                    EntryType::Credit,
                    &helpers::dispute_reference(dispute_id),
                    &format!("Refund for dispute #{dispute_id} on order {}", order.order_number),
                    &mut tx,
                )
                .await?;
                debug!("⚖️ Dispute #{dispute_id}: {refund} refunded to buyer #{}", dispute.buyer_id);
            }
        }

        if decision.penalize_buyer {
            apply_penalty(
                dispute.buyer_id,
                PenaltyAction::Warning,
                "Dispute raised in bad faith",
                2,
                Some(dispute_id),
                admin_id,
                penalty_policy,
                &mut tx,
            )
            .await?;
        }
        if decision.penalize_seller {
            let buyer_favor = decision.status == DisputeStatus::ResolvedBuyerFavor;
            let (action, points) =
                if buyer_favor { (PenaltyAction::TempBan1Day, 3) } else { (PenaltyAction::Warning, 2) };
            apply_penalty(
                dispute.seller_id,
                action,
                "Dispute found against seller",
                points,
                Some(dispute_id),
                admin_id,
                penalty_policy,
                &mut tx,
            )
            .await?;
        }

        let resolved =
            disputes::resolve(dispute_id, decision.status, &decision.resolution, decision.refund_amount, admin_id, &mut tx)
                .await?
                .ok_or(DisputeError::AlreadyResolved(dispute_id))?;
        orders::clear_disputed(order.id, &mut tx).await?;
        tx.commit().await?;
        Ok(resolved)
    }

    async fn issue_penalty(
        &self,
        admin_id: i64,
        user_id: i64,
        action: PenaltyAction,
        reason: &str,
        penalty_policy: &PenaltyPolicy,
    ) -> Result<Penalty, DisputeError> {
        let mut tx = self.pool.begin().await?;
        let admin = accounts::account_by_id(admin_id, &mut tx)
            .await?
            .ok_or(DisputeError::AccountNotFound(admin_id))?;
        if !admin.roles.contains(Role::Admin) {
            return Err(DisputeError::NotAuthorized);
        }
        accounts::account_by_id(user_id, &mut tx).await?.ok_or(DisputeError::AccountNotFound(user_id))?;
        let penalty =
            apply_penalty(user_id, action, reason, action.points(), None, admin_id, penalty_policy, &mut tx)
                .await?;
        tx.commit().await?;
        Ok(penalty)
    }

    async fn withdraw<G: PayoutGateway + Sync>(
        &self,
        user_id: i64,
        amount: Naira,
        recipient: &BankDetails,
        gateway: &G,
    ) -> Result<TransferReceipt, AccountApiError> {
        let reference = helpers::new_withdrawal_reference();
        let mut tx = self.pool.begin().await?;
        let debit = ledger::apply_delta(
            user_id,
            BalancePool::Available,
            -amount,
            EntryType::Withdrawal,
            &reference,
            &format!("Withdrawal to {}", recipient.account_number),
            &mut tx,
        )
        .await;
        if let Err(e) = debit {
            return Err(match e {
                LedgerError::InsufficientFunds { available, requested, .. } => {
                    AccountApiError::InsufficientBalance { available, requested }
                },
                other => other.into(),
            });
        }
        // The debit is only committed once the gateway accepts the transfer; a declined or failed
        // transfer rolls everything back.
        match gateway.transfer(recipient, amount, &reference).await {
            Ok(receipt) => {
                tx.commit().await?;
                debug!("💸️ Withdrawal [{reference}] of {amount} transferred for account #{user_id}");
                Ok(receipt)
            },
            Err(e) => {
                tx.rollback().await?;
                warn!("💸️ Withdrawal [{reference}] failed at the gateway: {e}");
                Err(AccountApiError::TransferFailed(e.to_string()))
            },
        }
    }
}

/// Appends a penalty and applies its account effects, then evaluates the auto-suspension policy.
/// Idempotent per (dispute, user): a penalty that already exists for the same cause applies no
/// second round of effects.
#[allow(clippy::too_many_arguments)]
async fn apply_penalty(
    user_id: i64,
    action: PenaltyAction,
    reason: &str,
    points: i64,
    dispute_id: Option<i64>,
    issued_by: i64,
    policy: &PenaltyPolicy,
    conn: &mut SqliteConnection,
) -> Result<Penalty, DisputeError> {
    let banned_until = action.ban_duration().map(|d| Utc::now() + d);
    let (penalty, inserted) =
        penalties::insert_penalty(user_id, action, reason, points, banned_until, dispute_id, issued_by, conn)
            .await?;
    if !inserted {
        trace!("⚖️ Penalty for dispute {dispute_id:?} against #{user_id} already applied; skipping effects");
        return Ok(penalty);
    }
    let is_warning = action == PenaltyAction::Warning;
    let total_points = accounts::add_penalty_points(user_id, points, is_warning, conn).await?;
    if let Some(until) = penalty.banned_until {
        accounts::suspend_account(user_id, until, conn).await?;
    }
    if action == PenaltyAction::TrustLevelDowngrade {
        let account =
            accounts::account_by_id(user_id, conn).await?.ok_or(DisputeError::AccountNotFound(user_id))?;
        accounts::set_trust_level(user_id, account.trust_level.demoted(), conn).await?;
    }
    // Explicit policy hook: point accumulation only suspends when a threshold is configured.
    if let Some(threshold) = policy.auto_suspend_at {
        if total_points >= threshold && banned_until.is_none() {
            accounts::suspend_account(user_id, Utc::now() + policy.suspension, conn).await?;
            debug!("⚖️ Account #{user_id} reached {total_points} penalty points; auto-suspended");
        }
    }
    Ok(penalty)
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_account(&self, account_id: i64) -> Result<Option<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::account_by_id(account_id, &mut conn).await
    }

    async fn fetch_account_by_username(&self, username: &str) -> Result<Option<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::account_by_username(username, &mut conn).await
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        products::product_by_id(product_id, &mut conn).await
    }

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(order_number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_account(&self, account_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::orders_for_account(account_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_ledger_for_account(&self, account_id: i64) -> Result<Vec<LedgerEntry>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let entries = ledger::entries_for_account(account_id, &mut conn).await?;
        Ok(entries)
    }

    async fn fetch_dispute(&self, dispute_id: i64) -> Result<Option<Dispute>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let dispute = disputes::dispute_by_id(dispute_id, &mut conn).await?;
        Ok(dispute)
    }

    async fn fetch_dispute_messages(&self, dispute_id: i64) -> Result<Vec<DisputeMessage>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let messages = disputes::messages_for_dispute(dispute_id, &mut conn).await?;
        Ok(messages)
    }

    async fn fetch_penalties_for_account(&self, account_id: i64) -> Result<Vec<Penalty>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let penalties = penalties::penalties_for_user(account_id, &mut conn).await?;
        Ok(penalties)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}
