use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use cm_common::Naira;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------        Role          --------------------------------------------------------
/// A capability an account can act under. Roles are polymorphic, not exclusive: one physical
/// account can be both a buyer and a seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Role {
    Buyer,
    Seller,
    Rider,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "Buyer",
            Role::Seller => "Seller",
            Role::Rider => "Rider",
            Role::Admin => "Admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Buyer" => Ok(Self::Buyer),
            "Seller" => Ok(Self::Seller),
            "Rider" => Ok(Self::Rider),
            "Admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

/// The set of roles held by an account, stored as a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Roles(String);

impl Roles {
    pub fn contains(&self, role: Role) -> bool {
        self.0.split(',').any(|r| r.trim() == role.as_str())
    }

    pub fn as_vec(&self) -> Vec<Role> {
        self.0.split(',').filter_map(|r| r.trim().parse().ok()).collect()
    }
}

impl From<Vec<Role>> for Roles {
    fn from(roles: Vec<Role>) -> Self {
        let list = roles.iter().map(Role::as_str).collect::<Vec<_>>().join(",");
        Self(list)
    }
}

impl Display for Roles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------     TrustLevel       --------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Type, Serialize, Deserialize)]
pub enum TrustLevel {
    #[default]
    Bronze,
    Silver,
    Gold,
    Verified,
}

impl TrustLevel {
    /// The single authoritative trust computation. Both the profile read path and settlement use
    /// this; the admin downgrade path only ever steps down from the stored level.
    pub fn from_history(completed_orders: i64, average_rating: f64) -> Self {
        match (completed_orders, average_rating) {
            (n, r) if n >= 50 && r >= 4.5 => TrustLevel::Verified,
            (n, r) if n >= 20 && r >= 4.0 => TrustLevel::Gold,
            (n, r) if n >= 5 && r >= 3.0 => TrustLevel::Silver,
            _ => TrustLevel::Bronze,
        }
    }

    /// One tier down, floored at Bronze.
    pub fn demoted(&self) -> Self {
        match self {
            TrustLevel::Verified => TrustLevel::Gold,
            TrustLevel::Gold => TrustLevel::Silver,
            TrustLevel::Silver | TrustLevel::Bronze => TrustLevel::Bronze,
        }
    }
}

impl Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrustLevel::Bronze => "Bronze",
            TrustLevel::Silver => "Silver",
            TrustLevel::Gold => "Gold",
            TrustLevel::Verified => "Verified",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TrustLevel {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bronze" => Ok(Self::Bronze),
            "Silver" => Ok(Self::Silver),
            "Gold" => Ok(Self::Gold),
            "Verified" => Ok(Self::Verified),
            s => Err(ConversionError(format!("Invalid trust level: {s}"))),
        }
    }
}

//--------------------------------------      Account         --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub roles: Roles,
    pub pending_balance: Naira,
    pub available_balance: Naira,
    pub penalty_points: i64,
    pub warning_count: i64,
    pub last_warning_at: Option<DateTime<Utc>>,
    pub trust_level: TrustLevel,
    pub is_suspended: bool,
    pub suspended_until: Option<DateTime<Utc>>,
    pub completed_orders: i64,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A suspension whose `suspended_until` has elapsed no longer gates the account, without
    /// requiring a separate un-suspend write.
    pub fn is_currently_suspended(&self, now: DateTime<Utc>) -> bool {
        self.is_suspended && self.suspended_until.map_or(true, |until| until > now)
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub roles: Roles,
}

impl NewAccount {
    pub fn new<S: Into<String>>(username: S, roles: Vec<Role>) -> Self {
        Self { username: username.into(), roles: roles.into() }
    }
}

//--------------------------------------      Product         --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub price: Naira,
    pub quantity: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_id: i64,
    pub title: String,
    pub price: Naira,
    pub quantity: i64,
}

//--------------------------------------    OrderStatus       --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Payment verified; waiting for a rider to accept the delivery.
    Pending,
    RiderAssigned,
    PickedUp,
    OnTheWay,
    Delivered,
    /// Funds released. Terminal; monetary fields are immutable from here on.
    Completed,
}

impl OrderStatus {
    /// The status a rider-driven update must currently be in for `self` to be legal next.
    /// Delivery steps are strictly monotonic.
    pub fn delivery_predecessor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::PickedUp => Some(OrderStatus::RiderAssigned),
            OrderStatus::OnTheWay => Some(OrderStatus::PickedUp),
            OrderStatus::Delivered => Some(OrderStatus::OnTheWay),
            _ => None,
        }
    }

    pub fn is_rider_step(&self) -> bool {
        matches!(self, OrderStatus::PickedUp | OrderStatus::OnTheWay | OrderStatus::Delivered)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::RiderAssigned => "RiderAssigned",
            OrderStatus::PickedUp => "PickedUp",
            OrderStatus::OnTheWay => "OnTheWay",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "RiderAssigned" => Ok(Self::RiderAssigned),
            "PickedUp" => Ok(Self::PickedUp),
            "OnTheWay" => Ok(Self::OnTheWay),
            "Delivered" => Ok(Self::Delivered),
            "Completed" => Ok(Self::Completed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    OrderNumber       --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       Order          --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    /// Gateway transaction reference. Unique; deduplicates retried payment confirmations.
    pub payment_reference: String,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub rider_id: Option<i64>,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price snapshotted at purchase time. Never re-read from the live product.
    pub product_price: Naira,
    pub delivery_fee: Naira,
    /// Commission snapshotted at order creation from the line subtotal.
    pub platform_commission: Naira,
    pub total_amount: Naira,
    pub status: OrderStatus,
    pub is_disputed: bool,
    pub created_at: DateTime<Utc>,
    pub rider_assigned_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The line subtotal the settlement split is computed from.
    pub fn subtotal(&self) -> Naira {
        self.product_price * self.quantity
    }
}

//--------------------------------------      NewOrder        --------------------------------------------------------
/// A priced checkout draft. Nothing is persisted until the gateway confirms the payment; the
/// draft's reference and amounts seed the gateway transaction metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub payment_reference: String,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub product_price: Naira,
    pub delivery_fee: Naira,
    pub platform_commission: Naira,
    pub total_amount: Naira,
}

//--------------------------------------    Ledger types      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EntryType {
    Credit,
    Debit,
    Escrow,
    Withdrawal,
}

impl Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryType::Credit => "Credit",
            EntryType::Debit => "Debit",
            EntryType::Escrow => "Escrow",
            EntryType::Withdrawal => "Withdrawal",
        };
        write!(f, "{s}")
    }
}

/// Which of the account's two money pools an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum BalancePool {
    Pending,
    Available,
}

impl BalancePool {
    pub fn column(&self) -> &'static str {
        match self {
            BalancePool::Pending => "pending_balance",
            BalancePool::Available => "available_balance",
        }
    }
}

impl Display for BalancePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BalancePool::Pending => "Pending",
            BalancePool::Available => "Available",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EscrowStatus {
    Held,
    Released,
}

/// One row of the transaction log. Credit/Debit/Withdrawal rows are append-only and never change;
/// an Escrow row is the one exception: it transitions `Held → Released` in place when settlement
/// runs (and its amount shrinks if a dispute refund is carved out of the hold), so the ledger
/// never shows a dangling "still escrowed" line item after release.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub account_id: i64,
    pub entry_type: EntryType,
    pub pool: BalancePool,
    /// Signed. Credits are positive, debits and withdrawals negative, escrow holds positive.
    pub amount: Naira,
    pub reference: String,
    pub escrow_status: Option<EscrowStatus>,
    pub balance_before: Naira,
    pub balance_after: Naira,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      Dispute         --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum DisputeStatus {
    Open,
    UnderReview,
    ResolvedBuyerFavor,
    ResolvedSellerFavor,
    ResolvedCompromise,
    Dismissed,
}

impl DisputeStatus {
    /// All four resolution states are terminal.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, DisputeStatus::Open | DisputeStatus::UnderReview)
    }
}

impl Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DisputeStatus::Open => "Open",
            DisputeStatus::UnderReview => "UnderReview",
            DisputeStatus::ResolvedBuyerFavor => "ResolvedBuyerFavor",
            DisputeStatus::ResolvedSellerFavor => "ResolvedSellerFavor",
            DisputeStatus::ResolvedCompromise => "ResolvedCompromise",
            DisputeStatus::Dismissed => "Dismissed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dispute {
    pub id: i64,
    pub order_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub status: DisputeStatus,
    pub reason: String,
    pub buyer_evidence: Option<String>,
    pub seller_evidence: Option<String>,
    pub resolution: Option<String>,
    pub refund_amount: Option<Naira>,
    pub resolved_by: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DisputeMessage {
    pub id: i64,
    pub dispute_id: i64,
    pub sender_id: i64,
    /// The capability the sender acted under in this thread: Buyer, Seller or Admin.
    pub sender_role: Role,
    pub message: String,
    pub evidence: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      Penalty         --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PenaltyAction {
    Warning,
    TempBan1Day,
    TempBan7Days,
    TempBan30Days,
    PermanentBan,
    TrustLevelDowngrade,
}

impl PenaltyAction {
    pub fn points(&self) -> i64 {
        match self {
            PenaltyAction::Warning => 1,
            PenaltyAction::TempBan1Day => 3,
            PenaltyAction::TempBan7Days => 10,
            PenaltyAction::TempBan30Days => 25,
            PenaltyAction::PermanentBan => 50,
            PenaltyAction::TrustLevelDowngrade => 2,
        }
    }

    pub fn ban_duration(&self) -> Option<Duration> {
        match self {
            PenaltyAction::TempBan1Day => Some(Duration::days(1)),
            PenaltyAction::TempBan7Days => Some(Duration::days(7)),
            PenaltyAction::TempBan30Days => Some(Duration::days(30)),
            // Effectively forever; the account row is never deleted.
            PenaltyAction::PermanentBan => Some(Duration::days(36_500)),
            PenaltyAction::Warning | PenaltyAction::TrustLevelDowngrade => None,
        }
    }
}

impl Display for PenaltyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PenaltyAction::Warning => "Warning",
            PenaltyAction::TempBan1Day => "TempBan1Day",
            PenaltyAction::TempBan7Days => "TempBan7Days",
            PenaltyAction::TempBan30Days => "TempBan30Days",
            PenaltyAction::PermanentBan => "PermanentBan",
            PenaltyAction::TrustLevelDowngrade => "TrustLevelDowngrade",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Penalty {
    pub id: i64,
    pub user_id: i64,
    pub action: PenaltyAction,
    pub reason: String,
    pub points_added: i64,
    pub banned_until: Option<DateTime<Utc>>,
    pub dispute_id: Option<i64>,
    pub issued_by: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trust_level_downgrade_floors_at_bronze() {
        assert_eq!(TrustLevel::Verified.demoted(), TrustLevel::Gold);
        assert_eq!(TrustLevel::Gold.demoted(), TrustLevel::Silver);
        assert_eq!(TrustLevel::Silver.demoted(), TrustLevel::Bronze);
        assert_eq!(TrustLevel::Bronze.demoted(), TrustLevel::Bronze);
    }

    #[test]
    fn trust_level_from_history() {
        assert_eq!(TrustLevel::from_history(0, 0.0), TrustLevel::Bronze);
        assert_eq!(TrustLevel::from_history(5, 3.2), TrustLevel::Silver);
        assert_eq!(TrustLevel::from_history(20, 4.1), TrustLevel::Gold);
        assert_eq!(TrustLevel::from_history(80, 4.9), TrustLevel::Verified);
        // high volume with a poor rating stays Bronze
        assert_eq!(TrustLevel::from_history(80, 2.0), TrustLevel::Bronze);
    }

    #[test]
    fn delivery_steps_are_monotonic() {
        assert_eq!(OrderStatus::PickedUp.delivery_predecessor(), Some(OrderStatus::RiderAssigned));
        assert_eq!(OrderStatus::OnTheWay.delivery_predecessor(), Some(OrderStatus::PickedUp));
        assert_eq!(OrderStatus::Delivered.delivery_predecessor(), Some(OrderStatus::OnTheWay));
        assert_eq!(OrderStatus::Completed.delivery_predecessor(), None);
    }

    #[test]
    fn roles_are_polymorphic() {
        let roles = Roles::from(vec![Role::Buyer, Role::Seller]);
        assert!(roles.contains(Role::Buyer));
        assert!(roles.contains(Role::Seller));
        assert!(!roles.contains(Role::Rider));
    }
}
