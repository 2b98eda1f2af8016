//! Marketplace fee policy.
//!
//! Every monetary constant of the settlement split lives here, and the [`Settlement`] breakdown is
//! always derived from an order's *snapshotted* fields so the amounts used when escrow opens and
//! the amounts used at release can never drift apart, even if the catalog price changes mid-order.
use cm_common::Naira;
use serde::Serialize;

use crate::db_types::Order;

/// Flat delivery fee charged to the buyer on every order.
pub const DELIVERY_FEE: Naira = Naira::new(800);
/// Flat payout to the rider per delivery, regardless of distance.
pub const RIDER_PAYOUT: Naira = Naira::new(560);
/// Flat component folded into the platform's take; the seller is credited this back at release.
pub const COMMISSION_FLAT: Naira = Naira::new(240);
/// Seller-side commission rate, percent of the line subtotal.
pub const COMMISSION_RATE_PERCENT: i64 = 10;
/// Smallest amount the payout gateway will transfer.
pub const MIN_WITHDRAWAL: Naira = Naira::new(1_000);
/// Reserved account commissions settle into. Seeded by the initial migration.
pub const PLATFORM_ACCOUNT_ID: i64 = 1;

/// Commission on a line subtotal, in whole naira (integer division).
pub fn commission_for(subtotal: Naira) -> Naira {
    Naira::from(subtotal.value() * COMMISSION_RATE_PERCENT / 100)
}

/// The three-way split of an order's total. For any subtotal `s` with commission `c`:
/// seller `s - c + 240`, rider `560`, platform `c`, which sums to `s + 800` exactly —
/// the buyer's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub seller: Naira,
    pub rider: Naira,
    pub platform: Naira,
}

impl Settlement {
    pub fn for_order(order: &Order) -> Self {
        Self::from_parts(order.subtotal(), order.platform_commission)
    }

    pub fn from_parts(subtotal: Naira, commission: Naira) -> Self {
        Self {
            seller: subtotal - commission + COMMISSION_FLAT,
            rider: RIDER_PAYOUT,
            platform: commission,
        }
    }

    pub fn total(&self) -> Naira {
        self.seller + self.rider + self.platform
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn happy_path_split_balances() {
        let subtotal = Naira::from(5000);
        let commission = commission_for(subtotal);
        assert_eq!(commission, Naira::from(500));
        let split = Settlement::from_parts(subtotal, commission);
        assert_eq!(split.seller, Naira::from(4740));
        assert_eq!(split.rider, Naira::from(560));
        assert_eq!(split.platform, Naira::from(500));
        assert_eq!(split.total(), subtotal + DELIVERY_FEE);
    }

    #[test]
    fn split_balances_for_awkward_subtotals() {
        // prices that don't divide evenly by the commission rate still conserve the total
        for subtotal in [1, 99, 1234, 5555, 1_000_001].map(Naira::from) {
            let split = Settlement::from_parts(subtotal, commission_for(subtotal));
            assert_eq!(split.total(), subtotal + DELIVERY_FEE, "subtotal {subtotal}");
        }
    }
}
