//! An in-memory stand-in for the payment/payout gateway.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
        Mutex,
    },
};

use chrono::Utc;
use cm_common::Naira;

use crate::{
    db_types::NewOrder,
    traits::{
        BankDetails,
        GatewayError,
        PaymentMetadata,
        PaymentVerifier,
        PayoutGateway,
        TransferReceipt,
        VerifiedPayment,
    },
};

/// Programmable gateway double. Payments "succeed" once they have been primed with
/// [`MockGateway::prime_payment`]; transfers succeed unless [`MockGateway::fail_transfers`] is
/// switched on.
#[derive(Clone, Default)]
pub struct MockGateway {
    payments: Arc<Mutex<HashMap<String, VerifiedPayment>>>,
    refuse_transfers: Arc<AtomicBool>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a verified payment for the given checkout draft, as though the buyer completed
    /// the gateway checkout with exactly the draft's amounts.
    pub fn prime_payment(&self, draft: &NewOrder) {
        let payment = VerifiedPayment {
            reference: draft.payment_reference.clone(),
            amount: draft.total_amount,
            metadata: PaymentMetadata {
                product_id: draft.product_id,
                buyer_id: draft.buyer_id,
                quantity: draft.quantity,
                product_price: draft.product_price,
                delivery_fee: draft.delivery_fee,
                total_amount: draft.total_amount,
            },
        };
        self.payments.lock().unwrap().insert(payment.reference.clone(), payment);
    }

    /// Registers a verified payment with arbitrary (possibly inconsistent) amounts.
    pub fn prime_raw(&self, payment: VerifiedPayment) {
        self.payments.lock().unwrap().insert(payment.reference.clone(), payment);
    }

    pub fn fail_transfers(&self, fail: bool) {
        self.refuse_transfers.store(fail, Ordering::SeqCst);
    }
}

impl PaymentVerifier for MockGateway {
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, GatewayError> {
        self.payments
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| GatewayError::Declined(format!("unknown reference {reference}")))
    }
}

impl PayoutGateway for MockGateway {
    async fn transfer(
        &self,
        _recipient: &BankDetails,
        amount: Naira,
        reference: &str,
    ) -> Result<TransferReceipt, GatewayError> {
        if self.refuse_transfers.load(Ordering::SeqCst) {
            return Err(GatewayError::RequestFailed("transfer gateway is down".to_string()));
        }
        Ok(TransferReceipt {
            reference: reference.to_string(),
            transfer_code: format!("TRF_{reference}"),
            amount,
            created_at: Utc::now(),
        })
    }
}
