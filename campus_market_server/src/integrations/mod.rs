pub mod paystack;

use campus_market_engine::traits::{
    BankDetails,
    GatewayError,
    PaymentVerifier,
    PayoutGateway,
    TransferReceipt,
    VerifiedPayment,
};
use cm_common::Naira;
use paystack_tools::{PaystackApiError, PaystackConfig};

pub use paystack::PaystackGateway;

/// The gateway the handlers talk to. Production runs on Paystack; tests swap in the engine's
/// programmable mock without touching the handler signatures.
#[derive(Clone)]
pub enum Gateway {
    Paystack(PaystackGateway),
    #[cfg(test)]
    Mock(campus_market_engine::test_utils::MockGateway),
}

impl Gateway {
    pub fn paystack(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        Ok(Self::Paystack(PaystackGateway::new(config)?))
    }
}

impl PaymentVerifier for Gateway {
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, GatewayError> {
        match self {
            Gateway::Paystack(g) => g.verify(reference).await,
            #[cfg(test)]
            Gateway::Mock(g) => g.verify(reference).await,
        }
    }
}

impl PayoutGateway for Gateway {
    async fn transfer(
        &self,
        recipient: &BankDetails,
        amount: Naira,
        reference: &str,
    ) -> Result<TransferReceipt, GatewayError> {
        match self {
            Gateway::Paystack(g) => g.transfer(recipient, amount, reference).await,
            #[cfg(test)]
            Gateway::Mock(g) => g.transfer(recipient, amount, reference).await,
        }
    }
}
