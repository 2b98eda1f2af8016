//! Adapter that plugs the Paystack client into the engine's gateway traits.
use campus_market_engine::traits::{
    BankDetails,
    GatewayError,
    PaymentMetadata,
    PaymentVerifier,
    PayoutGateway,
    TransferReceipt,
    VerifiedPayment,
};
use chrono::Utc;
use cm_common::Naira;
use log::*;
use paystack_tools::{naira_from_kobo, BankAccount, PaystackApi, PaystackApiError, PaystackConfig};

#[derive(Clone)]
pub struct PaystackGateway {
    api: PaystackApi,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let api = PaystackApi::new(config)?;
        Ok(Self { api })
    }
}

fn to_gateway_error(e: PaystackApiError) -> GatewayError {
    match e {
        PaystackApiError::TransactionNotSuccessful(msg) => GatewayError::Declined(msg),
        PaystackApiError::JsonError(msg) | PaystackApiError::RestResponseError(msg) => {
            GatewayError::MalformedResponse(msg)
        },
        other => GatewayError::RequestFailed(other.to_string()),
    }
}

impl PaymentVerifier for PaystackGateway {
    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, GatewayError> {
        let tx = self.api.verify_transaction(reference).await.map_err(to_gateway_error)?;
        let metadata: PaymentMetadata = serde_json::from_value(tx.metadata.clone()).map_err(|e| {
            GatewayError::MalformedResponse(format!("transaction [{reference}] metadata: {e}"))
        })?;
        let amount = naira_from_kobo(tx.amount).map_err(to_gateway_error)?;
        trace!("💳️ Verified [{reference}]: {amount} for product #{}", metadata.product_id);
        Ok(VerifiedPayment { reference: tx.reference, amount, metadata })
    }
}

impl PayoutGateway for PaystackGateway {
    async fn transfer(
        &self,
        recipient: &BankDetails,
        amount: Naira,
        reference: &str,
    ) -> Result<TransferReceipt, GatewayError> {
        let account = BankAccount {
            bank_code: recipient.bank_code.clone(),
            account_number: recipient.account_number.clone(),
            account_name: recipient.account_name.clone(),
        };
        let rec = self.api.create_transfer_recipient(&account).await.map_err(to_gateway_error)?;
        let transfer = self
            .api
            .create_transfer(&rec.recipient_code, amount, reference, "Campus market withdrawal")
            .await
            .map_err(to_gateway_error)?;
        Ok(TransferReceipt {
            reference: transfer.reference,
            transfer_code: transfer.transfer_code,
            amount,
            created_at: Utc::now(),
        })
    }
}
