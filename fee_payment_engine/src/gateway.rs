//! Paystack as the engine's [`PaymentVerifier`].
use log::*;
use paystack_tools::{PaystackApi, PaystackApiError, VerificationResult};

use crate::{
    db_types::VerifiedPayment,
    traits::{GatewayError, GatewayVerification, PaymentVerifier},
};

impl PaymentVerifier for PaystackApi {
    async fn verify(&self, reference: &str) -> Result<GatewayVerification, GatewayError> {
        let result = self.verify_transaction(reference).await.map_err(|e| match e {
            PaystackApiError::InvalidReference(r) => GatewayError::InvalidReference(r),
            e => GatewayError::Unavailable(e.to_string()),
        })?;
        Ok(result.into())
    }
}

impl From<VerificationResult> for GatewayVerification {
    fn from(result: VerificationResult) -> Self {
        match (result.success, result.payload) {
            (true, Some(tx)) => GatewayVerification::confirmed(VerifiedPayment::from(&tx)),
            (true, None) => {
                warn!("💳️ Gateway reported success without a transaction. Treating it as unverified.");
                GatewayVerification::rejected(result.status, result.message)
            },
            (false, _) => GatewayVerification::rejected(result.status, result.message),
        }
    }
}
