use thiserror::Error;

use crate::traits::GatewayVerification;

/// Confirms with the payment gateway whether a transaction reference was paid.
#[allow(async_fn_in_trait)]
pub trait PaymentVerifier {
    /// Returns the gateway's verdict. Transport failures and non-2xx responses are errors. An unpaid, abandoned or
    /// unreadable transaction is a non-successful [`GatewayVerification`].
    async fn verify(&self, reference: &str) -> Result<GatewayVerification, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached or returned an error. {0}")]
    Unavailable(String),
    #[error("The reference {0} cannot be sent to the payment gateway")]
    InvalidReference(String),
}
