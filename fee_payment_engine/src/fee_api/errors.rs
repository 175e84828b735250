use thiserror::Error;

use crate::traits::PaymentStoreError;

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Could not verify {reference} with the payment gateway. {reason}")]
    GatewayUnavailable { reference: String, reason: String },
    #[error("The payment gateway did not confirm {reference} (status: {}). {reason}", .status.as_deref().unwrap_or("unknown"))]
    VerificationRejected { reference: String, status: Option<String>, reason: String },
    #[error("Database error: {0}")]
    StorageError(#[from] PaymentStoreError),
    #[error("Payment {reference} was recorded, but its receipt could not be generated. {reason}")]
    RenderFailed { reference: String, reason: String },
    #[error("Payment {reference} was recorded, but its receipt could not be emailed. {reason}")]
    NotifyFailed { reference: String, reason: String },
    #[error("There is no fulfillment in progress for {0}")]
    FulfillmentNotFound(String),
}

impl FulfillmentError {
    /// True if the payment itself is safely stored and only the receipt or email is outstanding.
    pub fn payment_recorded(&self) -> bool {
        matches!(self, FulfillmentError::RenderFailed { .. } | FulfillmentError::NotifyFailed { .. })
    }
}
