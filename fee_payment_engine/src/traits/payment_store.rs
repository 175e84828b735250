use thiserror::Error;

use crate::{
    db_types::{NewPaymentRecord, PaymentRecord},
    traits::InsertPaymentResult,
};

/// Persistence of payment records.
///
/// Payment records are append-only. There is no way to modify or delete a record once it has been inserted.
#[allow(async_fn_in_trait)]
pub trait PaymentStore {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Creates the schema if it does not exist yet. This is safe to call on every start-up.
    async fn initialize(&self) -> Result<(), PaymentStoreError>;

    /// Appends a payment record, assigning its id and timestamp.
    ///
    /// At most one *successful* gateway-verified record may exist per reference, and at most one successful reported
    /// record. A reported record never blocks a verified one, but it is refused once any successful record exists.
    /// When a record is refused nothing is written and [`InsertPaymentResult::AlreadyExists`] carries the stored
    /// record. Records with any other status may repeat.
    async fn insert_payment(&self, record: NewPaymentRecord) -> Result<InsertPaymentResult, PaymentStoreError>;

    /// All payment records, newest first.
    async fn fetch_all_payments(&self) -> Result<Vec<PaymentRecord>, PaymentStoreError>;

    /// The successful payment record for `reference`, if there is one. A verified record is preferred.
    async fn fetch_payment_by_reference(&self, reference: &str) -> Result<Option<PaymentRecord>, PaymentStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentStoreError {
    #[error("The payment database is unavailable or rejected the request: {0}")]
    StorageError(String),
    #[error("No fulfillment exists for reference {0}")]
    FulfillmentNotFound(String),
    #[error("Fulfillment for {reference} cannot move from {from} back to {to}")]
    StageRegression { reference: String, from: String, to: String },
    #[error("Could not serialize the payment payload: {0}")]
    PayloadError(String),
}

impl From<sqlx::Error> for PaymentStoreError {
    fn from(e: sqlx::Error) -> Self {
        PaymentStoreError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for PaymentStoreError {
    fn from(e: serde_json::Error) -> Self {
        PaymentStoreError::PayloadError(e.to_string())
    }
}
