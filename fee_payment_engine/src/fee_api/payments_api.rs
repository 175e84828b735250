use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewPaymentRecord, PaymentRecord},
    fee_api::fulfillment_objects::FulfillmentSummary,
    traits::{FulfillmentStore, InsertPaymentResult, PaymentStoreError},
};

/// Direct access to payment records, for administrators and for clients that report payments themselves.
pub struct PaymentsApi<B> {
    db: B,
}

impl<B> Debug for PaymentsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentsApi")
    }
}

impl<B> PaymentsApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PaymentsApi<B>
where B: FulfillmentStore
{
    /// Stores a payment exactly as reported by the caller. The status is not checked with the gateway.
    pub async fn save_payment(&self, record: NewPaymentRecord) -> Result<InsertPaymentResult, PaymentStoreError> {
        let reference = record.reference.clone();
        let result = self.db.insert_payment(record).await?;
        match &result {
            InsertPaymentResult::Inserted(r) => info!("💻️ Reported payment [{reference}] saved with id {}", r.id),
            InsertPaymentResult::AlreadyExists(r) => {
                warn!("💻️ Reported payment [{reference}] duplicates the successful payment #{}", r.id)
            },
        }
        Ok(result)
    }

    /// All payment records, newest first.
    pub async fn payments(&self) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        self.db.fetch_all_payments().await
    }

    pub async fn stalled_fulfillments(&self, max_attempts: i64) -> Result<Vec<FulfillmentSummary>, PaymentStoreError> {
        let stalled = self.db.fetch_stalled_fulfillments(max_attempts).await?;
        Ok(stalled.into_iter().map(FulfillmentSummary::from).collect())
    }
}
