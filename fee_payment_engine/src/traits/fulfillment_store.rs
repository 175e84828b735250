use crate::{
    db_types::{Fulfillment, FulfillmentStage, NewFulfillment},
    traits::{PaymentStore, PaymentStoreError},
};

/// Tracks how far each verified payment has got through receipt generation and delivery, so that a payment whose
/// receipt or email failed can be picked up again later.
#[allow(async_fn_in_trait)]
pub trait FulfillmentStore: PaymentStore {
    async fn fetch_fulfillment(&self, reference: &str) -> Result<Option<Fulfillment>, PaymentStoreError>;

    /// Inserts the fulfillment if there is none for this reference yet. Either way, the stored row is returned.
    async fn open_fulfillment(&self, fulfillment: NewFulfillment) -> Result<Fulfillment, PaymentStoreError>;

    /// Moves the fulfillment to `stage`, clearing any previous error. A stage may be repeated, but never reversed.
    /// `receipt_path` is only overwritten when a value is given.
    async fn advance_fulfillment(
        &self,
        reference: &str,
        stage: FulfillmentStage,
        receipt_path: Option<&str>,
    ) -> Result<Fulfillment, PaymentStoreError>;

    /// Increments the attempt counter and stores the reason for the failure.
    async fn record_fulfillment_failure(&self, reference: &str, error: &str) -> Result<Fulfillment, PaymentStoreError>;

    /// Fulfillments that have not reached [`FulfillmentStage::Notified`] and have failed fewer than `max_attempts`
    /// times, oldest first.
    async fn fetch_stalled_fulfillments(&self, max_attempts: i64) -> Result<Vec<Fulfillment>, PaymentStoreError>;
}
