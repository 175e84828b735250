use std::fmt::Debug;

use fee_common::helpers::is_valid_reference;
use log::*;

use crate::{
    db_types::{Fulfillment, FulfillmentStage, NewFulfillment, NewPaymentRecord, PaymentRecord, VerifiedPayment},
    fee_api::{
        errors::FulfillmentError,
        fulfillment_objects::{FulfillmentOutcome, FulfillmentRequest, ReconcileReport},
        reference_locks::ReferenceLocks,
    },
    receipts::receipt_file_name,
    traits::{
        FulfillmentStore,
        GatewayError,
        InsertPaymentResult,
        PaymentVerifier,
        ReceiptLocation,
        ReceiptNotifier,
        ReceiptRenderer,
    },
};

/// `FulfillmentApi` turns a transaction reference into a stored payment record, a receipt document and an email to
/// the payer.
///
/// Verification always comes first. Nothing is written unless the gateway confirms the payment. Once the payment
/// record is stored, the receipt and email steps are tracked in a fulfillment record, so that a failure there can be
/// retried later with [`Self::resume`] without charging, recording or emailing twice.
pub struct FulfillmentApi<B, G, R, N> {
    db: B,
    gateway: G,
    renderer: R,
    notifier: N,
    locks: ReferenceLocks,
}

impl<B, G, R, N> Debug for FulfillmentApi<B, G, R, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FulfillmentApi")
    }
}

impl<B, G, R, N> FulfillmentApi<B, G, R, N> {
    /// Every `FulfillmentApi` that can touch the same references must share `locks`.
    pub fn new(db: B, gateway: G, renderer: R, notifier: N, locks: ReferenceLocks) -> Self {
        Self { db, gateway, renderer, notifier, locks }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G, R, N> FulfillmentApi<B, G, R, N>
where
    B: FulfillmentStore,
    G: PaymentVerifier,
    R: ReceiptRenderer,
    N: ReceiptNotifier,
{
    /// Verifies `request.reference` with the gateway and, if it was paid, records it, renders the receipt and emails
    /// it to the payer.
    ///
    /// Fulfilling a reference that has already been fulfilled returns the existing record and receipt, and does
    /// nothing else.
    pub async fn fulfil(&self, request: FulfillmentRequest) -> Result<FulfillmentOutcome, FulfillmentError> {
        let reference = request.reference.trim();
        if reference.is_empty() {
            return Err(FulfillmentError::ValidationError("Missing reference".into()));
        }
        if !is_valid_reference(reference) {
            return Err(FulfillmentError::ValidationError(format!("Invalid reference: {reference}")));
        }
        let _guard = self.locks.lock(reference).await;
        debug!("🔄️ Verifying [{reference}] with the payment gateway");
        let payment = self.verify(reference).await?;
        let record = NewPaymentRecord::from_verified(reference, &payment).with_student_id(request.student_id);
        let record = match self.db.insert_payment(record).await? {
            InsertPaymentResult::Inserted(record) => {
                info!("🔄️ Payment [{reference}] verified and recorded with id {}", record.id);
                record
            },
            InsertPaymentResult::AlreadyExists(record) => {
                info!("🔄️ Payment [{reference}] was already recorded with id {}", record.id);
                record
            },
        };
        let fulfillment = self.db.open_fulfillment(NewFulfillment::new(&record, payment)).await?;
        self.complete(record, fulfillment).await
    }

    /// Continues a stalled fulfillment from its current stage, using the payment details stored when it was verified.
    /// The gateway is not contacted again.
    pub async fn resume(&self, reference: &str) -> Result<FulfillmentOutcome, FulfillmentError> {
        let _guard = self.locks.lock(reference).await;
        let fulfillment = self
            .db
            .fetch_fulfillment(reference)
            .await?
            .ok_or_else(|| FulfillmentError::FulfillmentNotFound(reference.to_string()))?;
        let record = self
            .db
            .fetch_payment_by_reference(reference)
            .await?
            .ok_or_else(|| FulfillmentError::FulfillmentNotFound(reference.to_string()))?;
        debug!("🔄️ Resuming fulfillment of [{reference}] from stage {}", fulfillment.stage);
        self.complete(record, fulfillment).await
    }

    /// Resumes every stalled fulfillment that has failed fewer than `max_attempts` times.
    pub async fn resume_stalled(&self, max_attempts: i64) -> Result<ReconcileReport, FulfillmentError> {
        let stalled = self.db.fetch_stalled_fulfillments(max_attempts).await?;
        let mut report = ReconcileReport::default();
        for fulfillment in stalled {
            match self.resume(&fulfillment.reference).await {
                Ok(_) => report.completed.push(fulfillment.reference),
                Err(e) => {
                    warn!("🔄️ Fulfillment of [{}] is still incomplete. {e}", fulfillment.reference);
                    report.failed.push((fulfillment.reference, e.to_string()));
                },
            }
        }
        Ok(report)
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedPayment, FulfillmentError> {
        let verification = self.gateway.verify(reference).await.map_err(|e| match e {
            GatewayError::InvalidReference(r) => FulfillmentError::ValidationError(format!("Invalid reference: {r}")),
            GatewayError::Unavailable(reason) => {
                warn!("🔄️ Could not verify [{reference}]. {reason}");
                FulfillmentError::GatewayUnavailable { reference: reference.to_string(), reason }
            },
        })?;
        let rejected = |status: Option<String>, reason: String| {
            info!("🔄️ Payment [{reference}] was not confirmed. {reason}");
            FulfillmentError::VerificationRejected { reference: reference.to_string(), status, reason }
        };
        match verification.payment {
            Some(payment) if verification.success => {
                if payment.reference != reference {
                    let reason = format!("The gateway answered for a different reference ({})", payment.reference);
                    return Err(rejected(verification.status, reason));
                }
                Ok(payment)
            },
            _ => Err(rejected(verification.status, verification.message)),
        }
    }

    /// Runs the receipt and email steps that `fulfillment` has not completed yet.
    async fn complete(
        &self,
        record: PaymentRecord,
        fulfillment: Fulfillment,
    ) -> Result<FulfillmentOutcome, FulfillmentError> {
        let reference = fulfillment.reference.clone();
        if fulfillment.is_complete() {
            debug!("🔄️ [{reference}] has already been fulfilled");
            let path = fulfillment.receipt_path.clone().or_else(|| receipt_file_name(&reference).ok()).unwrap_or_default();
            let receipt = ReceiptLocation::new(path);
            return Ok(FulfillmentOutcome::Fulfilled { record, receipt, newly_fulfilled: false });
        }
        let receipt = match self.renderer.render(fulfillment.payment()).await {
            Ok(receipt) => receipt,
            Err(e) => {
                let reason = e.to_string();
                self.record_failure(&reference, &reason).await;
                return Err(FulfillmentError::RenderFailed { reference, reason });
            },
        };
        let path = receipt.path.to_string_lossy();
        self.db.advance_fulfillment(&reference, FulfillmentStage::Documented, Some(&*path)).await?;
        if let Err(e) = self.notifier.send(&fulfillment.email, receipt.path()).await {
            let reason = e.to_string();
            self.record_failure(&reference, &reason).await;
            return Err(FulfillmentError::NotifyFailed { reference, reason });
        }
        self.db.advance_fulfillment(&reference, FulfillmentStage::Notified, None).await?;
        info!("🔄️ Payment [{reference}] fulfilled. Receipt sent to {}", fulfillment.email);
        Ok(FulfillmentOutcome::Fulfilled { record, receipt, newly_fulfilled: true })
    }

    async fn record_failure(&self, reference: &str, reason: &str) {
        warn!("🔄️ Fulfillment of [{reference}] stalled. {reason}");
        if let Err(e) = self.db.record_fulfillment_failure(reference, reason).await {
            error!("🔄️ Could not record the fulfillment failure for [{reference}]. {e}");
        }
    }
}
