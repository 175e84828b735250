use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Fulfillment, PaymentRecord},
    traits::ReceiptLocation,
};

/// A request to confirm and fulfil a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    pub reference: String,
    pub student_id: Option<String>,
}

impl FulfillmentRequest {
    pub fn new<S: Into<String>>(reference: S) -> Self {
        Self { reference: reference.into(), student_id: None }
    }

    pub fn with_student_id<S: Into<String>>(mut self, student_id: S) -> Self {
        self.student_id = Some(student_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    Fulfilled {
        record: PaymentRecord,
        receipt: ReceiptLocation,
        /// False when the reference had already been fulfilled and nothing new was rendered or sent.
        newly_fulfilled: bool,
    },
}

impl FulfillmentOutcome {
    pub fn record(&self) -> &PaymentRecord {
        match self {
            FulfillmentOutcome::Fulfilled { record, .. } => record,
        }
    }

    pub fn receipt(&self) -> &ReceiptLocation {
        match self {
            FulfillmentOutcome::Fulfilled { receipt, .. } => receipt,
        }
    }

    pub fn newly_fulfilled(&self) -> bool {
        match self {
            FulfillmentOutcome::Fulfilled { newly_fulfilled, .. } => *newly_fulfilled,
        }
    }
}

/// The result of a pass over stalled fulfillments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub completed: Vec<String>,
    /// References that failed again, with the reason.
    pub failed: Vec<(String, String)>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.failed.is_empty()
    }
}

/// A fulfillment as reported to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentSummary {
    pub reference: String,
    pub email: String,
    pub stage: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Fulfillment> for FulfillmentSummary {
    fn from(f: Fulfillment) -> Self {
        Self {
            reference: f.reference,
            email: f.email,
            stage: f.stage.to_string(),
            attempts: f.attempts,
            last_error: f.last_error,
            updated_at: f.updated_at,
        }
    }
}
