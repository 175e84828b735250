use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use fee_common::Kobo;
use paystack_tools::PaystackTransaction;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

/// The status the gateway reports for a completed payment.
pub const PAYMENT_STATUS_SUCCESS: &str = "success";

//--------------------------------------    PaymentRecord    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub student_id: Option<String>,
    pub name: String,
    pub email: String,
    pub amount: Kobo,
    pub reference: String,
    pub status: String,
    /// Set only for records written by the fulfillment workflow after the gateway confirmed the payment.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn is_success(&self) -> bool {
        self.status == PAYMENT_STATUS_SUCCESS
    }
}

//--------------------------------------   NewPaymentRecord  ---------------------------------------------------------
/// A payment record that has not been stored yet. The store assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaymentRecord {
    pub student_id: Option<String>,
    pub name: String,
    pub email: String,
    pub amount: Kobo,
    pub reference: String,
    pub status: String,
    /// Only [`Self::from_verified`] sets this. It is never taken from a caller's payload.
    #[serde(skip_deserializing)]
    pub verified: bool,
}

impl NewPaymentRecord {
    pub fn new<S: Into<String>>(name: S, email: S, amount: Kobo, reference: S, status: S) -> Self {
        Self {
            student_id: None,
            name: name.into(),
            email: email.into(),
            amount,
            reference: reference.into(),
            status: status.into(),
            verified: false,
        }
    }

    pub fn with_student_id(mut self, student_id: Option<String>) -> Self {
        self.student_id = student_id;
        self
    }

    /// Builds the record for a payment the gateway has confirmed. The reference is always the one the client supplied.
    pub fn from_verified(reference: &str, payment: &VerifiedPayment) -> Self {
        Self {
            student_id: None,
            name: payment.payer_name.clone(),
            email: payment.email.clone(),
            amount: payment.amount,
            reference: reference.to_string(),
            status: payment.status.clone(),
            verified: true,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PAYMENT_STATUS_SUCCESS
    }
}

//--------------------------------------   VerifiedPayment   ---------------------------------------------------------
/// The gateway's view of a payment, kept as-is so that a receipt can be produced long after verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    pub reference: String,
    pub email: String,
    pub payer_name: String,
    pub amount: Kobo,
    pub status: String,
    pub paid_at: Option<String>,
    pub channel: Option<String>,
    pub bank: Option<String>,
}

impl From<&PaystackTransaction> for VerifiedPayment {
    fn from(tx: &PaystackTransaction) -> Self {
        Self {
            reference: tx.reference.clone(),
            email: tx.customer.email.clone(),
            payer_name: tx.customer.first_name.clone().unwrap_or_default(),
            amount: tx.amount,
            status: tx.status.clone(),
            paid_at: tx.paid_at.clone(),
            channel: tx.channel.clone(),
            bank: tx.bank().map(String::from),
        }
    }
}

//--------------------------------------   FulfillmentStage  ---------------------------------------------------------
/// How far a verified payment has progressed. Stages only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStage {
    /// The gateway confirmed the payment and the payment record is stored.
    Verified,
    /// The receipt has been written to disk.
    Documented,
    /// The receipt has been emailed to the payer.
    Notified,
}

impl Display for FulfillmentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentStage::Verified => write!(f, "verified"),
            FulfillmentStage::Documented => write!(f, "documented"),
            FulfillmentStage::Notified => write!(f, "notified"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid fulfillment stage: {0}")]
pub struct ConversionError(String);

impl FromStr for FulfillmentStage {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(Self::Verified),
            "documented" => Ok(Self::Documented),
            "notified" => Ok(Self::Notified),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------     Fulfillment     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Fulfillment {
    pub reference: String,
    pub payment_id: i64,
    pub email: String,
    pub payload: Json<VerifiedPayment>,
    pub stage: FulfillmentStage,
    pub receipt_path: Option<String>,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fulfillment {
    pub fn payment(&self) -> &VerifiedPayment {
        &self.payload.0
    }

    pub fn is_complete(&self) -> bool {
        self.stage == FulfillmentStage::Notified
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFulfillment {
    pub reference: String,
    pub payment_id: i64,
    pub email: String,
    pub payload: VerifiedPayment,
}

impl NewFulfillment {
    pub fn new(record: &PaymentRecord, payload: VerifiedPayment) -> Self {
        Self { reference: record.reference.clone(), payment_id: record.id, email: payload.email.clone(), payload }
    }
}
