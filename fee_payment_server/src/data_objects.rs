use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fee_common::Kobo;
use fee_payment_engine::{db_types::NewPaymentRecord, FulfillmentRequest};
use serde::{Deserialize, Serialize};

/// Body of `POST /verify_payment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyPaymentParams {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
}

impl VerifyPaymentParams {
    /// `None` if no usable reference was sent.
    pub fn into_request(self) -> Option<FulfillmentRequest> {
        let reference = self.reference.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())?;
        let student_id = self.student_id.filter(|s| !s.trim().is_empty());
        Some(FulfillmentRequest { reference, student_id })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub status: String,
    pub message: String,
    pub reference: String,
    pub amount: Kobo,
    pub receipt_url: String,
}

/// Body of `POST /save_payment`. The record is stored as reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePaymentParams {
    #[serde(default)]
    pub student_id: Option<String>,
    pub name: String,
    pub email: String,
    pub amount: Kobo,
    pub reference: String,
    pub status: String,
}

impl From<SavePaymentParams> for NewPaymentRecord {
    fn from(p: SavePaymentParams) -> Self {
        NewPaymentRecord::new(p.name, p.email, p.amount, p.reference, p.status).with_student_id(p.student_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThankYouParams {
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLinkParams {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// Where receipts are read from when they are downloaded. The renderer writes to the same directory.
#[derive(Debug, Clone)]
pub struct ReceiptDirectory(PathBuf);

impl ReceiptDirectory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: std::fmt::Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}
