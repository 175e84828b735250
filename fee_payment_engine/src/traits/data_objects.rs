use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db_types::{PaymentRecord, VerifiedPayment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertPaymentResult {
    Inserted(PaymentRecord),
    /// A successful payment with this reference had already been stored. The stored record is returned unchanged.
    AlreadyExists(PaymentRecord),
}

impl InsertPaymentResult {
    pub fn record(&self) -> &PaymentRecord {
        match self {
            InsertPaymentResult::Inserted(r) | InsertPaymentResult::AlreadyExists(r) => r,
        }
    }

    pub fn into_record(self) -> PaymentRecord {
        match self {
            InsertPaymentResult::Inserted(r) | InsertPaymentResult::AlreadyExists(r) => r,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, InsertPaymentResult::Inserted(_))
    }
}

/// What the gateway said about a reference. A payment that was not successful is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayVerification {
    pub success: bool,
    /// The raw status reported by the gateway, if it reported one.
    pub status: Option<String>,
    pub message: String,
    pub payment: Option<VerifiedPayment>,
}

impl GatewayVerification {
    pub fn confirmed(payment: VerifiedPayment) -> Self {
        Self { success: true, status: Some(payment.status.clone()), message: "Verification successful".into(), payment: Some(payment) }
    }

    pub fn rejected<S: Into<String>>(status: Option<String>, message: S) -> Self {
        Self { success: false, status, message: message.into(), payment: None }
    }
}

/// Where a rendered receipt lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptLocation {
    pub path: PathBuf,
    pub file_name: String,
}

impl ReceiptLocation {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let file_name = path.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
        Self { path, file_name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
