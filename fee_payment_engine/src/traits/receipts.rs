use std::path::Path;

use thiserror::Error;

use crate::{db_types::VerifiedPayment, traits::ReceiptLocation};

/// Produces a receipt document for a verified payment.
#[allow(async_fn_in_trait)]
pub trait ReceiptRenderer {
    /// Writes the receipt and returns where it was written. The location depends only on the payment reference, so
    /// rendering the same payment again overwrites the earlier document.
    async fn render(&self, payment: &VerifiedPayment) -> Result<ReceiptLocation, RenderError>;
}

/// Delivers a receipt document to the payer.
#[allow(async_fn_in_trait)]
pub trait ReceiptNotifier {
    async fn send(&self, to: &str, document: &Path) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Receipts cannot be generated for the reference '{0}'")]
    InvalidReference(String),
    #[error("Could not lay out the receipt document. {0}")]
    DocumentError(String),
    #[error("Could not write the receipt to {path}. {reason}")]
    WriteError { path: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Could not read the attachment {path}. {reason}")]
    AttachmentError { path: String, reason: String },
    #[error("Could not build the email. {0}")]
    MessageError(String),
    #[error("The mail server rejected or did not accept the message. {0}")]
    TransportError(String),
}
