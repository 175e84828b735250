//! # Receipts
//!
//! A receipt is a single US-Letter page: a title, seven labelled lines describing the payment, and a closing line.
//! [`ReceiptDocument`] holds the text, and [`PdfReceiptRenderer`] lays it out and writes it to
//! `{receipt_dir}/receipt-{reference}.pdf`.
mod document;
mod pdf;

pub use document::{format_paid_at, ReceiptDocument, RECEIPT_FOOTER, RECEIPT_TITLE};
use fee_common::helpers::is_valid_reference;
pub use pdf::PdfReceiptRenderer;

use crate::traits::RenderError;

const RECEIPT_PREFIX: &str = "receipt-";
const RECEIPT_EXTENSION: &str = ".pdf";

/// The file name of the receipt for `reference`. References that could escape the receipt directory, or that are
/// otherwise unsafe in a file name, are refused.
pub fn receipt_file_name(reference: &str) -> Result<String, RenderError> {
    if !is_valid_reference(reference) {
        return Err(RenderError::InvalidReference(reference.to_string()));
    }
    Ok(format!("{RECEIPT_PREFIX}{reference}{RECEIPT_EXTENSION}"))
}

/// The inverse of [`receipt_file_name`]. Returns the reference if `file_name` names a receipt.
pub fn reference_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(RECEIPT_PREFIX)
        .and_then(|s| s.strip_suffix(RECEIPT_EXTENSION))
        .filter(|reference| is_valid_reference(reference))
}
