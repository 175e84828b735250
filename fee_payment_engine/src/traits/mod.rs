//! # Backend contracts
//!
//! The fulfillment workflow is written against four collaborators, each described by a trait here, so that any of
//! them can be replaced (by a mock in tests, or by a different provider in production).
//!
//! * [`PaymentStore`] and [`FulfillmentStore`] define the persistence backend. [`crate::SqliteDatabase`] is the
//!   production implementation.
//! * [`PaymentVerifier`] asks the payment gateway whether a transaction reference was paid.
//! * [`ReceiptRenderer`] turns a verified payment into a receipt document on disk.
//! * [`ReceiptNotifier`] delivers that document to the payer.
mod data_objects;
mod fulfillment_store;
mod payment_store;
mod receipts;
mod verifier;

pub use data_objects::{GatewayVerification, InsertPaymentResult, ReceiptLocation};
pub use fulfillment_store::FulfillmentStore;
pub use payment_store::{PaymentStore, PaymentStoreError};
pub use receipts::{NotifyError, ReceiptNotifier, ReceiptRenderer, RenderError};
pub use verifier::{GatewayError, PaymentVerifier};
