//! Fee Payment Engine
//!
//! The core of the school fee payment server. A payer's transaction reference is confirmed with the payment
//! gateway, recorded, turned into a PDF receipt and emailed back to them. This crate is independent of the web
//! framework.
//!
//! The library is divided into these sections:
//! 1. Backend contracts ([`traits`]). Persistence, the gateway, the receipt renderer and the notifier are all traits,
//!    so that the workflow can be tested with mocks, and backends can be swapped.
//! 2. Implementations of those contracts: [`SqliteDatabase`] for storage, [`receipts::PdfReceiptRenderer`],
//!    [`notifier::SmtpNotifier`] and Paystack (via `paystack_tools`) as the gateway.
//! 3. The public API ([`FulfillmentApi`] and [`PaymentsApi`]), which is what a server should call.
mod fee_api;
mod gateway;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod notifier;
pub mod receipts;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use fee_api::{
    errors::FulfillmentError,
    fulfillment_api::FulfillmentApi,
    fulfillment_objects::{FulfillmentOutcome, FulfillmentRequest, FulfillmentSummary, ReconcileReport},
    payments_api::PaymentsApi,
    reference_locks::{ReferenceGuard, ReferenceLocks},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    FulfillmentStore,
    GatewayError,
    GatewayVerification,
    InsertPaymentResult,
    NotifyError,
    PaymentStore,
    PaymentStoreError,
    PaymentVerifier,
    ReceiptLocation,
    ReceiptNotifier,
    ReceiptRenderer,
    RenderError,
};
