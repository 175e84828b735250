//! # Paystack tools
//!
//! A small client for the parts of the Paystack REST API that the fee payment server needs: verifying a transaction
//! by its reference.
//!
//! Every request carries an explicit timeout. Transport failures, timeouts, `429` and `5xx` responses are retried
//! with a bounded exponential backoff (see [`PaystackConfig`]); any other non-2xx response is reported immediately.
mod api;
mod config;
mod data_objects;
mod error;
mod helpers;

pub use api::PaystackApi;
pub use config::PaystackConfig;
pub use data_objects::{PaystackAuthorization, PaystackCustomer, PaystackTransaction, VerificationResult};
pub use error::PaystackApiError;
pub use helpers::backoff_delay;
