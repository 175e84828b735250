//! The public API of the fee payment engine.
//!
//! * [`FulfillmentApi`](fulfillment_api::FulfillmentApi) drives a transaction reference from gateway verification
//!   through to an emailed receipt, and picks up fulfillments that stalled along the way.
//! * [`PaymentsApi`](payments_api::PaymentsApi) covers direct access to payment records.
pub mod errors;
pub mod fulfillment_api;
pub mod fulfillment_objects;
pub mod payments_api;
pub mod reference_locks;
