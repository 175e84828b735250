//! # School fee payment server
//! The HTTP front end of the fee payment engine. It is responsible for:
//! * Verifying payment references with Paystack, and returning a signed link to the emailed receipt.
//! * Recording payments that clients report directly.
//! * Authenticating the school administrator and serving the payments dashboard.
//! * Periodically finishing fulfillments whose receipt could not be rendered or emailed.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/verify_payment`, `/save_payment`, `/thank_you`: payment flow.
//! * `/admin`, `/logout`, `/dashboard`, `/api/fulfillments/stalled`: administration.
//! * `/receipts/{filename}`: receipt downloads.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod reconcile_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
