//! Value types shared by the fee payment engine, the Paystack client and the server.
mod kobo;

pub mod helpers;
mod secret;

pub use kobo::Kobo;
pub use secret::Secret;
