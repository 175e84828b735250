mod admin;
mod helpers;
mod mocks;
mod payments;
mod receipts;
