//! Helpers for tests in crates that build on the engine. Enabled with the `test_utils` feature.
pub mod prepare_env;
