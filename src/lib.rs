//! Budget Coach — library crate for integration testing.
//!
//! Re-exports modules needed by integration tests in `tests/`.

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod session;
pub mod upstream;
