//! ldp-authz library
//!
//! Exposes modules for integration testing

pub mod cli;
pub mod request;

pub use request::{evaluate, Outcome, RequestError, RequestFile};
