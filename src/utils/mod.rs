//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `fanout` crate.
//!
//! It holds the crate error type and the logging bootstrap shared by the
//! library and the demo binary.

pub mod error;
pub mod logging;

pub use error::{BrokerError, Result};

#[cfg(test)]
mod tests;
