//! The `error` module defines the error type surfaced by the broker.
//!
//! Only subscriber id generation can fail: every other broker operation is
//! total over its inputs (unknown topics, repeated subscriptions and deliveries
//! to detached subscribers are all no-ops).

use thiserror::Error;

/// Errors returned by [`crate::broker::Broker`] operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The operating system randomness source could not produce an id.
    #[error("randomness source unavailable while generating subscriber id: {0}")]
    Entropy(#[from] rand::Error),
}

pub type Result<T> = std::result::Result<T, BrokerError>;
