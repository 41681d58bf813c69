//! The `subscriber` module defines a consumer endpoint of the broker.
//!
//! It provides the `Subscriber` struct, which holds the subscriber's unique
//! identifier, its topic set, and both ends of its private delivery channel,
//! along with id generation.

pub mod endpoint;

pub use endpoint::{Delivery, Subscriber, generate_id, generate_id_with};
