//! # fanout
//!
//! `fanout` is a minimalist, in-process publish/subscribe broker built with Rust.
//! Producers broadcast payloads tagged with topic names; subscribers attach to
//! the broker, join topics, and read the matching messages from a private
//! channel. Every delivery runs as its own task, so a broadcast never waits on
//! a slow reader.
//!
//! ## Core Modules
//!
//! - `broker`: the coordinator that owns the subscriber and topic registries and fans broadcasts out.
//! - `subscriber`: a consumer endpoint with its own id, topic set and delivery channel.
//! - `config`: loading broker and logging settings.
//! - `utils`: the crate error type and logging bootstrap.
//!
//! ## Example
//!
//! ```no_run
//! use fanout::Broker;
//!
//! # async fn run() -> fanout::Result<()> {
//! let broker: Broker<String> = Broker::new();
//! let subscriber = broker.attach()?;
//! broker.subscribe(&subscriber, ["news"]);
//!
//! broker.broadcast("hello".to_string(), ["news"]);
//! if let Some(message) = subscriber.recv().await {
//!     assert_eq!(message.payload(), "hello");
//! }
//!
//! broker.detach(&subscriber);
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod config;
pub mod subscriber;
pub mod utils;

pub use broker::{Broker, BrokerStats, Message};
pub use subscriber::{Delivery, Subscriber};
pub use utils::{BrokerError, Result};
