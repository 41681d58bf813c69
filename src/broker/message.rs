//! Message definitions for the broker
//!
//! A `Message` is built once per delivery at broadcast time and is never
//! mutated afterwards. The broker does not look inside the payload, so any
//! `Clone + Send` type works; the message serializes whenever its payload
//! does.
//!
//! Notes on fields:
//! - `topic`: the topic the broadcast was addressed to
//! - `payload`: the caller's value, cloned per recipient
//! - `created_at`: milliseconds since UNIX epoch, stamped at broadcast time

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message<P> {
    topic: String,
    payload: P,
    created_at: i64,
}

impl<P> Message<P> {
    pub fn new(topic: impl Into<String>, payload: P) -> Self {
        Self {
            topic: topic.into(),
            payload,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Consumes the message and hands back the payload.
    pub fn into_payload(self) -> P {
        self.payload
    }
}
