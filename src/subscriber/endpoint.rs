//! Subscriber endpoint
//!
//! A `Subscriber` is created by `Broker::attach` and stays valid until
//! `Broker::detach`. The broker pushes messages in through [`Subscriber::signal`];
//! the caller reads them back with [`Subscriber::recv`], [`Subscriber::try_recv`]
//! or the [`Subscriber::messages`] stream.
//!
//! Delivery policy: the channel is a bounded tokio `mpsc` channel. Once it is
//! full, `signal` waits until the reader frees a slot or the subscriber is
//! destroyed. With the default capacity of one this is a single in-flight
//! slot per subscriber. Nothing is dropped while the subscriber is alive;
//! everything is dropped once it is destroyed.
//!
//! State (topic set, sending half) lives behind the subscriber's own lock so
//! a destroy racing a delivery never touches the broker's locks.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use futures::Stream;
use parking_lot::{Mutex, MutexGuard};
use rand::RngCore;
use rand::rngs::OsRng;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, watch};
use tracing::trace;

use crate::broker::message::Message;
use crate::broker::topic::SubscriberId;
use crate::utils::Result;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped,
}

pub(crate) struct State<P> {
    pub(crate) topics: HashSet<String>,
    // None once destroyed
    pub(crate) sender: Option<mpsc::Sender<Message<P>>>,
}

pub struct Subscriber<P> {
    id: SubscriberId,
    created_at: i64,
    state: Mutex<State<P>>,
    destroyed: watch::Sender<bool>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<Message<P>>>,
}

/// Generates a hex-encoded id from `len` bytes of OS randomness.
pub fn generate_id(len: usize) -> Result<SubscriberId> {
    generate_id_with(&mut OsRng, len)
}

/// Same as [`generate_id`] with a caller-supplied randomness source.
pub fn generate_id_with<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> Result<SubscriberId> {
    let mut bytes = vec![0u8; len];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

impl<P> Subscriber<P> {
    /// Creates a live subscriber whose channel holds `capacity` messages.
    ///
    /// A zero capacity is raised to one.
    pub(crate) fn new(id: SubscriberId, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (destroyed, _) = watch::channel(false);

        Self {
            id,
            created_at: chrono::Utc::now().timestamp_millis(),
            state: Mutex::new(State {
                topics: HashSet::new(),
                sender: Some(sender),
            }),
            destroyed,
            receiver: tokio::sync::Mutex::new(receiver),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time in milliseconds since UNIX epoch.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Snapshot of the topics this subscriber currently belongs to.
    pub fn topics(&self) -> Vec<String> {
        self.state.lock().topics.iter().cloned().collect()
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.state.lock().topics.contains(topic)
    }

    pub fn is_destroyed(&self) -> bool {
        *self.destroyed.borrow()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, State<P>> {
        self.state.lock()
    }

    /// Marks the subscriber destroyed and retires its sending half.
    ///
    /// Returns `false` if it was already destroyed. Deliveries waiting on a
    /// full channel are woken and dropped.
    pub(crate) fn destroy(&self) -> bool {
        let mut state = self.state.lock();
        if state.sender.take().is_none() {
            return false;
        }
        self.destroyed.send_replace(true);
        true
    }

    /// Delivers `message` into the subscriber's channel.
    ///
    /// A destroyed subscriber drops the message without touching the channel.
    /// When the channel is full this waits for the reader or for destruction.
    pub async fn signal(&self, message: Message<P>) -> Delivery {
        let (sender, mut destroyed) = {
            let state = self.state.lock();
            match &state.sender {
                Some(sender) => (sender.clone(), self.destroyed.subscribe()),
                None => {
                    trace!(subscriber = %self.short_id(), "delivery to destroyed subscriber dropped");
                    return Delivery::Dropped;
                }
            }
        };

        tokio::select! {
            biased;
            _ = destroyed.wait_for(|d| *d) => {
                trace!(subscriber = %self.short_id(), "subscriber destroyed while delivery was pending");
                Delivery::Dropped
            }
            sent = sender.send(message) => match sent {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Dropped,
            },
        }
    }

    /// Delivers `message` only if the channel has room right now.
    ///
    /// Hands the message back when the channel is full.
    pub fn try_signal(&self, message: Message<P>) -> std::result::Result<Delivery, Message<P>> {
        let state = self.state.lock();
        let Some(sender) = &state.sender else {
            return Ok(Delivery::Dropped);
        };
        match sender.try_send(message) {
            Ok(()) => Ok(Delivery::Delivered),
            Err(TrySendError::Full(message)) => Err(message),
            Err(TrySendError::Closed(_)) => Ok(Delivery::Dropped),
        }
    }

    /// Waits for the next message.
    ///
    /// Returns `None` once the subscriber has been destroyed.
    pub async fn recv(&self) -> Option<Message<P>> {
        let mut receiver = self.receiver.lock().await;
        if self.is_destroyed() {
            return None;
        }
        let message = receiver.recv().await?;
        if self.is_destroyed() {
            return None;
        }
        Some(message)
    }

    /// Takes the next message if one is ready.
    ///
    /// Reports `Empty` while another task is inside [`Subscriber::recv`].
    pub fn try_recv(&self) -> std::result::Result<Message<P>, TryRecvError> {
        if self.is_destroyed() {
            return Err(TryRecvError::Disconnected);
        }
        let mut receiver = self
            .receiver
            .try_lock()
            .map_err(|_| TryRecvError::Empty)?;
        receiver.try_recv()
    }

    /// Stream of delivered messages that ends after detach.
    pub fn messages(self: Arc<Self>) -> impl Stream<Item = Message<P>> {
        futures::stream::unfold(self, |subscriber| async move {
            let message = subscriber.recv().await?;
            Some((message, subscriber))
        })
    }

    fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(12)]
    }
}

impl<P> fmt::Debug for Subscriber<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}
