//! Broker engine
//!
//! This module contains the in-process broker responsible for:
//! - attaching and detaching subscribers
//! - managing topic membership
//! - fanning broadcasts out to topic members as independent tasks
//!
//! Concurrency and usage notes:
//! - The broker is shared by reference (typically `Arc<Broker<P>>`); every
//!   method takes `&self`.
//! - The subscriber registry and the topic registry sit behind independent
//!   `RwLock`s. When more than one lock is needed they are taken in the order
//!   subscriber registry, topic registry, subscriber state.
//! - `broadcast` snapshots membership under the topic read lock, releases it,
//!   and spawns one task per recipient. It never waits for those tasks; the
//!   counters in [`BrokerStats`] are the only view of their outcome.
//! - Delivery tasks run on the tokio runtime current at broadcast time.
//!   Without one, each delivery is driven on its own OS thread.
//! - `max_in_flight` bounds deliveries that are actively sending. A delivery
//!   that finds its subscriber's channel full gives its permit back before
//!   waiting for a slot, so one stalled reader cannot starve the others.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::broker::message::Message;
use crate::broker::stats::BrokerStats;
use crate::broker::topic::{SubscriberId, TopicRegistry};
use crate::config::BrokerSettings;
use crate::subscriber::{Delivery, Subscriber, generate_id};
use crate::utils::Result;

pub struct Broker<P> {
    subscribers: RwLock<HashMap<SubscriberId, Arc<Subscriber<P>>>>,
    pub(crate) topics: RwLock<TopicRegistry<P>>,
    settings: BrokerSettings,
    limiter: Option<Arc<Semaphore>>,
    stats: Arc<BrokerStats>,
}

impl<P> Default for Broker<P>
where
    P: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Broker<P>
where
    P: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_settings(&BrokerSettings::default())
    }

    pub fn with_settings(settings: &BrokerSettings) -> Self {
        let settings = settings.clone().normalized();
        let limiter = (settings.max_in_flight > 0)
            .then(|| Arc::new(Semaphore::new(settings.max_in_flight)));

        Self {
            subscribers: RwLock::new(HashMap::new()),
            topics: RwLock::new(TopicRegistry::new()),
            settings,
            limiter,
            stats: Arc::new(BrokerStats::default()),
        }
    }

    /// Settings in effect, after clamping.
    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    /// Delivery counters shared with in-flight delivery tasks.
    pub fn stats(&self) -> &BrokerStats {
        &self.stats
    }

    /// Creates a subscriber and registers it with the broker.
    ///
    /// Fails only when the OS randomness source cannot produce an id.
    pub fn attach(&self) -> Result<Arc<Subscriber<P>>> {
        let id = generate_id(self.settings.id_bytes)?;
        let subscriber = Arc::new(Subscriber::new(id, self.settings.channel_capacity));

        self.subscribers
            .write()
            .insert(subscriber.id().to_string(), Arc::clone(&subscriber));

        debug!(subscriber = %subscriber.id(), "subscriber attached");
        Ok(subscriber)
    }

    /// Adds `subscriber` to each topic, creating topics on first use.
    ///
    /// Repeated subscriptions are no-ops, as is subscribing a detached
    /// subscriber.
    pub fn subscribe<I, S>(&self, subscriber: &Arc<Subscriber<P>>, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = self.topics.write();
        let mut state = subscriber.state();
        if state.sender.is_none() {
            debug!(subscriber = %subscriber.id(), "ignoring subscribe on detached subscriber");
            return;
        }

        for topic in topics {
            let topic = topic.as_ref();
            registry.entry(topic).subscribe(subscriber);
            if state.topics.insert(topic.to_string()) {
                debug!(subscriber = %subscriber.id(), topic, "subscribed");
            }
        }
    }

    /// Removes `subscriber` from each topic. Non-members and unknown topics
    /// are skipped.
    pub fn unsubscribe<I, S>(&self, subscriber: &Subscriber<P>, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = self.topics.write();
        let mut state = subscriber.state();

        for topic in topics {
            let topic = topic.as_ref();
            let Some(entry) = registry.get_mut(topic) else {
                continue;
            };
            entry.unsubscribe(subscriber.id());
            if state.topics.remove(topic) {
                debug!(subscriber = %subscriber.id(), topic, "unsubscribed");
            }
        }
    }

    /// Destroys `subscriber`, removes it from every topic and from the
    /// registry. Calling it again is a no-op.
    pub fn detach(&self, subscriber: &Subscriber<P>) {
        let mut subscribers = self.subscribers.write();

        let first = subscriber.destroy();
        self.leave_all(subscriber);
        subscribers.remove(subscriber.id());

        if first {
            debug!(subscriber = %subscriber.id(), "subscriber detached");
        }
    }

    // Takes the topic set under the topic write lock so a concurrent
    // subscribe cannot slip a topic in between reading and removing.
    fn leave_all(&self, subscriber: &Subscriber<P>) {
        let mut registry = self.topics.write();
        let mut state = subscriber.state();

        for topic in state.topics.drain() {
            if let Some(entry) = registry.get_mut(&topic) {
                entry.unsubscribe(subscriber.id());
            }
        }
    }

    /// Fans `payload` out to every current member of each topic.
    ///
    /// Each recipient gets its own [`Message`] delivered by an independent
    /// task. Returns as soon as the tasks are spawned.
    pub fn broadcast<I, S>(&self, payload: P, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stats.record_broadcast();

        for topic in topics {
            let topic = topic.as_ref();
            let members = self.topics.read().members(topic);
            if members.is_empty() {
                trace!(topic, "broadcast skipped, no subscribers");
                continue;
            }

            trace!(topic, recipients = members.len(), "broadcasting");
            for subscriber in members {
                let message = Message::new(topic, payload.clone());
                self.stats.record_dispatched();
                self.spawn(deliver(
                    subscriber,
                    message,
                    self.limiter.clone(),
                    Arc::clone(&self.stats),
                ));
            }
        }
    }

    /// Current number of members of `topic`; zero for unknown topics.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.read().subscriber_count(topic)
    }

    /// Every topic that has ever been subscribed to, in no particular order.
    pub fn topics(&self) -> Vec<String> {
        self.topics.read().names()
    }

    /// Number of attached (not yet detached) subscribers.
    pub fn attached_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Looks up an attached subscriber by id.
    pub fn subscriber(&self, id: &str) -> Option<Arc<Subscriber<P>>> {
        self.subscribers.read().get(id).cloned()
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(_) => {
                std::thread::spawn(move || futures::executor::block_on(task));
            }
        }
    }
}

async fn deliver<P>(
    subscriber: Arc<Subscriber<P>>,
    message: Message<P>,
    limiter: Option<Arc<Semaphore>>,
    stats: Arc<BrokerStats>,
) {
    let permit = match &limiter {
        Some(limiter) => limiter.acquire().await.ok(),
        None => None,
    };

    let outcome = match subscriber.try_signal(message) {
        Ok(outcome) => outcome,
        Err(message) => {
            // channel full: wait for the reader without holding a permit
            drop(permit);
            subscriber.signal(message).await
        }
    };

    match outcome {
        Delivery::Delivered => stats.record_delivered(),
        Delivery::Dropped => stats.record_dropped(),
    }
}

impl<P> fmt::Debug for Broker<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("subscribers", &self.subscribers.read().len())
            .field("settings", &self.settings)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
