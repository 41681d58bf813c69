//! Topic management
//!
//! A `Topic` holds the members of one topic name. Members are stored as
//! `Weak` back-references keyed by subscriber id: the broker's subscriber
//! registry owns subscribers, topics only point at them.
//!
//! `TopicRegistry` maps names to topics. Entries are created lazily on first
//! subscribe and are kept once created, even after the last member leaves.
//!
//! Concurrency note: callers must synchronize access (the broker keeps the
//! registry behind its own `RwLock`).

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::subscriber::Subscriber;

pub type SubscriberId = String;

#[derive(Debug)]
pub struct Topic<P> {
    pub name: String,
    pub subscribers: HashMap<SubscriberId, Weak<Subscriber<P>>>,
}

impl<P> Topic<P> {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashMap::new(),
        }
    }

    /// Add a subscriber to the topic. Duplicate adds are ignored.
    pub fn subscribe(&mut self, subscriber: &Arc<Subscriber<P>>) {
        self.subscribers
            .entry(subscriber.id().to_string())
            .or_insert_with(|| Arc::downgrade(subscriber));
    }

    /// Remove a subscriber from the topic.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Whether `id` is a member, live or not.
    pub fn contains(&self, id: &str) -> bool {
        self.subscribers.contains_key(id)
    }

    /// Number of members that are still alive.
    pub fn len(&self) -> usize {
        self.subscribers
            .values()
            .filter(|member| member.strong_count() > 0)
            .count()
    }

    /// True when no live member remains.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Strong handles to every live member.
    pub fn members(&self) -> Vec<Arc<Subscriber<P>>> {
        self.subscribers.values().filter_map(Weak::upgrade).collect()
    }
}

#[derive(Debug)]
pub struct TopicRegistry<P> {
    topics: HashMap<String, Topic<P>>,
}

impl<P> Default for TopicRegistry<P> {
    fn default() -> Self {
        Self {
            topics: HashMap::new(),
        }
    }
}

impl<P> TopicRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the topic, creating an empty one if it was never used.
    pub fn entry(&mut self, name: &str) -> &mut Topic<P> {
        self.topics
            .entry(name.to_string())
            .or_insert_with(|| Topic::new(name))
    }

    /// Looks up a topic without creating it.
    pub fn get(&self, name: &str) -> Option<&Topic<P>> {
        self.topics.get(name)
    }

    /// Mutable lookup; never creates the topic.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Topic<P>> {
        self.topics.get_mut(name)
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.topics.get(name).map_or(0, Topic::len)
    }

    /// Snapshot of the current members of `name`; empty for unknown topics.
    pub fn members(&self, name: &str) -> Vec<Arc<Subscriber<P>>> {
        self.topics.get(name).map(Topic::members).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<String> {
        self.topics.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
