//! Subscription registry: field handlers and per-field topic subscriber lists.
//!
//! # Thread Safety
//!
//! Two independent `RwLock`s guard the two maps:
//! - `handlers`: field name → handler, written once per schema build.
//! - `topics`: field name → topic → subscribers, appended on every successful
//!   handshake.
//!
//! Topics are scoped by the field that registered them, so two fields that
//! pick the same topic never see each other's subscribers.
//!
//! An append happens entirely under the write lock, so a concurrent
//! [`SubscriptionRegistry::subscribers_for`] sees either the list before the
//! append or the list after it, in append order. The registry never drops
//! subscribers on its own; [`SubscriptionRegistry::remove_channel`] exists
//! for the connection-lifecycle code that knows when a client is gone.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::models::{Subscriber, Topic};
use crate::subscriptions::handler::SubscriptionHandler;

type TopicMap = IndexMap<Topic, Vec<Arc<Subscriber>>>;

#[derive(Default)]
pub struct SubscriptionRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn SubscriptionHandler>>>,
    topics: RwLock<IndexMap<String, TopicMap>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `field_name` to `handler`. Registering a field again replaces the
    /// previous handler.
    pub fn register(&self, handler: Arc<dyn SubscriptionHandler>, field_name: &str) {
        let replaced = self
            .handlers
            .write()
            .insert(field_name.to_string(), handler)
            .is_some();
        debug!(field_name, replaced, "registered subscription field");
    }

    /// Append `subscriber` to the list for `topic` under `field_name`.
    pub fn subscriber(&self, field_name: &str, subscriber: Arc<Subscriber>, topic: Topic) {
        let mut topics = self.topics.write();
        debug!(
            field = field_name,
            topic = %topic,
            channel = subscriber.channel(),
            "registered subscriber"
        );
        topics
            .entry(field_name.to_string())
            .or_default()
            .entry(topic)
            .or_default()
            .push(subscriber);
    }

    /// Snapshot of the subscribers stored under `topic` for `field_name`, in
    /// append order.
    pub fn subscribers_for(&self, field_name: &str, topic: &Topic) -> Vec<Arc<Subscriber>> {
        self.topics
            .read()
            .get(field_name)
            .and_then(|by_topic| by_topic.get(topic))
            .cloned()
            .unwrap_or_default()
    }

    pub fn handler(&self, field_name: &str) -> Option<Arc<dyn SubscriptionHandler>> {
        self.handlers.read().get(field_name).cloned()
    }

    pub fn has_field(&self, field_name: &str) -> bool {
        self.handlers.read().contains_key(field_name)
    }

    pub fn subscriber_count(&self, field_name: &str, topic: &Topic) -> usize {
        self.topics
            .read()
            .get(field_name)
            .and_then(|by_topic| by_topic.get(topic))
            .map_or(0, Vec::len)
    }

    pub fn total_subscribers(&self) -> usize {
        self.topics
            .read()
            .values()
            .flat_map(|by_topic| by_topic.values())
            .map(Vec::len)
            .sum()
    }

    /// Topics of `field_name` with at least one subscriber, in
    /// first-registration order.
    pub fn topics(&self, field_name: &str) -> Vec<Topic> {
        self.topics
            .read()
            .get(field_name)
            .map(|by_topic| {
                by_topic
                    .iter()
                    .filter(|(_, subs)| !subs.is_empty())
                    .map(|(topic, _)| topic.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every subscriber registered under `channel` on any field and topic.
    ///
    /// Returns the number removed. Topics and fields left empty are pruned.
    pub fn remove_channel(&self, channel: &str) -> usize {
        let mut topics = self.topics.write();
        let mut removed = 0;
        for by_topic in topics.values_mut() {
            for subs in by_topic.values_mut() {
                let before = subs.len();
                subs.retain(|s| s.channel() != channel);
                removed += before - subs.len();
            }
            by_topic.retain(|_, subs| !subs.is_empty());
        }
        topics.retain(|_, by_topic| !by_topic.is_empty());
        if removed > 0 {
            debug!(channel, removed, "removed subscriber channel");
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
