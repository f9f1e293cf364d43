//! The per-field subscription contract and the startup handler table.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::{BoxError, LiveError, LiveResult};
use crate::models::{Args, RequestContext, ResolveInfo, Subscriber, Topic};

/// User-supplied logic behind one `@subscription` field.
///
/// `encode_topic` (handshake side) and `decode_topic` (broadcast side) must
/// agree: a payload is only delivered to subscribers stored under the topic
/// `decode_topic` derives from it.
pub trait SubscriptionHandler: Send + Sync {
    /// Whether the subscriber may subscribe. Must not mutate external state.
    fn can(&self, subscriber: &Subscriber) -> bool;

    /// Produce the field value for a delivered payload.
    fn resolve(
        &self,
        root: Option<&Value>,
        args: &Args,
        context: &RequestContext,
        info: &ResolveInfo,
    ) -> Result<Value, BoxError>;

    /// Routing key a subscriber is stored under.
    fn encode_topic(&self, _subscriber: &Subscriber, field_name: &str) -> Topic {
        Topic::for_field(field_name)
    }

    /// Routing key a broadcast payload is sent to.
    fn decode_topic(&self, field_name: &str, _payload: &Value) -> Topic {
        Topic::for_field(field_name)
    }

    /// Whether a subscriber on the topic should receive this payload.
    fn filter(&self, _subscriber: &Subscriber, _payload: &Value) -> bool {
        true
    }
}

/// Handler instances keyed by the class name used in `@subscription(class:)`.
///
/// Assembled once at startup and handed to the directive.
#[derive(Default, Clone)]
pub struct HandlerTable {
    handlers: HashMap<String, Arc<dyn SubscriptionHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: &str, handler: Arc<dyn SubscriptionHandler>) -> Self {
        self.insert(class, handler);
        self
    }

    pub fn insert(&mut self, class: &str, handler: Arc<dyn SubscriptionHandler>) {
        self.handlers.insert(class.to_string(), handler);
    }

    pub fn get(&self, class: &str) -> LiveResult<Arc<dyn SubscriptionHandler>> {
        self.handlers
            .get(class)
            .cloned()
            .ok_or_else(|| LiveError::UnknownHandler(class.to_string()))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
