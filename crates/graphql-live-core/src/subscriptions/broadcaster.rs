//! Broadcast fan-out: replays stored subscribers against a new payload.
//!
//! For one broadcast the handler derives the topic from the payload, the
//! registry snapshot for that topic is filtered per subscriber, and each
//! remaining subscriber is resolved on the delivery path with
//! its own arguments, context and info. Deliveries run on a Rayon pool; the
//! registry lock is never held while a handler runs.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::LiveConfig;
use crate::errors::{FieldResult, LiveError, LiveResult};
use crate::models::{Subscriber, Topic};
use crate::subscriptions::directive::resolve_delivery;
use crate::subscriptions::handler::SubscriptionHandler;
use crate::subscriptions::registry::SubscriptionRegistry;

/// Result of delivering one payload to one subscriber.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub channel: String,
    pub result: FieldResult<Option<Value>>,
}

impl DeliveryOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct Broadcaster {
    registry: Arc<SubscriptionRegistry>,
    pool: Option<rayon::ThreadPool>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SubscriptionRegistry>, config: &LiveConfig) -> Self {
        let pool = if config.broadcast_parallel {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.broadcast_workers.max(1))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("Failed to build broadcast pool, delivering sequentially: {e}");
                    None
                }
            }
        } else {
            None
        };
        Self { registry, pool }
    }

    /// Deliver `payload` to the subscribers of `field_name`, routed by the
    /// handler's `decode_topic`.
    pub fn broadcast(&self, field_name: &str, payload: &Value) -> LiveResult<Vec<DeliveryOutcome>> {
        let handler = self.handler_for(field_name)?;
        let topic = handler.decode_topic(field_name, payload);
        Ok(self.deliver(field_name, handler, &topic, payload))
    }

    /// Deliver `payload` to the subscribers stored under an explicit topic.
    pub fn broadcast_to_topic(
        &self,
        field_name: &str,
        topic: &Topic,
        payload: &Value,
    ) -> LiveResult<Vec<DeliveryOutcome>> {
        let handler = self.handler_for(field_name)?;
        Ok(self.deliver(field_name, handler, topic, payload))
    }

    fn handler_for(&self, field_name: &str) -> LiveResult<Arc<dyn SubscriptionHandler>> {
        self.registry
            .handler(field_name)
            .ok_or_else(|| LiveError::UnknownSubscriptionField(field_name.to_string()))
    }

    fn deliver(
        &self,
        field_name: &str,
        handler: Arc<dyn SubscriptionHandler>,
        topic: &Topic,
        payload: &Value,
    ) -> Vec<DeliveryOutcome> {
        let targets: Vec<Arc<Subscriber>> = self
            .registry
            .subscribers_for(field_name, topic)
            .into_iter()
            .filter(|subscriber| handler.filter(subscriber, payload))
            .collect();

        if targets.is_empty() {
            return Vec::new();
        }

        let deliver_one = |subscriber: &Arc<Subscriber>| {
            let delivered = subscriber.with_root(payload.clone());
            let result = resolve_delivery(
                handler.as_ref(),
                &delivered,
                subscriber.args(),
                subscriber.context(),
                subscriber.info(),
            );
            DeliveryOutcome {
                channel: subscriber.channel().to_string(),
                result,
            }
        };

        let outcomes: Vec<DeliveryOutcome> = match &self.pool {
            Some(pool) => pool.install(|| targets.par_iter().map(deliver_one).collect()),
            None => targets.iter().map(deliver_one).collect(),
        };

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        for outcome in outcomes.iter().filter(|o| !o.is_ok()) {
            if let Err(e) = &outcome.result {
                warn!(channel = %outcome.channel, "delivery failed: {e}");
            }
        }
        info!(
            field = field_name,
            topic = %topic,
            delivered = outcomes.len() - failed,
            failed,
            "broadcast complete"
        );
        outcomes
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
