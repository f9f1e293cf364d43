//! The `@subscription` field directive.
//!
//! A subscription field resolves in one of two ways, picked by the caller:
//!
//! - **Handshake**: the client's initial `subscription { ... }` request.
//!   The request is snapshotted into a [`Subscriber`], authorized once with
//!   [`SubscriptionHandler::can`], and stored under the topic from
//!   [`SubscriptionHandler::encode_topic`]. No field data is returned.
//! - **Delivery**: a broadcast replaying a stored subscriber. The handler's
//!   `resolve` produces the value and its result is returned untouched.
//!   Authorization is not repeated and the registry is not touched.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{FieldError, FieldResult, LiveError, LiveResult};
use crate::models::{Args, RequestContext, ResolveInfo, Subscriber, SubscriptionField};
use crate::subscriptions::handler::{HandlerTable, SubscriptionHandler};
use crate::subscriptions::registry::SubscriptionRegistry;

/// Supplies the text of the GraphQL document currently being executed.
pub trait QueryDocumentProvider: Send + Sync {
    fn current_query(&self) -> String;
}

/// A fixed query document.
#[derive(Debug, Clone, Default)]
pub struct StaticQuery(pub String);

impl QueryDocumentProvider for StaticQuery {
    fn current_query(&self) -> String {
        self.0.clone()
    }
}

impl<F> QueryDocumentProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn current_query(&self) -> String {
        self()
    }
}

/// How a subscription field is being resolved.
#[derive(Debug, Clone)]
pub enum ResolutionKind {
    /// Initial subscribe request with the live root value.
    Handshake(Option<Value>),
    /// Broadcast replay of a stored subscriber.
    Delivery(Arc<Subscriber>),
}

pub struct SubscriptionDirective {
    registry: Arc<SubscriptionRegistry>,
    handlers: HandlerTable,
    query: Arc<dyn QueryDocumentProvider>,
}

impl SubscriptionDirective {
    pub const NAME: &'static str = "subscription";

    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        handlers: HandlerTable,
        query: Arc<dyn QueryDocumentProvider>,
    ) -> Self {
        Self {
            registry,
            handlers,
            query,
        }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Register the field's handler and build its resolver.
    ///
    /// Fails with [`LiveError::UnknownHandler`] when the field names a class
    /// missing from the handler table.
    pub fn resolve_field(&self, field: &SubscriptionField) -> LiveResult<SubscriptionResolver> {
        let handler = self.handlers.get(&field.handler_class)?;
        self.registry.register(Arc::clone(&handler), &field.field_name);

        Ok(SubscriptionResolver {
            field_name: field.field_name.clone(),
            handler,
            registry: Arc::clone(&self.registry),
            query: Arc::clone(&self.query),
        })
    }
}

/// Resolver bound to one subscription field.
#[derive(Clone)]
pub struct SubscriptionResolver {
    field_name: String,
    handler: Arc<dyn SubscriptionHandler>,
    registry: Arc<SubscriptionRegistry>,
    query: Arc<dyn QueryDocumentProvider>,
}

impl SubscriptionResolver {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn resolve(
        &self,
        kind: ResolutionKind,
        args: &Args,
        context: &RequestContext,
        info: &ResolveInfo,
    ) -> FieldResult<Option<Value>> {
        match kind {
            ResolutionKind::Delivery(subscriber) => {
                resolve_delivery(self.handler.as_ref(), &subscriber, args, context, info)
            }
            ResolutionKind::Handshake(root) => {
                self.handshake(root, args, context, info)?;
                Ok(None)
            }
        }
    }

    /// Resolve a delivery using the subscriber's own snapshot.
    pub fn deliver(&self, subscriber: Arc<Subscriber>) -> FieldResult<Option<Value>> {
        let args = subscriber.args().clone();
        let context = subscriber.context().clone();
        let info = subscriber.info().clone();
        self.resolve(ResolutionKind::Delivery(subscriber), &args, &context, &info)
    }

    fn handshake(
        &self,
        root: Option<Value>,
        args: &Args,
        context: &RequestContext,
        info: &ResolveInfo,
    ) -> LiveResult<Arc<Subscriber>> {
        let subscriber = Arc::new(Subscriber::initialize(
            root,
            args.clone(),
            context.clone(),
            info.clone(),
            self.query.current_query(),
        ));

        if !self.handler.can(&subscriber) {
            warn!(
                field = %self.field_name,
                user = context.user_id.as_deref().unwrap_or("anonymous"),
                "unauthorized subscription request"
            );
            return Err(LiveError::UnauthorizedSubscriber);
        }

        let topic = self.handler.encode_topic(&subscriber, &self.field_name);
        debug!(field = %self.field_name, topic = %topic, "subscription handshake accepted");
        self.registry.subscriber(&self.field_name, Arc::clone(&subscriber), topic);
        Ok(subscriber)
    }
}

/// The delivery path: the handler's value for a stored subscriber, unchanged.
///
/// Never authorizes and never touches the registry.
pub(crate) fn resolve_delivery(
    handler: &dyn SubscriptionHandler,
    subscriber: &Subscriber,
    args: &Args,
    context: &RequestContext,
    info: &ResolveInfo,
) -> FieldResult<Option<Value>> {
    handler
        .resolve(subscriber.root(), args, context, info)
        .map(Some)
        .map_err(FieldError::Resolver)
}

impl std::fmt::Debug for SubscriptionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionResolver")
            .field("field_name", &self.field_name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
