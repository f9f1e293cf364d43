//! Shared typed models used by the subscription and connection layers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::{LiveError, LiveResult};

/// GraphQL field arguments.
pub type Args = serde_json::Map<String, Value>;

const CHANNEL_PREFIX: &str = "private-live-";

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// Opaque routing key grouping subscribers that share a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(topic: impl Into<String>) -> Self {
        Self(topic.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// One topic per field, named exactly after the field.
    pub fn for_field(field_name: &str) -> Self {
        Self(field_name.to_string())
    }

    /// Dot-joined topic, e.g. `messageAdded.channel.general`.
    pub fn from_parts(field_name: &str, parts: &[&str]) -> Self {
        let mut topic = field_name.to_string();
        for part in parts {
            topic.push('.');
            topic.push_str(part);
        }
        Self(topic)
    }

    /// Field name plus the first 16 hex chars of SHA-256 over the canonical
    /// JSON of `value`. Object keys serialize sorted, so equal values always
    /// produce equal topics.
    pub fn digest(field_name: &str, value: &Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(field_name.as_bytes());
        hasher.update(b"\0");
        hasher.update(value.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(format!("{field_name}:{}", &digest[..16]))
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Topic {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Request context / resolve info
// ---------------------------------------------------------------------------

/// Per-request context handed to every resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub attributes: IndexMap<String, Value>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Field-resolution metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveInfo {
    pub field_name: String,
    pub parent_type: String,
    pub path: Vec<String>,
    pub operation_name: Option<String>,
}

impl ResolveInfo {
    pub fn new(field_name: &str, parent_type: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            parent_type: parent_type.to_string(),
            path: vec![field_name.to_string()],
            operation_name: None,
        }
    }

    pub fn with_operation(mut self, operation_name: &str) -> Self {
        self.operation_name = Some(operation_name.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// SubscriptionField
// ---------------------------------------------------------------------------

/// A field carrying `@subscription(class: "...")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionField {
    pub field_name: String,
    pub handler_class: String,
}

impl SubscriptionField {
    pub fn new(field_name: &str, handler_class: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            handler_class: handler_class.to_string(),
        }
    }

    /// Build from the directive's argument object; `class` is required.
    pub fn from_directive(field_name: &str, directive_args: &Args) -> LiveResult<Self> {
        let class = directive_args
            .get("class")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                LiveError::UnknownHandler(format!("missing `class` argument on {field_name}"))
            })?;
        Ok(Self::new(field_name, class.trim()))
    }
}

// ---------------------------------------------------------------------------
// Subscriber
// ---------------------------------------------------------------------------

/// Immutable snapshot of a subscription request, replayed on delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    channel: String,
    root: Option<Value>,
    args: Args,
    context: RequestContext,
    info: ResolveInfo,
    query: String,
}

impl Subscriber {
    /// Snapshot a handshake request under a freshly minted channel.
    pub fn initialize(
        root: Option<Value>,
        args: Args,
        context: RequestContext,
        info: ResolveInfo,
        query: String,
    ) -> Self {
        Self {
            channel: format!("{CHANNEL_PREFIX}{}", Uuid::new_v4().simple()),
            root,
            args,
            context,
            info,
            query,
        }
    }

    /// Copy of this subscriber carrying a broadcast payload as its root.
    pub fn with_root(&self, root: Value) -> Self {
        Self {
            root: Some(root),
            ..self.clone()
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn root(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn info(&self) -> &ResolveInfo {
        &self.info
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn field_name(&self) -> &str {
        &self.info.field_name
    }

    pub fn to_json(&self) -> LiveResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> LiveResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
