//! Relay edge types: memoized edge shapes and cursor-stamping edge fields.
//!
//! [`EdgeRegistrar`] builds one edge object type per name and caches it for
//! the life of the registrar. Entries are never evicted; a `fresh` request
//! overwrites the cached shape. Builds run outside the cache lock, so lookups
//! for different names never wait on each other's generator calls.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::config::LiveConfig;
use crate::errors::{LiveError, LiveResult};
use crate::schema::global_id::encode_global_id;
use crate::schema::types::{FieldType, NodeType, ObjectType, TypeLookup};

/// A built edge object type (`node` + `cursor`).
pub type EdgeShape = Arc<ObjectType>;

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Builds the concrete edge object type for a node type.
pub trait EdgeTypeGenerator: Send + Sync {
    fn build(&self, name: &str, node_type: &NodeType) -> EdgeShape;
}

/// Default generator: `type <name> { node: <NodeType>, cursor: String! }`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelayEdgeTypeGenerator;

impl EdgeTypeGenerator for RelayEdgeTypeGenerator {
    fn build(&self, name: &str, node_type: &NodeType) -> EdgeShape {
        Arc::new(
            ObjectType::new(name)
                .with_description(&format!("An edge in a connection of {}.", node_type.name))
                .field("node", FieldType::Object(Arc::clone(node_type)))
                .field("cursor", FieldType::non_null(FieldType::scalar("String"))),
        )
    }
}

// ---------------------------------------------------------------------------
// Connection edges
// ---------------------------------------------------------------------------

/// A domain type that can appear as an edge in a connection.
pub trait ConnectionEdge: Send + Sync {
    /// Name of the edge object type, e.g. `UserEdge`.
    fn name(&self) -> String;

    /// Name of the node type the edge wraps, e.g. `User`.
    fn node_type(&self) -> String;

    /// The node value for one payload.
    fn edge(&self, payload: &Value) -> Value;

    /// The raw (unencoded) cursor for one payload.
    fn cursor(&self, payload: &Value) -> String;

    /// Cache key derived from the implementing type's path.
    fn type_key(&self) -> String {
        normalize_type_name(std::any::type_name::<Self>())
    }
}

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());
static ACRONYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static CAMEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Turn a qualified type path into a lowercase snake key.
///
/// `my_app::edges::UserEdge` becomes `my_app_edges_user_edge`. Path and
/// generic separators collapse to a single `_`.
#[cfg_attr(feature = "python", pyfunction)]
pub fn normalize_type_name(qualified: &str) -> String {
    let flat = NON_WORD_RE.replace_all(qualified, "_");
    let split = ACRONYM_RE.replace_all(&flat, "${1}_${2}");
    let split = CAMEL_RE.replace_all(&split, "${1}_${2}");
    split.to_lowercase().trim_matches('_').to_string()
}

/// Cache key for an edge entity when no explicit name is given.
pub fn instance_name(edge: &dyn ConnectionEdge) -> String {
    edge.type_key()
}

/// Name-keyed table of edge entities, filled at startup.
#[derive(Default)]
pub struct EdgeCatalog {
    edges: RwLock<HashMap<String, Arc<dyn ConnectionEdge>>>,
}

impl EdgeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the derived [`instance_name`]; returns the key.
    pub fn register(&self, edge: Arc<dyn ConnectionEdge>) -> String {
        let key = instance_name(edge.as_ref());
        self.edges.write().insert(key.clone(), edge);
        key
    }

    pub fn register_as(&self, name: &str, edge: Arc<dyn ConnectionEdge>) {
        self.edges.write().insert(name.to_string(), edge);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ConnectionEdge>> {
        self.edges.read().get(name).cloned()
    }
}

// ---------------------------------------------------------------------------
// Edge field
// ---------------------------------------------------------------------------

/// One resolved edge: the node plus its encoded cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeValue {
    pub node: Value,
    pub cursor: String,
}

/// Field descriptor for an edge: its schema type, resolver and the cursor
/// and paging settings it was built with.
#[derive(Clone)]
pub struct EdgeField {
    pub field_type: EdgeShape,
    edge: Arc<dyn ConnectionEdge>,
    settings: EdgeSettings,
}

/// Cursor type and page sizes captured from [`LiveConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct EdgeSettings {
    cursor_type: String,
    default_page_size: i64,
    max_page_size: i64,
}

impl From<&LiveConfig> for EdgeSettings {
    fn from(config: &LiveConfig) -> Self {
        Self {
            cursor_type: config.cursor_type.clone(),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }
}

impl EdgeField {
    /// Resolve one payload into its node and encoded cursor.
    ///
    /// Both the node and the raw cursor are taken from the same borrowed
    /// payload before anything else runs.
    pub fn resolve(&self, payload: &Value) -> EdgeValue {
        let node = self.edge.edge(payload);
        let raw_cursor = self.edge.cursor(payload);
        EdgeValue {
            node,
            cursor: encode_global_id(&self.settings.cursor_type, &raw_cursor),
        }
    }

    pub fn raw_cursor(&self, payload: &Value) -> String {
        self.edge.cursor(payload)
    }

    pub fn cursor_type(&self) -> &str {
        &self.settings.cursor_type
    }

    /// Page size used when a connection is queried without `first`.
    pub fn default_page_size(&self) -> i64 {
        self.settings.default_page_size
    }

    pub fn max_page_size(&self) -> i64 {
        self.settings.max_page_size
    }

    pub fn edge_name(&self) -> String {
        self.edge.name()
    }
}

impl std::fmt::Debug for EdgeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeField")
            .field("field_type", &self.field_type.name)
            .field("edge", &self.edge.name())
            .field("settings", &self.settings)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registrar
// ---------------------------------------------------------------------------

pub struct EdgeRegistrar {
    instances: RwLock<HashMap<String, EdgeShape>>,
    generator: RwLock<Arc<dyn EdgeTypeGenerator>>,
    catalog: Arc<EdgeCatalog>,
    types: Arc<dyn TypeLookup>,
    settings: EdgeSettings,
}

impl EdgeRegistrar {
    pub fn new(catalog: Arc<EdgeCatalog>, types: Arc<dyn TypeLookup>, config: &LiveConfig) -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            generator: RwLock::new(Arc::new(RelayEdgeTypeGenerator)),
            catalog,
            types,
            settings: EdgeSettings::from(config),
        }
    }

    /// Get the edge shape cached under `name`, building it if needed.
    ///
    /// With `explicit_type` the shape is generated for that node type;
    /// otherwise the edge entity registered under `name` in the catalog
    /// supplies the node type. `fresh` skips the cache and overwrites it.
    pub fn instance(
        &self,
        name: &str,
        fresh: bool,
        explicit_type: Option<&NodeType>,
    ) -> LiveResult<EdgeShape> {
        if !fresh {
            if let Some(cached) = self.instances.read().get(name) {
                debug!(name, "edge shape cache hit");
                return Ok(Arc::clone(cached));
            }
        }

        let shape = match explicit_type {
            Some(node_type) => self.create_instance(name, node_type),
            None => {
                let edge = self
                    .catalog
                    .get(name)
                    .ok_or_else(|| LiveError::UnknownEdge(name.to_string()))?;
                let node_type = self.resolve_node_type(edge.as_ref())?;
                self.create_instance(&edge.name(), &node_type)
            }
        };

        Ok(self.store(name, shape, fresh))
    }

    /// Edge shape for an entity, cached under its derived [`instance_name`].
    pub fn instance_of(&self, edge: &dyn ConnectionEdge, fresh: bool) -> LiveResult<EdgeShape> {
        let key = instance_name(edge);
        if !fresh {
            if let Some(cached) = self.instances.read().get(&key) {
                return Ok(Arc::clone(cached));
            }
        }
        let node_type = self.resolve_node_type(edge)?;
        let shape = self.create_instance(&edge.name(), &node_type);
        Ok(self.store(&key, shape, fresh))
    }

    /// Build an edge shape with the current generator, bypassing the cache.
    pub fn create_instance(&self, name: &str, node_type: &NodeType) -> EdgeShape {
        debug!(name, node_type = %node_type.name, "building edge shape");
        self.generator().build(name, node_type)
    }

    /// Build the field descriptor for an edge entity.
    pub fn create_edge_field(&self, edge: Arc<dyn ConnectionEdge>) -> LiveResult<EdgeField> {
        let node_type = self.resolve_node_type(edge.as_ref())?;
        let field_type = self.instance(&edge.name(), false, Some(&node_type))?;
        Ok(EdgeField {
            field_type,
            edge,
            settings: self.settings.clone(),
        })
    }

    pub fn set_generator(&self, generator: Arc<dyn EdgeTypeGenerator>) {
        *self.generator.write() = generator;
    }

    pub fn generator(&self) -> Arc<dyn EdgeTypeGenerator> {
        Arc::clone(&self.generator.read())
    }

    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.instances.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.instances.write().clear();
    }

    fn resolve_node_type(&self, edge: &dyn ConnectionEdge) -> LiveResult<NodeType> {
        let type_name = edge.node_type();
        self.types
            .type_named(&type_name)
            .ok_or(LiveError::UnknownType(type_name))
    }

    /// Insert a built shape. A non-fresh build that lost a race adopts the
    /// shape already cached so one key never maps to two shapes.
    fn store(&self, name: &str, shape: EdgeShape, fresh: bool) -> EdgeShape {
        let mut instances = self.instances.write();
        if !fresh {
            if let Some(existing) = instances.get(name) {
                return Arc::clone(existing);
            }
        }
        instances.insert(name.to_string(), Arc::clone(&shape));
        shape
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
