//! Minimal executable-schema type model.
//!
//! Only what the edge builder needs: named object types with ordered fields,
//! and a lookup from type name to the shared type object.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Shared handle to a schema object type. Identity is `Arc` identity.
pub type NodeType = Arc<ObjectType>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(String),
    Object(NodeType),
    NonNull(Box<FieldType>),
    List(Box<FieldType>),
}

impl FieldType {
    pub fn scalar(name: &str) -> Self {
        FieldType::Scalar(name.to_string())
    }

    pub fn non_null(inner: FieldType) -> Self {
        FieldType::NonNull(Box::new(inner))
    }

    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    /// Render as SDL, e.g. `[User!]!`.
    pub fn sdl(&self) -> String {
        match self {
            FieldType::Scalar(name) => name.clone(),
            FieldType::Object(object) => object.name.clone(),
            FieldType::NonNull(inner) => format!("{}!", inner.sdl()),
            FieldType::List(inner) => format!("[{}]", inner.sdl()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldType>,
}

impl ObjectType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.insert(name.to_string(), field_type);
        self
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }
}

/// Resolves a named type reference to its schema object.
pub trait TypeLookup: Send + Sync {
    fn type_named(&self, name: &str) -> Option<NodeType>;
}

/// In-memory [`TypeLookup`] populated while the schema is built.
#[derive(Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, NodeType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under its own name, returning the shared handle.
    pub fn register(&self, object: ObjectType) -> NodeType {
        let node: NodeType = Arc::new(object);
        self.types
            .write()
            .insert(node.name.clone(), Arc::clone(&node));
        node
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl TypeLookup for TypeRegistry {
    fn type_named(&self, name: &str) -> Option<NodeType> {
        self.types.read().get(name).cloned()
    }
}
