//! Error types for the graphql-live core library.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyKeyError, PyPermissionError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Error type user-supplied resolvers hand back to the core.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error enum for the graphql-live core library.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    #[error("Unauthorized subscription request")]
    UnauthorizedSubscriber,

    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    #[error("No subscription handler registered for class: {0}")]
    UnknownHandler(String),

    #[error("No subscription registered for field: {0}")]
    UnknownSubscriptionField(String),

    #[error("No connection edge registered under: {0}")]
    UnknownEdge(String),

    #[error("Unknown GraphQL type: {0}")]
    UnknownType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<LiveError> for PyErr {
    fn from(err: LiveError) -> PyErr {
        match &err {
            LiveError::UnauthorizedSubscriber => PyPermissionError::new_err(err.to_string()),
            LiveError::MalformedCursor(_) | LiveError::Json(_) => {
                PyValueError::new_err(err.to_string())
            }
            LiveError::UnknownHandler(_)
            | LiveError::UnknownSubscriptionField(_)
            | LiveError::UnknownEdge(_)
            | LiveError::UnknownType(_) => PyKeyError::new_err(err.to_string()),
        }
    }
}

pub type LiveResult<T> = Result<T, LiveError>;

/// Error surfaced while resolving a single field.
///
/// Resolver failures are carried as-is so callers can downcast them back to
/// the handler's own error type.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error(transparent)]
    Live(#[from] LiveError),

    #[error(transparent)]
    Resolver(BoxError),
}

impl FieldError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FieldError::Live(LiveError::UnauthorizedSubscriber))
    }

    /// Borrow the resolver's error as its concrete type, if it is one.
    pub fn downcast_resolver<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            FieldError::Resolver(inner) => inner.downcast_ref::<E>(),
            FieldError::Live(_) => None,
        }
    }
}

pub type FieldResult<T> = Result<T, FieldError>;
