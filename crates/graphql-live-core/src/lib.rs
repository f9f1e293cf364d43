//! graphql-live core library: live GraphQL subscriptions and Relay edges.
//!
//! Two independent halves share the error, model and config layers:
//!
//! - [`subscriptions`]: the `@subscription` directive, its handshake and
//!   delivery paths, the topic registry and the broadcast fan-out.
//! - [`schema`]: Relay-style connection edges, the memoized edge type
//!   registrar and opaque base64 global-id cursors.
//!
//! With the `python` feature the crate also builds as an extension module
//! (`graphql_live_core`) exposing the cursor and naming helpers.

pub mod config;
pub mod errors;
pub mod models;
pub mod schema;
pub mod subscriptions;

pub use config::LiveConfig;
pub use errors::{BoxError, FieldError, FieldResult, LiveError, LiveResult};
pub use models::{Args, RequestContext, ResolveInfo, Subscriber, SubscriptionField, Topic};
pub use schema::edges::{ConnectionEdge, EdgeCatalog, EdgeField, EdgeRegistrar};
pub use subscriptions::broadcaster::{Broadcaster, DeliveryOutcome};
pub use subscriptions::directive::{ResolutionKind, SubscriptionDirective, SubscriptionResolver};
pub use subscriptions::handler::{HandlerTable, SubscriptionHandler};
pub use subscriptions::registry::SubscriptionRegistry;

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::wrap_pyfunction;

// ---------------------------------------------------------------------------
// Top-level Python module: graphql_live_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn graphql_live_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // -- Connection guards ----------------------------------------------------
    m.add("DEFAULT_PAGE_SIZE", schema::guards::DEFAULT_PAGE_SIZE)?;
    m.add("MAX_PAGE_SIZE", schema::guards::MAX_PAGE_SIZE)?;
    m.add("DEFAULT_CURSOR_TYPE", config::DEFAULT_CURSOR_TYPE)?;
    m.add_function(wrap_pyfunction!(schema::guards::clamp_page_size, m)?)?;

    // -- Cursors ------------------------------------------------------------
    m.add_function(wrap_pyfunction!(schema::global_id::encode_global_id, m)?)?;
    m.add_function(wrap_pyfunction!(schema::global_id::decode_global_id, m)?)?;

    // -- Naming -------------------------------------------------------------
    m.add_function(wrap_pyfunction!(schema::edges::normalize_type_name, m)?)?;

    Ok(())
}
