//! Criterion benchmarks for graphql-live-core.
//!
//! Functions decorated with `#[pyfunction]` under the `python` feature are
//! still plain Rust functions, so everything here runs without a Python
//! runtime.
//!
//! ## Benchmark groups
//!
//! 1. **cursors**: global-id encode/decode.
//! 2. **naming**: type-name normalization and topic derivation.
//! 3. **registry**: subscriber append and topic lookup.
//! 4. **edges**: memoized edge shape lookup and connection paging.
//! 5. **broadcast**: sequential vs pooled delivery fan-out.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/graphql-live-core/Cargo.toml
//! # Run only the broadcast group:
//! cargo bench --manifest-path crates/graphql-live-core/Cargo.toml -- broadcast
//! ```

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

use graphql_live_core::config::LiveConfig;
use graphql_live_core::errors::BoxError;
use graphql_live_core::models::{Args, RequestContext, ResolveInfo, Subscriber, Topic};
use graphql_live_core::schema::connection::{Connection, ConnectionArgs};
use graphql_live_core::schema::edges::{normalize_type_name, ConnectionEdge, EdgeCatalog, EdgeRegistrar};
use graphql_live_core::schema::global_id::{decode_global_id, encode_global_id};
use graphql_live_core::schema::types::{FieldType, ObjectType, TypeRegistry};
use graphql_live_core::subscriptions::broadcaster::Broadcaster;
use graphql_live_core::subscriptions::handler::SubscriptionHandler;
use graphql_live_core::subscriptions::registry::SubscriptionRegistry;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct UserEdge;

impl ConnectionEdge for UserEdge {
    fn name(&self) -> String {
        "UserEdge".to_string()
    }

    fn node_type(&self) -> String {
        "User".to_string()
    }

    fn edge(&self, payload: &Value) -> Value {
        payload.clone()
    }

    fn cursor(&self, payload: &Value) -> String {
        payload["id"].to_string()
    }
}

struct Echo;

impl SubscriptionHandler for Echo {
    fn can(&self, _subscriber: &Subscriber) -> bool {
        true
    }

    fn resolve(
        &self,
        root: Option<&Value>,
        _args: &Args,
        _context: &RequestContext,
        _info: &ResolveInfo,
    ) -> Result<Value, BoxError> {
        Ok(root.cloned().unwrap_or(Value::Null))
    }
}

fn make_subscriber(field: &str) -> Arc<Subscriber> {
    Arc::new(Subscriber::initialize(
        None,
        Args::new(),
        RequestContext::anonymous(),
        ResolveInfo::new(field, "Subscription"),
        String::new(),
    ))
}

fn setup_registrar() -> EdgeRegistrar {
    let types = Arc::new(TypeRegistry::new());
    types.register(
        ObjectType::new("User")
            .field("id", FieldType::non_null(FieldType::scalar("ID")))
            .field("name", FieldType::scalar("String")),
    );
    let catalog = Arc::new(EdgeCatalog::new());
    catalog.register_as("UserEdge", Arc::new(UserEdge));
    EdgeRegistrar::new(catalog, types, &LiveConfig::default())
}

/// Registry with `n` subscribers on a single topic for `messageAdded`.
fn setup_broadcast(n: usize) -> Arc<SubscriptionRegistry> {
    let registry = Arc::new(SubscriptionRegistry::new());
    registry.register(Arc::new(Echo), "messageAdded");
    let topic = Topic::for_field("messageAdded");
    for _ in 0..n {
        registry.subscriber("messageAdded", make_subscriber("messageAdded"), topic.clone());
    }
    registry
}

// ---------------------------------------------------------------------------
// Benchmark: Cursors
// ---------------------------------------------------------------------------

fn bench_cursors(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursors");

    group.bench_function("encode_global_id", |b| {
        b.iter(|| encode_global_id(black_box("arrayconnection"), black_box("42")));
    });

    let cursor = encode_global_id("arrayconnection", "42");
    group.bench_function("decode_global_id", |b| {
        b.iter(|| decode_global_id(black_box(&cursor)));
    });

    group.bench_function("decode_global_id_malformed", |b| {
        b.iter(|| decode_global_id(black_box("not*base64")));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Naming
// ---------------------------------------------------------------------------

fn bench_naming(c: &mut Criterion) {
    let mut group = c.benchmark_group("naming");

    group.bench_function("normalize_short", |b| {
        b.iter(|| normalize_type_name(black_box("UserEdge")));
    });

    group.bench_function("normalize_qualified", |b| {
        b.iter(|| normalize_type_name(black_box("my_app::edges::HTTPRequestEdge<User>")));
    });

    group.bench_function("topic_for_field", |b| {
        b.iter(|| Topic::for_field(black_box("messageAdded")));
    });

    let payload = json!({"channel": "general", "author": {"id": 7, "name": "ada"}});
    group.bench_function("topic_digest", |b| {
        b.iter(|| Topic::digest(black_box("messageAdded"), black_box(&payload)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Registry
// ---------------------------------------------------------------------------

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    group.bench_function("append_subscriber", |b| {
        let registry = SubscriptionRegistry::new();
        let topic = Topic::new("channel.general");
        b.iter(|| {
            registry.subscriber("messageAdded", make_subscriber("messageAdded"), black_box(topic.clone()))
        });
    });

    for &n in &[10usize, 1_000] {
        let registry = setup_broadcast(n);
        let topic = Topic::for_field("messageAdded");
        group.bench_with_input(BenchmarkId::new("subscribers_for", n), &n, |b, _| {
            b.iter(|| registry.subscribers_for("messageAdded", black_box(&topic)));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Edges
// ---------------------------------------------------------------------------

fn bench_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("edges");

    let registrar = setup_registrar();
    registrar.instance("UserEdge", false, None).unwrap();
    group.bench_function("instance_cache_hit", |b| {
        b.iter(|| registrar.instance(black_box("UserEdge"), false, None));
    });

    group.bench_function("instance_fresh", |b| {
        b.iter(|| registrar.instance(black_box("UserEdge"), true, None));
    });

    let field = registrar.create_edge_field(Arc::new(UserEdge)).unwrap();
    let payloads: Vec<Value> = (0..500)
        .map(|i| json!({"id": i, "name": format!("user-{i}")}))
        .collect();
    let after = field.resolve(&payloads[250]).cursor;

    group.bench_function("connection_first_page", |b| {
        let args = ConnectionArgs::first(50);
        b.iter(|| Connection::from_payloads(&field, black_box(&payloads), &args));
    });

    group.bench_function("connection_after_cursor", |b| {
        let args = ConnectionArgs::first(50).after(&after);
        b.iter(|| Connection::from_payloads(&field, black_box(&payloads), &args));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Broadcast fan-out
// ---------------------------------------------------------------------------

fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");
    group.sample_size(20);

    let payload = json!({"text": "hello", "channel": "general"});
    for &n in &[10usize, 1_000] {
        let registry = setup_broadcast(n);

        let sequential = Broadcaster::new(
            Arc::clone(&registry),
            &LiveConfig {
                broadcast_parallel: false,
                ..LiveConfig::default()
            },
        );
        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, _| {
            b.iter(|| sequential.broadcast("messageAdded", black_box(&payload)));
        });

        let pooled = Broadcaster::new(Arc::clone(&registry), &LiveConfig::default());
        group.bench_with_input(BenchmarkId::new("pooled", n), &n, |b, _| {
            b.iter(|| pooled.broadcast("messageAdded", black_box(&payload)));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Register all benchmark groups
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_cursors,
    bench_naming,
    bench_registry,
    bench_edges,
    bench_broadcast,
);
criterion_main!(benches);
