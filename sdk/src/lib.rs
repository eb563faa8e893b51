//! Schema-driven Rust modules for Neo4j graphs
//!
//! The SDK introspects a live graph store, models what it finds as a
//! [`SchemaSnapshot`](schema::SchemaSnapshot), and emits a single Rust module
//! with one typed accessor per label and per relationship type. Generated
//! modules link back against [`runtime`] for querying and value coercion.

pub mod codegen;
pub mod introspect;
pub mod runtime;
pub mod schema;
pub mod store;
pub mod testing;
pub mod types;

// Generated modules reference `graphmod_sdk::serde_json`
pub use serde_json;

// Re-export async_trait macro for convenience
pub use async_trait::async_trait;

pub use codegen::{
    AccessorSet, CodegenResult, GenerationOptions, ModuleEmitter, ModuleGenerator, extract_schema,
};
pub use introspect::SchemaIntrospector;
pub use runtime::{DatabaseOperations, GraphClient, PropertyFilter};
pub use schema::{EntityKind, EntitySchema, PropertySpec, SchemaDiff, SchemaSnapshot};
pub use store::{
    ConnectionConfig, EdgeTriple, GraphBackend, Neo4jBackend, NodeRecord, Properties,
    PropertyTypeProbe,
};
pub use testing::MemoryGraph;
pub use types::{GraphError, GraphResult, StoreType};

/// Initialize logging based on debug flag.
///
/// `RUST_LOG` takes precedence when set. A subscriber installed earlier is
/// left in place.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()),
        )
        .with_target(false)
        .with_thread_ids(debug)
        .with_line_number(debug)
        .with_file(debug)
        .with_writer(std::io::stderr)
        .try_init();
}
