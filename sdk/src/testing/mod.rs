//! Testing support for generated graph modules
//!
//! [`MemoryGraph`] implements [`GraphBackend`](crate::store::GraphBackend)
//! over an in-memory property graph, so introspection, generation and
//! generated accessors can be exercised without a running Neo4j server.
//!
//! ```rust
//! use graphmod_sdk::testing::MemoryGraph;
//! use graphmod_sdk::runtime::GraphClient;
//! use serde_json::json;
//!
//! # async fn demo() -> graphmod_sdk::types::GraphResult<()> {
//! let graph = MemoryGraph::new();
//! graph.add_node(&["Person"], json!({"name": "Ada"})).await?;
//! let client = GraphClient::from_backend(graph);
//! # Ok(())
//! # }
//! ```

pub mod memory_graph;

pub use memory_graph::MemoryGraph;
