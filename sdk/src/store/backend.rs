//! Graph store abstraction shared by the introspector and generated modules

use super::records::{CypherQuery, EdgeTriple, NodeRecord, Properties, RelationshipRecord, Row};
use crate::types::GraphResult;
use async_trait::async_trait;

/// Everything the pipeline and the runtime need from a graph store.
///
/// Introspection methods return raw type tags as reported by the store; tag
/// parsing happens in the introspector so all backends share one type table.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// All node labels in use
    async fn labels(&self) -> GraphResult<Vec<String>>;

    /// All relationship types in use
    async fn relationship_types(&self) -> GraphResult<Vec<String>>;

    /// Distinct (property, raw type tag) pairs across up to `sample_limit` nodes
    async fn node_property_types(
        &self,
        label: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(String, String)>>;

    /// Distinct (property, raw type tag) pairs across up to `sample_limit` relationships
    async fn relationship_property_types(
        &self,
        rel_type: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(String, String)>>;

    /// Distinct (start labels, end labels) pairs across up to `sample_limit` relationships
    async fn relationship_endpoints(
        &self,
        rel_type: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(Vec<String>, Vec<String>)>>;

    /// Store clock, when the store can report one
    async fn server_timestamp(&self) -> GraphResult<Option<String>>;

    /// Nodes carrying `label` that match the identity and every filter
    async fn match_nodes(
        &self,
        label: &str,
        id: Option<i64>,
        filters: &Properties,
        limit: Option<u64>,
    ) -> GraphResult<Vec<NodeRecord>>;

    /// Relationships of `rel_type` matching the identity and every filter,
    /// with their endpoints
    async fn match_relationships(
        &self,
        rel_type: &str,
        id: Option<i64>,
        filters: &Properties,
    ) -> GraphResult<Vec<EdgeTriple>>;

    async fn create_node(&self, labels: &[String], properties: &Properties)
    -> GraphResult<NodeRecord>;

    /// Merge `updates` into every matching node
    async fn update_nodes(
        &self,
        label: &str,
        filters: &Properties,
        updates: &Properties,
    ) -> GraphResult<Vec<NodeRecord>>;

    /// Delete matching nodes, returning how many were removed. Without
    /// `detach`, deleting a node that still has relationships is a Query error.
    async fn delete_nodes(&self, label: &str, filters: &Properties, detach: bool)
    -> GraphResult<u64>;

    async fn create_relationship(
        &self,
        start_id: i64,
        end_id: i64,
        rel_type: &str,
        properties: &Properties,
    ) -> GraphResult<RelationshipRecord>;

    async fn delete_relationships(&self, rel_type: &str, filters: &Properties)
    -> GraphResult<u64>;

    /// Run arbitrary parameterized Cypher
    async fn execute(&self, query: CypherQuery) -> GraphResult<Vec<Row>>;

    /// Short description of the store for logs and generated headers
    fn describe(&self) -> String;
}
