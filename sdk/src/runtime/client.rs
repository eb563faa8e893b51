//! Client handle used by generated modules

use super::filter::PropertyFilter;
use crate::store::{
    ConnectionConfig, CypherQuery, EdgeTriple, GraphBackend, Neo4jBackend, NodeRecord,
    Properties, PropertyTypeProbe, Row,
};
use crate::types::GraphResult;
use std::sync::Arc;
use tracing::debug;

/// Cheaply clonable handle over a graph backend
#[derive(Clone)]
pub struct GraphClient {
    backend: Arc<dyn GraphBackend>,
}

impl GraphClient {
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self { backend }
    }

    pub fn from_backend<B: GraphBackend + 'static>(backend: B) -> Self {
        Self::new(Arc::new(backend))
    }

    /// Connect to a Neo4j store
    pub async fn connect(config: ConnectionConfig) -> GraphResult<Self> {
        let backend = Neo4jBackend::connect(config, PropertyTypeProbe::default()).await?;
        Ok(Self::from_backend(backend))
    }

    pub fn backend(&self) -> &Arc<dyn GraphBackend> {
        &self.backend
    }

    /// Every node with `label` matching `id` and `filter`, as normalized records
    pub async fn match_nodes(
        &self,
        label: &str,
        id: Option<i64>,
        filter: PropertyFilter,
    ) -> GraphResult<Vec<NodeRecord>> {
        debug!("Matching :{} id={:?} filters={}", label, id, filter.len());
        self.backend
            .match_nodes(label, id, filter.as_properties(), None)
            .await
    }

    /// Every relationship of `rel_type` matching `id` and `filter`, with its endpoints
    pub async fn match_edges(
        &self,
        rel_type: &str,
        id: Option<i64>,
        filter: PropertyFilter,
    ) -> GraphResult<Vec<EdgeTriple>> {
        debug!("Matching [:{}] id={:?} filters={}", rel_type, id, filter.len());
        self.backend
            .match_relationships(rel_type, id, filter.as_properties())
            .await
    }

    /// Run raw parameterized Cypher
    pub async fn execute_query(&self, text: &str, params: Properties) -> GraphResult<Vec<Row>> {
        self.backend
            .execute(CypherQuery::new(text).params(params))
            .await
    }

    pub async fn server_timestamp(&self) -> GraphResult<Option<String>> {
        self.backend.server_timestamp().await
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("backend", &self.backend.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryGraph;
    use serde_json::json;

    #[tokio::test]
    async fn test_match_nodes_and_edges() {
        let graph = MemoryGraph::new();
        let ada = graph.add_node(&["Person"], json!({"name": "Ada"})).await.unwrap();
        let bob = graph.add_node(&["Person"], json!({"name": "Bob"})).await.unwrap();
        graph
            .add_relationship(ada.id, bob.id, "KNOWS", json!({}))
            .await
            .unwrap();
        let client = GraphClient::from_backend(graph);

        let people = client
            .match_nodes("Person", None, PropertyFilter::new())
            .await
            .unwrap();
        assert_eq!(people.len(), 2);

        let bob_only = client
            .match_nodes("Person", Some(bob.id), PropertyFilter::new())
            .await
            .unwrap();
        assert_eq!(bob_only, vec![bob.clone()]);

        let edges = client
            .match_edges("KNOWS", None, PropertyFilter::new())
            .await
            .unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, ada);
        assert_eq!(edges[0].target, bob);
    }

    #[tokio::test]
    async fn test_server_timestamp_passthrough() {
        let client =
            GraphClient::from_backend(MemoryGraph::new().with_server_timestamp("2024-05-01T00:00:00Z"));
        assert_eq!(
            client.server_timestamp().await.unwrap().as_deref(),
            Some("2024-05-01T00:00:00Z")
        );
        assert!(format!("{:?}", client).contains("memory://graph"));
    }
}
