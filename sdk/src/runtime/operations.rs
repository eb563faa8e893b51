//! Schema-independent write and lookup operations available to every generated module

use super::client::GraphClient;
use super::filter::PropertyFilter;
use crate::store::{NodeRecord, Properties, RelationshipRecord};
use crate::types::GraphResult;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait DatabaseOperations {
    /// Create a node with `labels` and `properties`
    async fn create_node(&self, labels: &[&str], properties: Properties) -> GraphResult<NodeRecord>;

    /// Merge `updates` into every `label` node matching `filter`
    async fn update_nodes(
        &self,
        label: &str,
        filter: PropertyFilter,
        updates: Properties,
    ) -> GraphResult<Vec<NodeRecord>>;

    /// Delete matching nodes; `detach` also removes their relationships
    async fn delete_nodes(&self, label: &str, filter: PropertyFilter, detach: bool)
    -> GraphResult<u64>;

    async fn create_relationship(
        &self,
        start_id: i64,
        end_id: i64,
        rel_type: &str,
        properties: Properties,
    ) -> GraphResult<RelationshipRecord>;

    async fn delete_relationships(&self, rel_type: &str, filter: PropertyFilter)
    -> GraphResult<u64>;

    /// Nodes with `label` matching `filter`, at most `limit` of them
    async fn find_nodes(
        &self,
        label: &str,
        filter: PropertyFilter,
        limit: Option<u64>,
    ) -> GraphResult<Vec<NodeRecord>>;
}

#[async_trait]
impl DatabaseOperations for GraphClient {
    async fn create_node(&self, labels: &[&str], properties: Properties) -> GraphResult<NodeRecord> {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let node = self.backend().create_node(&labels, &properties).await?;
        info!("Created node {} {:?}", node.id, node.labels);
        Ok(node)
    }

    async fn update_nodes(
        &self,
        label: &str,
        filter: PropertyFilter,
        updates: Properties,
    ) -> GraphResult<Vec<NodeRecord>> {
        let nodes = self
            .backend()
            .update_nodes(label, filter.as_properties(), &updates)
            .await?;
        info!("Updated {} :{} node(s)", nodes.len(), label);
        Ok(nodes)
    }

    async fn delete_nodes(
        &self,
        label: &str,
        filter: PropertyFilter,
        detach: bool,
    ) -> GraphResult<u64> {
        let deleted = self
            .backend()
            .delete_nodes(label, filter.as_properties(), detach)
            .await?;
        info!("Deleted {} :{} node(s)", deleted, label);
        Ok(deleted)
    }

    async fn create_relationship(
        &self,
        start_id: i64,
        end_id: i64,
        rel_type: &str,
        properties: Properties,
    ) -> GraphResult<RelationshipRecord> {
        let rel = self
            .backend()
            .create_relationship(start_id, end_id, rel_type, &properties)
            .await?;
        info!("Created [:{}] {} ({} -> {})", rel_type, rel.id, start_id, end_id);
        Ok(rel)
    }

    async fn delete_relationships(
        &self,
        rel_type: &str,
        filter: PropertyFilter,
    ) -> GraphResult<u64> {
        let deleted = self
            .backend()
            .delete_relationships(rel_type, filter.as_properties())
            .await?;
        info!("Deleted {} [:{}] relationship(s)", deleted, rel_type);
        Ok(deleted)
    }

    async fn find_nodes(
        &self,
        label: &str,
        filter: PropertyFilter,
        limit: Option<u64>,
    ) -> GraphResult<Vec<NodeRecord>> {
        self.backend()
            .match_nodes(label, None, filter.as_properties(), limit)
            .await
    }
}
