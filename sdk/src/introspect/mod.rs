//! Schema introspection: turns store metadata into a [`SchemaSnapshot`]

use crate::schema::{EndpointPair, EntitySchema, PropertySpec, SchemaSnapshot};
use crate::store::GraphBackend;
use crate::types::{GraphResult, StoreType};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Runs the fixed introspection queries against a backend.
///
/// Queries run sequentially, one per label and per relationship type. Any
/// failure aborts the pass.
pub struct SchemaIntrospector<'a> {
    backend: &'a dyn GraphBackend,
    sample_limit: Option<u64>,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(backend: &'a dyn GraphBackend) -> Self {
        Self {
            backend,
            sample_limit: None,
        }
    }

    /// Bound the number of entities scanned per label or relationship type
    pub fn with_sample_limit(mut self, sample_limit: Option<u64>) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    /// All distinct node labels in use
    pub async fn list_labels(&self) -> GraphResult<Vec<String>> {
        Ok(dedup(self.backend.labels().await?))
    }

    /// Property name to observed tags across sampled nodes of `label`.
    /// An unknown label yields an empty map.
    pub async fn properties_for_label(
        &self,
        label: &str,
    ) -> GraphResult<BTreeMap<String, PropertySpec>> {
        let pairs = self
            .backend
            .node_property_types(label, self.sample_limit)
            .await?;
        Ok(collect_properties(pairs))
    }

    /// All distinct relationship types in use
    pub async fn list_relationship_types(&self) -> GraphResult<Vec<String>> {
        Ok(dedup(self.backend.relationship_types().await?))
    }

    /// Property name to observed tags across sampled relationships of `rel_type`
    pub async fn properties_for_relationship_type(
        &self,
        rel_type: &str,
    ) -> GraphResult<BTreeMap<String, PropertySpec>> {
        let pairs = self
            .backend
            .relationship_property_types(rel_type, self.sample_limit)
            .await?;
        Ok(collect_properties(pairs))
    }

    /// (start labels, end labels) combinations observed for `rel_type`
    pub async fn endpoint_labels_for_type(
        &self,
        rel_type: &str,
    ) -> GraphResult<BTreeSet<EndpointPair>> {
        let pairs = self
            .backend
            .relationship_endpoints(rel_type, self.sample_limit)
            .await?;
        Ok(pairs
            .into_iter()
            .map(|(start, end)| EndpointPair::new(start, end))
            .collect())
    }

    /// Full introspection pass
    pub async fn snapshot(&self) -> GraphResult<SchemaSnapshot> {
        info!("Introspecting {}", self.backend.describe());
        let mut snapshot = SchemaSnapshot::new();

        let labels = self.list_labels().await?;
        info!("Found {} label(s)", labels.len());
        for label in labels {
            let mut entity = EntitySchema::node(label.as_str());
            entity.properties = self.properties_for_label(&label).await?;
            debug!("Label {} has {} propert(ies)", label, entity.properties.len());
            snapshot.add_label(entity);
        }

        let rel_types = self.list_relationship_types().await?;
        info!("Found {} relationship type(s)", rel_types.len());
        for rel_type in rel_types {
            let mut entity = EntitySchema::relationship(rel_type.as_str());
            entity.properties = self.properties_for_relationship_type(&rel_type).await?;
            entity.endpoints = self.endpoint_labels_for_type(&rel_type).await?;
            debug!(
                "Relationship type {} has {} propert(ies) and {} endpoint pair(s)",
                rel_type,
                entity.properties.len(),
                entity.endpoints.len()
            );
            snapshot.add_relationship_type(entity);
        }

        Ok(snapshot)
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn collect_properties(pairs: Vec<(String, String)>) -> BTreeMap<String, PropertySpec> {
    let mut properties: BTreeMap<String, PropertySpec> = BTreeMap::new();
    for (name, raw_tag) in pairs {
        properties
            .entry(name.clone())
            .or_insert_with(|| PropertySpec::new(name))
            .observe(StoreType::parse(&raw_tag));
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryGraph;
    use crate::types::GraphError;
    use serde_json::json;

    async fn movies() -> MemoryGraph {
        let graph = MemoryGraph::new();
        let keanu = graph
            .add_node(&["Person"], json!({"name": "Keanu", "born": 1964}))
            .await
            .unwrap();
        let matrix = graph
            .add_node(&["Movie"], json!({"title": "The Matrix", "released": 1999}))
            .await
            .unwrap();
        graph.add_node(&["Category"], json!({})).await.unwrap();
        graph
            .add_relationship(keanu.id, matrix.id, "ACTED_IN", json!({"roles": ["Neo"]}))
            .await
            .unwrap();
        graph
    }

    #[tokio::test]
    async fn test_snapshot_collects_everything() {
        let graph = movies().await;
        let snapshot = SchemaIntrospector::new(&graph).snapshot().await.unwrap();

        assert_eq!(snapshot.label_names(), vec!["Category", "Movie", "Person"]);
        assert_eq!(snapshot.relationship_type_names(), vec!["ACTED_IN"]);

        let person = snapshot.label("Person").unwrap();
        assert_eq!(person.property("born").unwrap().types, BTreeSet::from([StoreType::Integer]));
        assert!(snapshot.label("Category").unwrap().properties.is_empty());

        let acted_in = snapshot.relationship_type("ACTED_IN").unwrap();
        assert_eq!(acted_in.property("roles").unwrap().types, BTreeSet::from([StoreType::List]));
        assert_eq!(
            acted_in.endpoints,
            BTreeSet::from([EndpointPair::new(vec!["Person".into()], vec!["Movie".into()])])
        );
    }

    #[tokio::test]
    async fn test_unknown_label_is_empty() {
        let graph = movies().await;
        let introspector = SchemaIntrospector::new(&graph);
        assert!(introspector.properties_for_label("Nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_types_are_unioned() {
        let graph = MemoryGraph::new();
        graph.add_node(&["Person"], json!({"age": 36})).await.unwrap();
        graph.add_node(&["Person"], json!({"age": "old"})).await.unwrap();

        let introspector = SchemaIntrospector::new(&graph);
        let props = introspector.properties_for_label("Person").await.unwrap();
        assert_eq!(
            props["age"].types,
            BTreeSet::from([StoreType::String, StoreType::Integer])
        );

        let sampled = introspector
            .with_sample_limit(Some(1))
            .properties_for_label("Person")
            .await
            .unwrap();
        assert_eq!(sampled["age"].types, BTreeSet::from([StoreType::Integer]));
    }

    #[tokio::test]
    async fn test_connection_failure_aborts() {
        let graph = movies().await;
        graph.set_unreachable(true);
        let err = SchemaIntrospector::new(&graph).snapshot().await.unwrap_err();
        assert!(matches!(err, GraphError::Connection { .. }));
    }
}
