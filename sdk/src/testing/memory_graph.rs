// In-memory graph store for testing
use crate::runtime::coerce::{value_tag, values_equal};
use crate::store::{
    CypherQuery, EdgeTriple, GraphBackend, NodeRecord, Properties, RelationshipRecord, Row,
};
use crate::types::{GraphError, GraphResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct GraphState {
    // insertion order doubles as the store's traversal order
    nodes: Vec<NodeRecord>,
    relationships: Vec<RelationshipRecord>,
    next_id: i64,
}

impl GraphState {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn node(&self, id: i64) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// `GraphBackend` held entirely in memory.
///
/// Mirrors Neo4j semantics closely enough for pipeline tests: null properties
/// are never stored, equality filters on null match nothing, and numeric
/// filters compare by value across integer and float.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
    unreachable: AtomicBool,
    server_timestamp: Option<String>,
    canned: HashMap<String, Vec<Row>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report this timestamp from `server_timestamp`
    pub fn with_server_timestamp<T: Into<String>>(mut self, timestamp: T) -> Self {
        self.server_timestamp = Some(timestamp.into());
        self
    }

    /// Answer `execute` for exactly this query text with `rows`
    pub fn with_query_result<T: Into<String>>(mut self, text: T, rows: Vec<Row>) -> Self {
        self.canned.insert(text.into(), rows);
        self
    }

    /// Make every subsequent call fail with a Connection error
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> GraphResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(GraphError::connection("in-memory graph is unreachable"))
        } else {
            Ok(())
        }
    }

    /// Insert a node from a JSON object of properties
    pub async fn add_node(&self, labels: &[&str], props: Value) -> GraphResult<NodeRecord> {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        self.create_node(&labels, &object_properties(props)?).await
    }

    /// Insert a relationship from a JSON object of properties
    pub async fn add_relationship(
        &self,
        start_id: i64,
        end_id: i64,
        rel_type: &str,
        props: Value,
    ) -> GraphResult<RelationshipRecord> {
        self.create_relationship(start_id, end_id, rel_type, &object_properties(props)?)
            .await
    }

    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    pub async fn relationship_count(&self) -> usize {
        self.state.read().await.relationships.len()
    }
}

fn object_properties(props: Value) -> GraphResult<Properties> {
    match props {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(Properties::new()),
        other => Err(GraphError::query(format!(
            "Properties must be a map, got {}",
            value_tag(&other)
        ))),
    }
}

fn without_nulls(props: &Properties) -> Properties {
    props
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn matches(props: &Properties, filters: &Properties) -> bool {
    filters.iter().all(|(key, expected)| match props.get(key) {
        Some(actual) => !expected.is_null() && values_equal(actual, expected),
        None => false,
    })
}

fn distinct_property_types<'a>(
    entities: impl Iterator<Item = &'a Properties>,
) -> Vec<(String, String)> {
    let pairs: BTreeSet<(String, String)> = entities
        .flat_map(|props| {
            props
                .iter()
                .map(|(key, value)| (key.clone(), value_tag(value).to_string()))
        })
        .collect();
    pairs.into_iter().collect()
}

fn take(limit: Option<u64>) -> usize {
    limit.map(|l| l as usize).unwrap_or(usize::MAX)
}

#[async_trait]
impl GraphBackend for MemoryGraph {
    async fn labels(&self) -> GraphResult<Vec<String>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        let labels: BTreeSet<&String> = state.nodes.iter().flat_map(|n| n.labels.iter()).collect();
        Ok(labels.into_iter().cloned().collect())
    }

    async fn relationship_types(&self) -> GraphResult<Vec<String>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        let types: BTreeSet<&String> = state.relationships.iter().map(|r| &r.rel_type).collect();
        Ok(types.into_iter().cloned().collect())
    }

    async fn node_property_types(
        &self,
        label: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(String, String)>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        Ok(distinct_property_types(
            state
                .nodes
                .iter()
                .filter(|n| n.has_label(label))
                .take(take(sample_limit))
                .map(|n| &n.props),
        ))
    }

    async fn relationship_property_types(
        &self,
        rel_type: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(String, String)>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        Ok(distinct_property_types(
            state
                .relationships
                .iter()
                .filter(|r| r.rel_type == rel_type)
                .take(take(sample_limit))
                .map(|r| &r.props),
        ))
    }

    async fn relationship_endpoints(
        &self,
        rel_type: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(Vec<String>, Vec<String>)>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        let mut pairs = Vec::new();
        for rel in state
            .relationships
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .take(take(sample_limit))
        {
            if let (Some(start), Some(end)) = (state.node(rel.start_id), state.node(rel.end_id)) {
                let pair = (start.labels.clone(), end.labels.clone());
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        }
        Ok(pairs)
    }

    async fn server_timestamp(&self) -> GraphResult<Option<String>> {
        self.check_reachable()?;
        Ok(self.server_timestamp.clone())
    }

    async fn match_nodes(
        &self,
        label: &str,
        id: Option<i64>,
        filters: &Properties,
        limit: Option<u64>,
    ) -> GraphResult<Vec<NodeRecord>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        Ok(state
            .nodes
            .iter()
            .filter(|n| n.has_label(label))
            .filter(|n| id.is_none_or(|id| n.id == id))
            .filter(|n| matches(&n.props, filters))
            .take(take(limit))
            .cloned()
            .collect())
    }

    async fn match_relationships(
        &self,
        rel_type: &str,
        id: Option<i64>,
        filters: &Properties,
    ) -> GraphResult<Vec<EdgeTriple>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        let mut triples = Vec::new();
        for rel in state
            .relationships
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .filter(|r| id.is_none_or(|id| r.id == id))
            .filter(|r| matches(&r.props, filters))
        {
            if let (Some(source), Some(target)) = (state.node(rel.start_id), state.node(rel.end_id))
            {
                triples.push(EdgeTriple {
                    source: source.clone(),
                    relationship: rel.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(triples)
    }

    async fn create_node(
        &self,
        labels: &[String],
        properties: &Properties,
    ) -> GraphResult<NodeRecord> {
        self.check_reachable()?;
        let mut state = self.state.write().await;
        let mut seen = HashSet::new();
        let labels: Vec<String> = labels
            .iter()
            .filter(|label| seen.insert(label.as_str()))
            .cloned()
            .collect();
        let node = NodeRecord::new(state.allocate_id(), labels, without_nulls(properties));
        state.nodes.push(node.clone());
        Ok(node)
    }

    async fn update_nodes(
        &self,
        label: &str,
        filters: &Properties,
        updates: &Properties,
    ) -> GraphResult<Vec<NodeRecord>> {
        self.check_reachable()?;
        let mut state = self.state.write().await;
        let mut updated = Vec::new();
        for node in state
            .nodes
            .iter_mut()
            .filter(|n| n.has_label(label) && matches(&n.props, filters))
        {
            for (key, value) in updates {
                if value.is_null() {
                    node.props.remove(key);
                } else {
                    node.props.insert(key.clone(), value.clone());
                }
            }
            updated.push(node.clone());
        }
        Ok(updated)
    }

    async fn delete_nodes(
        &self,
        label: &str,
        filters: &Properties,
        detach: bool,
    ) -> GraphResult<u64> {
        self.check_reachable()?;
        let mut state = self.state.write().await;
        let doomed: Vec<i64> = state
            .nodes
            .iter()
            .filter(|n| n.has_label(label) && matches(&n.props, filters))
            .map(|n| n.id)
            .collect();

        let attached = |r: &RelationshipRecord| doomed.contains(&r.start_id) || doomed.contains(&r.end_id);
        if !detach {
            if let Some(rel) = state.relationships.iter().find(|r| attached(r)) {
                return Err(GraphError::query(format!(
                    "Cannot delete node {} because it still has relationships; use detach",
                    if doomed.contains(&rel.start_id) { rel.start_id } else { rel.end_id }
                )));
            }
        }

        state.relationships.retain(|r| !attached(r));
        state.nodes.retain(|n| !doomed.contains(&n.id));
        Ok(doomed.len() as u64)
    }

    async fn create_relationship(
        &self,
        start_id: i64,
        end_id: i64,
        rel_type: &str,
        properties: &Properties,
    ) -> GraphResult<RelationshipRecord> {
        self.check_reachable()?;
        let mut state = self.state.write().await;
        if state.node(start_id).is_none() || state.node(end_id).is_none() {
            return Err(GraphError::query(format!(
                "CREATE relationship between {} and {} returned no rows",
                start_id, end_id
            )));
        }
        let rel = RelationshipRecord {
            id: state.allocate_id(),
            rel_type: rel_type.to_string(),
            start_id,
            end_id,
            props: without_nulls(properties),
        };
        state.relationships.push(rel.clone());
        Ok(rel)
    }

    async fn delete_relationships(
        &self,
        rel_type: &str,
        filters: &Properties,
    ) -> GraphResult<u64> {
        self.check_reachable()?;
        let mut state = self.state.write().await;
        let before = state.relationships.len();
        state
            .relationships
            .retain(|r| !(r.rel_type == rel_type && matches(&r.props, filters)));
        Ok((before - state.relationships.len()) as u64)
    }

    async fn execute(&self, query: CypherQuery) -> GraphResult<Vec<Row>> {
        self.check_reachable()?;
        match self.canned.get(&query.text) {
            Some(rows) => Ok(rows.clone()),
            None => Err(GraphError::query(format!(
                "in-memory graph cannot run Cypher: {}",
                query.text
            ))),
        }
    }

    fn describe(&self) -> String {
        "memory://graph".to_string()
    }
}
