//! Neo4j backend over the `neo4rs` driver

use super::backend::GraphBackend;
use super::cypher::{self, PropertyTypeProbe};
use super::records::{CypherQuery, EdgeTriple, NodeRecord, Properties, RelationshipRecord, Row};
use crate::types::{GraphError, GraphResult};
use async_trait::async_trait;
use neo4rs::{BoltType, ConfigBuilder, Graph, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_USERNAME: &str = "neo4j";
pub const DEFAULT_DATABASE: &str = "neo4j";
pub const PASSWORD_ENV: &str = "NEO4J_PASSWORD";

/// Connection settings, passed by value into the pipeline
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub uri: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub database: String,
}

impl ConnectionConfig {
    pub fn new<U: Into<String>, N: Into<String>, P: Into<String>, D: Into<String>>(
        uri: U,
        username: N,
        password: P,
        database: D,
    ) -> Self {
        Self {
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Check the settings are usable before any connection attempt
    pub fn validate(&self) -> GraphResult<()> {
        if self.uri.trim().is_empty() {
            return Err(GraphError::configuration("Store URI cannot be empty"));
        }
        if !self.uri.contains("://") {
            return Err(GraphError::configuration(format!(
                "Store URI '{}' is missing a scheme (e.g. bolt://, neo4j://)",
                self.uri
            )));
        }
        if self.username.trim().is_empty() {
            return Err(GraphError::configuration("Username cannot be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(GraphError::configuration("Database name cannot be empty"));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URI, DEFAULT_USERNAME, "", DEFAULT_DATABASE)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"********")
            .field("database", &self.database)
            .finish()
    }
}

/// Live Neo4j store
pub struct Neo4jBackend {
    graph: Arc<Graph>,
    config: ConnectionConfig,
    probe: PropertyTypeProbe,
}

impl Neo4jBackend {
    /// Open a connection pool and verify the store answers
    pub async fn connect(config: ConnectionConfig, probe: PropertyTypeProbe) -> GraphResult<Self> {
        config.validate()?;
        info!("Connecting to {} (database '{}')", config.uri, config.database);

        let driver_config = ConfigBuilder::new()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .build()
            .map_err(|e| GraphError::configuration(e.to_string()))?;

        let graph = Graph::connect(driver_config).await?;
        graph.run(neo4rs::query("RETURN 1")).await?;
        debug!("Connected to {}", config.uri);

        Ok(Self {
            graph: Arc::new(graph),
            config,
            probe,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn fetch(&self, query: CypherQuery) -> GraphResult<Vec<neo4rs::Row>> {
        debug!("Executing: {}", query.text);
        let query = to_driver_query(query)?;
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn fetch_property_types(&self, text: String) -> GraphResult<Vec<(String, String)>> {
        let rows = self.fetch(CypherQuery::new(text)).await?;
        rows.iter()
            .map(|row| Ok((row.get::<String>("key")?, row.get::<String>("type")?)))
            .collect()
    }

    async fn fetch_count(&self, query: CypherQuery) -> GraphResult<u64> {
        let rows = self.fetch(query).await?;
        match rows.first() {
            Some(row) => Ok(row.get::<i64>("deleted")?.max(0) as u64),
            None => Ok(0),
        }
    }
}

fn to_driver_query(query: CypherQuery) -> GraphResult<Query> {
    let mut driver_query = neo4rs::query(&query.text);
    for (key, value) in query.params {
        driver_query = driver_query.param(&key, BoltType::try_from(value)?);
    }
    Ok(driver_query)
}

fn node_record(node: &neo4rs::Node) -> GraphResult<NodeRecord> {
    let mut props = Properties::new();
    for key in node.keys() {
        props.insert(key.to_string(), node.get::<Value>(key)?);
    }
    Ok(NodeRecord::new(
        node.id(),
        node.labels().into_iter().map(str::to_string).collect(),
        props,
    ))
}

fn relationship_record(rel: &neo4rs::Relation) -> GraphResult<RelationshipRecord> {
    let mut props = Properties::new();
    for key in rel.keys() {
        props.insert(key.to_string(), rel.get::<Value>(key)?);
    }
    Ok(RelationshipRecord {
        id: rel.id(),
        rel_type: rel.typ().to_string(),
        start_id: rel.start_node_id(),
        end_id: rel.end_node_id(),
        props,
    })
}

fn single<T>(mut records: Vec<T>, what: &str) -> GraphResult<T> {
    match records.pop() {
        Some(record) => Ok(record),
        None => Err(GraphError::query(format!("{} returned no rows", what))),
    }
}

#[async_trait]
impl GraphBackend for Neo4jBackend {
    async fn labels(&self) -> GraphResult<Vec<String>> {
        let rows = self.fetch(CypherQuery::new(cypher::LIST_LABELS)).await?;
        rows.iter()
            .map(|row| Ok(row.get::<String>("label")?))
            .collect()
    }

    async fn relationship_types(&self) -> GraphResult<Vec<String>> {
        let rows = self
            .fetch(CypherQuery::new(cypher::LIST_RELATIONSHIP_TYPES))
            .await?;
        rows.iter()
            .map(|row| Ok(row.get::<String>("relationshipType")?))
            .collect()
    }

    async fn node_property_types(
        &self,
        label: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(String, String)>> {
        self.fetch_property_types(cypher::node_property_types(label, self.probe, sample_limit))
            .await
    }

    async fn relationship_property_types(
        &self,
        rel_type: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(String, String)>> {
        self.fetch_property_types(cypher::relationship_property_types(
            rel_type,
            self.probe,
            sample_limit,
        ))
        .await
    }

    async fn relationship_endpoints(
        &self,
        rel_type: &str,
        sample_limit: Option<u64>,
    ) -> GraphResult<Vec<(Vec<String>, Vec<String>)>> {
        let rows = self
            .fetch(CypherQuery::new(cypher::relationship_endpoints(
                rel_type,
                sample_limit,
            )))
            .await?;
        rows.iter()
            .map(|row| {
                Ok((
                    row.get::<Vec<String>>("start_labels")?,
                    row.get::<Vec<String>>("end_labels")?,
                ))
            })
            .collect()
    }

    async fn server_timestamp(&self) -> GraphResult<Option<String>> {
        let rows = self.fetch(CypherQuery::new(cypher::SERVER_TIMESTAMP)).await?;
        match rows.first() {
            Some(row) => Ok(Some(row.get::<String>("timestamp")?)),
            None => Ok(None),
        }
    }

    async fn match_nodes(
        &self,
        label: &str,
        id: Option<i64>,
        filters: &Properties,
        limit: Option<u64>,
    ) -> GraphResult<Vec<NodeRecord>> {
        let rows = self
            .fetch(cypher::match_nodes(label, id, filters, limit))
            .await?;
        rows.iter()
            .map(|row| node_record(&row.get::<neo4rs::Node>("n")?))
            .collect()
    }

    async fn match_relationships(
        &self,
        rel_type: &str,
        id: Option<i64>,
        filters: &Properties,
    ) -> GraphResult<Vec<EdgeTriple>> {
        let rows = self
            .fetch(cypher::match_relationships(rel_type, id, filters))
            .await?;
        rows.iter()
            .map(|row| {
                Ok(EdgeTriple {
                    source: node_record(&row.get::<neo4rs::Node>("source")?)?,
                    relationship: relationship_record(&row.get::<neo4rs::Relation>("r")?)?,
                    target: node_record(&row.get::<neo4rs::Node>("target")?)?,
                })
            })
            .collect()
    }

    async fn create_node(
        &self,
        labels: &[String],
        properties: &Properties,
    ) -> GraphResult<NodeRecord> {
        let rows = self.fetch(cypher::create_node(labels, properties)).await?;
        let nodes = rows
            .iter()
            .map(|row| node_record(&row.get::<neo4rs::Node>("n")?))
            .collect::<GraphResult<Vec<_>>>()?;
        single(nodes, "CREATE node")
    }

    async fn update_nodes(
        &self,
        label: &str,
        filters: &Properties,
        updates: &Properties,
    ) -> GraphResult<Vec<NodeRecord>> {
        let rows = self
            .fetch(cypher::update_nodes(label, filters, updates))
            .await?;
        rows.iter()
            .map(|row| node_record(&row.get::<neo4rs::Node>("n")?))
            .collect()
    }

    async fn delete_nodes(
        &self,
        label: &str,
        filters: &Properties,
        detach: bool,
    ) -> GraphResult<u64> {
        self.fetch_count(cypher::delete_nodes(label, filters, detach))
            .await
    }

    async fn create_relationship(
        &self,
        start_id: i64,
        end_id: i64,
        rel_type: &str,
        properties: &Properties,
    ) -> GraphResult<RelationshipRecord> {
        let rows = self
            .fetch(cypher::create_relationship(
                start_id, end_id, rel_type, properties,
            ))
            .await?;
        let rels = rows
            .iter()
            .map(|row| relationship_record(&row.get::<neo4rs::Relation>("r")?))
            .collect::<GraphResult<Vec<_>>>()?;
        single(
            rels,
            &format!("CREATE relationship between {} and {}", start_id, end_id),
        )
    }

    async fn delete_relationships(
        &self,
        rel_type: &str,
        filters: &Properties,
    ) -> GraphResult<u64> {
        self.fetch_count(cypher::delete_relationships(rel_type, filters))
            .await
    }

    async fn execute(&self, query: CypherQuery) -> GraphResult<Vec<Row>> {
        let rows = self.fetch(query).await?;
        rows.iter().map(|row| Ok(row.to::<Row>()?)).collect()
    }

    fn describe(&self) -> String {
        format!("{} (database '{}')", self.config.uri, self.config.database)
    }
}
