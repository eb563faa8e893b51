//! Graph module `movies` generated from the store schema
//!
//! Generated at: 2024-05-01T12:00:00Z
//! Source: bolt://localhost:7687 (database 'neo4j')
//! Generator: graphmod 0.1.0
//! Driver: neo4rs
//!
//! This file is auto-generated. Do not edit manually.

use graphmod_sdk::schema::SchemaSnapshot;
pub use graphmod_sdk::runtime::{DatabaseOperations, GraphClient, PropertyFilter};
pub use graphmod_sdk::store::{ConnectionConfig, EdgeTriple, NodeRecord, Properties, Row};
pub use graphmod_sdk::types::{GraphError, GraphResult, StoreType};

pub const URI: &str = "bolt://localhost:7687";
pub const USERNAME: &str = "neo4j";
pub const DATABASE: &str = "neo4j";
/// Environment variable the password is read from
pub const PASSWORD_ENV: &str = "NEO4J_PASSWORD";

/// Connection settings recorded at generation time, with the password taken from `PASSWORD_ENV`
pub fn connection_config() -> ConnectionConfig {
    let password = std::env::var(PASSWORD_ENV).unwrap_or_default();
    ConnectionConfig::new(URI, USERNAME, password, DATABASE)
}

/// Connect to the store this module was generated from
pub async fn connect() -> GraphResult<GraphClient> {
    GraphClient::connect(connection_config()).await
}

/// Run parameterized Cypher and return raw rows
pub async fn execute_query(client: &GraphClient, text: &str, params: Properties) -> GraphResult<Vec<Row>> {
    client.execute_query(text, params).await
}

/// Current store clock
pub async fn server_timestamp(client: &GraphClient) -> GraphResult<Option<String>> {
    client.server_timestamp().await
}

/// Uniform JSON view of node records
pub fn normalize_nodes(records: &[NodeRecord]) -> GraphResult<graphmod_sdk::serde_json::Value> {
    graphmod_sdk::store::normalize(records)
}

/// Uniform JSON view of (source, relationship, target) triples
pub fn normalize_edges(records: &[EdgeTriple]) -> GraphResult<graphmod_sdk::serde_json::Value> {
    graphmod_sdk::store::normalize(records)
}

pub const LABELS: &[&str] = &["Person", "Category"];

pub const RELATIONSHIP_TYPES: &[&str] = &["KNOWS"];

/// Schema snapshot this module was generated from
pub const SCHEMA_JSON: &str = r#"{
  "labels": [
    {
      "name": "Person",
      "kind": "node",
      "properties": {
        "age": {
          "name": "age",
          "types": [
            "INTEGER"
          ]
        },
        "name": {
          "name": "name",
          "types": [
            "STRING"
          ]
        },
        "tags": {
          "name": "tags",
          "types": [
            "LIST"
          ]
        }
      }
    },
    {
      "name": "Category",
      "kind": "node",
      "properties": {}
    }
  ],
  "relationship_types": [
    {
      "name": "KNOWS",
      "kind": "relationship",
      "properties": {
        "since": {
          "name": "since",
          "types": [
            "INTEGER"
          ]
        }
      },
      "endpoints": [
        {
          "start_labels": [
            "Person"
          ],
          "end_labels": [
            "Person"
          ]
        }
      ]
    }
  ]
}"#;

/// Parse the embedded schema snapshot
pub fn schema() -> GraphResult<SchemaSnapshot> {
    SchemaSnapshot::from_json(SCHEMA_JSON)
}

/// Accessors, one per node label
pub mod nodes {
    #[allow(unused_imports)]
    use super::{EdgeTriple, GraphClient, GraphResult, NodeRecord, PropertyFilter, StoreType};

    /// Accessor for label `Person`.
    ///
    /// Properties:
    /// - `age`: `i64` (INTEGER)
    /// - `name`: `String` (STRING)
    /// - `tags`: `serde_json::Value` (LIST, unvalidated)
    ///
    /// Query template: MATCH (n:`Person`) RETURN n
    pub async fn person(client: &GraphClient, id: Option<i64>, mut filter: PropertyFilter) -> GraphResult<Vec<NodeRecord>> {
        filter.coerce("Person", "age", &[StoreType::Integer])?;
        filter.coerce("Person", "name", &[StoreType::String])?;
        client.match_nodes("Person", id, filter).await
    }

    /// Accessor for label `Category`.
    ///
    /// No properties were observed.
    ///
    /// Query template: MATCH (n:`Category`) RETURN n
    pub async fn category(client: &GraphClient, id: Option<i64>, filter: PropertyFilter) -> GraphResult<Vec<NodeRecord>> {
        client.match_nodes("Category", id, filter).await
    }
}

/// Accessors, one per relationship type
pub mod edges {
    #[allow(unused_imports)]
    use super::{EdgeTriple, GraphClient, GraphResult, NodeRecord, PropertyFilter, StoreType};

    /// Accessor for relationship type `KNOWS`.
    ///
    /// Properties:
    /// - `since`: `i64` (INTEGER)
    ///
    /// Observed endpoints:
    /// - (:Person)->(:Person)
    ///
    /// Query template: MATCH (source)-[r:`KNOWS`]->(target) RETURN source, r, target
    pub async fn knows(client: &GraphClient, id: Option<i64>, mut filter: PropertyFilter) -> GraphResult<Vec<EdgeTriple>> {
        filter.coerce("KNOWS", "since", &[StoreType::Integer])?;
        client.match_edges("KNOWS", id, filter).await
    }
}
