//! Graph store boundary: backend trait, records, Cypher builders and the Neo4j driver

pub mod backend;
pub mod cypher;
pub mod neo4j;
pub mod records;

pub use backend::GraphBackend;
pub use cypher::PropertyTypeProbe;
pub use neo4j::{ConnectionConfig, Neo4jBackend};
pub use records::{
    CypherQuery, EdgeTriple, NodeRecord, Properties, RelationshipRecord, Row, normalize,
};
