//! Normalized records returned by accessors and the raw query helper

use crate::types::GraphResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Property name to value mapping carried by every record
pub type Properties = BTreeMap<String, Value>;

/// One row of a raw query, keyed by column name
pub type Row = serde_json::Map<String, Value>;

/// Uniform view of a node regardless of which properties it carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i64,
    pub labels: Vec<String>,
    pub props: Properties,
}

impl NodeRecord {
    pub fn new(id: i64, labels: Vec<String>, props: Properties) -> Self {
        Self { id, labels, props }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.props.get(property)
    }
}

/// Uniform view of a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start_id: i64,
    pub end_id: i64,
    pub props: Properties,
}

impl RelationshipRecord {
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.props.get(property)
    }
}

/// (source, relationship, target) as returned by relationship accessors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTriple {
    pub source: NodeRecord,
    pub relationship: RelationshipRecord,
    pub target: NodeRecord,
}

impl From<EdgeTriple> for (NodeRecord, RelationshipRecord, NodeRecord) {
    fn from(triple: EdgeTriple) -> Self {
        (triple.source, triple.relationship, triple.target)
    }
}

/// Uniform JSON view of accessor results
pub fn normalize<T: Serialize>(records: &[T]) -> GraphResult<Value> {
    Ok(serde_json::to_value(records)?)
}

/// Parameterized Cypher text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CypherQuery {
    pub text: String,
    pub params: Properties,
}

impl CypherQuery {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            params: Properties::new(),
        }
    }

    pub fn param<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: Properties) -> Self {
        self.params.extend(params);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_record_serializes_uniformly() {
        let node = NodeRecord::new(
            7,
            vec!["Person".into()],
            Properties::from([("name".to_string(), json!("Ada"))]),
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"id": 7, "labels": ["Person"], "props": {"name": "Ada"}})
        );
        assert!(node.has_label("Person"));
        assert_eq!(node.get("name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_relationship_record_uses_type_key() {
        let rel = RelationshipRecord {
            id: 1,
            rel_type: "KNOWS".into(),
            start_id: 2,
            end_id: 3,
            props: Properties::new(),
        };
        let value = serde_json::to_value(&rel).unwrap();
        assert_eq!(value["type"], json!("KNOWS"));
    }

    #[test]
    fn test_normalize_edges() {
        let node = NodeRecord::new(1, vec!["Person".into()], Properties::new());
        let triple = EdgeTriple {
            source: node.clone(),
            relationship: RelationshipRecord {
                id: 3,
                rel_type: "KNOWS".into(),
                start_id: 1,
                end_id: 1,
                props: Properties::new(),
            },
            target: node,
        };
        let value = normalize(&[triple]).unwrap();
        assert_eq!(value[0]["relationship"]["type"], json!("KNOWS"));
        assert_eq!(value[0]["source"]["labels"], json!(["Person"]));
    }

    #[test]
    fn test_cypher_query_params() {
        let query = CypherQuery::new("RETURN $x AS x").param("x", 1);
        assert_eq!(query.params.get("x"), Some(&json!(1)));
    }
}
