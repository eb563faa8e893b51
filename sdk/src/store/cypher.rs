//! Cypher text for introspection, matching and writes.
//!
//! Every label, relationship type and property name is backtick-escaped and
//! every value travels as a parameter, so names with spaces, dashes or quotes
//! never alter the query structure.

use super::records::{CypherQuery, Properties};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const LIST_LABELS: &str = "CALL db.labels() YIELD label RETURN label ORDER BY label";

pub const LIST_RELATIONSHIP_TYPES: &str =
    "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType ORDER BY relationshipType";

pub const SERVER_TIMESTAMP: &str = "RETURN toString(datetime()) AS timestamp";

/// How property value types are probed during introspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyTypeProbe {
    /// `apoc.meta.type()`, requires the APOC plugin
    #[default]
    Apoc,
    /// `valueType()`, built into Neo4j 5.13+
    ValueType,
}

impl PropertyTypeProbe {
    fn call(&self, value: &str) -> String {
        match self {
            PropertyTypeProbe::Apoc => format!("apoc.meta.type({})", value),
            PropertyTypeProbe::ValueType => format!("valueType({})", value),
        }
    }
}

impl fmt::Display for PropertyTypeProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyTypeProbe::Apoc => write!(f, "apoc"),
            PropertyTypeProbe::ValueType => write!(f, "value-type"),
        }
    }
}

impl FromStr for PropertyTypeProbe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "apoc" => Ok(PropertyTypeProbe::Apoc),
            "value-type" | "valuetype" => Ok(PropertyTypeProbe::ValueType),
            other => Err(format!("Unknown property type probe: {}", other)),
        }
    }
}

/// Quote a label, relationship type or property name for Cypher
pub fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn limit_clause(limit: Option<u64>) -> String {
    match limit {
        Some(limit) => format!(" LIMIT {}", limit),
        None => String::new(),
    }
}

/// Builder for parameterized WHERE clauses
#[derive(Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    params: Properties,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match on the store-internal identity of `alias`
    pub fn add_identity(&mut self, alias: &str, id: Option<i64>) -> &mut Self {
        if let Some(id) = id {
            let key = format!("{}_id", alias);
            self.conditions.push(format!("id({}) = ${}", alias, key));
            self.params.insert(key, Value::from(id));
        }
        self
    }

    /// One equality condition per filter entry
    pub fn add_equals(&mut self, alias: &str, filters: &Properties) -> &mut Self {
        for (index, (property, value)) in filters.iter().enumerate() {
            let key = format!("{}_p{}", alias, index);
            self.conditions.push(format!(
                "{}.{} = ${}",
                alias,
                escape_identifier(property),
                key
            ));
            self.params.insert(key, value.clone());
        }
        self
    }

    /// Build the WHERE clause (returns empty string if no conditions)
    pub fn build(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn into_params(self) -> Properties {
        self.params
    }
}

/// Distinct (key, type) pairs across sampled nodes of `label`
pub fn node_property_types(label: &str, probe: PropertyTypeProbe, limit: Option<u64>) -> String {
    format!(
        "MATCH (n:{}) WITH n{} UNWIND keys(n) AS key RETURN DISTINCT key, {} AS type ORDER BY key, type",
        escape_identifier(label),
        limit_clause(limit),
        probe.call("n[key]")
    )
}

/// Distinct (key, type) pairs across sampled relationships of `rel_type`
pub fn relationship_property_types(
    rel_type: &str,
    probe: PropertyTypeProbe,
    limit: Option<u64>,
) -> String {
    format!(
        "MATCH ()-[r:{}]->() WITH r{} UNWIND keys(r) AS key RETURN DISTINCT key, {} AS type ORDER BY key, type",
        escape_identifier(rel_type),
        limit_clause(limit),
        probe.call("r[key]")
    )
}

/// Distinct (start labels, end labels) pairs across sampled relationships
pub fn relationship_endpoints(rel_type: &str, limit: Option<u64>) -> String {
    format!(
        "MATCH (a)-[r:{}]->(b) WITH a, b{} RETURN DISTINCT labels(a) AS start_labels, labels(b) AS end_labels",
        escape_identifier(rel_type),
        limit_clause(limit)
    )
}

pub fn match_nodes(
    label: &str,
    id: Option<i64>,
    filters: &Properties,
    limit: Option<u64>,
) -> CypherQuery {
    let mut builder = WhereBuilder::new();
    builder.add_identity("n", id).add_equals("n", filters);
    let text = format!(
        "MATCH (n:{}){} RETURN n{}",
        escape_identifier(label),
        builder.build(),
        limit_clause(limit)
    );
    CypherQuery::new(text).params(builder.into_params())
}

pub fn match_relationships(rel_type: &str, id: Option<i64>, filters: &Properties) -> CypherQuery {
    let mut builder = WhereBuilder::new();
    builder.add_identity("r", id).add_equals("r", filters);
    let text = format!(
        "MATCH (source)-[r:{}]->(target){} RETURN source, r, target",
        escape_identifier(rel_type),
        builder.build()
    );
    CypherQuery::new(text).params(builder.into_params())
}

pub fn create_node(labels: &[String], properties: &Properties) -> CypherQuery {
    let labels: String = labels
        .iter()
        .map(|l| format!(":{}", escape_identifier(l)))
        .collect();
    CypherQuery::new(format!("CREATE (n{}) SET n = $props RETURN n", labels))
        .param("props", properties_value(properties))
}

pub fn update_nodes(label: &str, filters: &Properties, updates: &Properties) -> CypherQuery {
    let mut builder = WhereBuilder::new();
    builder.add_equals("n", filters);
    let text = format!(
        "MATCH (n:{}){} SET n += $updates RETURN n",
        escape_identifier(label),
        builder.build()
    );
    CypherQuery::new(text)
        .params(builder.into_params())
        .param("updates", properties_value(updates))
}

pub fn delete_nodes(label: &str, filters: &Properties, detach: bool) -> CypherQuery {
    let mut builder = WhereBuilder::new();
    builder.add_equals("n", filters);
    let text = format!(
        "MATCH (n:{}){} {}DELETE n RETURN count(n) AS deleted",
        escape_identifier(label),
        builder.build(),
        if detach { "DETACH " } else { "" }
    );
    CypherQuery::new(text).params(builder.into_params())
}

pub fn create_relationship(
    start_id: i64,
    end_id: i64,
    rel_type: &str,
    properties: &Properties,
) -> CypherQuery {
    let text = format!(
        "MATCH (a), (b) WHERE id(a) = $start_id AND id(b) = $end_id CREATE (a)-[r:{}]->(b) SET r = $props RETURN r",
        escape_identifier(rel_type)
    );
    CypherQuery::new(text)
        .param("start_id", start_id)
        .param("end_id", end_id)
        .param("props", properties_value(properties))
}

pub fn delete_relationships(rel_type: &str, filters: &Properties) -> CypherQuery {
    let mut builder = WhereBuilder::new();
    builder.add_equals("r", filters);
    let text = format!(
        "MATCH ()-[r:{}]->(){} DELETE r RETURN count(r) AS deleted",
        escape_identifier(rel_type),
        builder.build()
    );
    CypherQuery::new(text).params(builder.into_params())
}

fn properties_value(properties: &Properties) -> Value {
    Value::Object(
        properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}
