//! Introspected schema model

use crate::types::{GraphResult, StoreType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Whether an entity schema describes a node label or a relationship type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Relationship,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => write!(f, "label"),
            EntityKind::Relationship => write!(f, "relationship type"),
        }
    }
}

/// One observed property and every type tag seen for it across the sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub types: BTreeSet<StoreType>,
}

impl PropertySpec {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            types: BTreeSet::new(),
        }
    }

    /// Build a spec with a single observed tag
    pub fn typed<N: Into<String>>(name: N, tag: StoreType) -> Self {
        let mut spec = Self::new(name);
        spec.types.insert(tag);
        spec
    }

    /// Record another observed tag
    pub fn observe(&mut self, tag: StoreType) {
        self.types.insert(tag);
    }

    /// More than one distinct tag was observed
    pub fn is_ambiguous(&self) -> bool {
        self.types.len() > 1
    }

    /// No validation is possible: no tags, or at least one non-scalar tag
    pub fn is_opaque(&self) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| !t.is_scalar())
    }

    /// Rust type of the property in generated code
    pub fn rust_type(&self) -> &'static str {
        match self.types.iter().next() {
            Some(tag) if self.types.len() == 1 => tag.rust_type(),
            _ => "serde_json::Value",
        }
    }

    /// Expected-type description used in TypeMismatch errors
    pub fn expected(&self) -> String {
        self.types
            .iter()
            .map(|t| t.tag().to_string())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Observed (start labels, end labels) combination of a relationship type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndpointPair {
    pub start_labels: Vec<String>,
    pub end_labels: Vec<String>,
}

impl EndpointPair {
    pub fn new(mut start_labels: Vec<String>, mut end_labels: Vec<String>) -> Self {
        start_labels.sort();
        end_labels.sort();
        Self {
            start_labels,
            end_labels,
        }
    }
}

impl fmt::Display for EndpointPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(:{})->(:{})",
            self.start_labels.join(":"),
            self.end_labels.join(":")
        )
    }
}

/// Schema of one label or relationship type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    pub kind: EntityKind,
    pub properties: BTreeMap<String, PropertySpec>,
    /// Only populated for relationship types
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub endpoints: BTreeSet<EndpointPair>,
}

impl EntitySchema {
    pub fn node<N: Into<String>>(name: N) -> Self {
        Self::new(name, EntityKind::Node)
    }

    pub fn relationship<N: Into<String>>(name: N) -> Self {
        Self::new(name, EntityKind::Relationship)
    }

    fn new<N: Into<String>>(name: N, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            properties: BTreeMap::new(),
            endpoints: BTreeSet::new(),
        }
    }

    /// Record that `property` was observed holding a value tagged `tag`
    pub fn observe(&mut self, property: &str, tag: StoreType) {
        self.properties
            .entry(property.to_string())
            .or_insert_with(|| PropertySpec::new(property))
            .observe(tag);
    }

    pub fn add_endpoint(&mut self, pair: EndpointPair) {
        self.endpoints.insert(pair);
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }
}

/// Complete label/type/property picture of a store at one point in time.
///
/// Carries no timestamp or source identity so that two snapshots of an
/// unchanged store serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub labels: Vec<EntitySchema>,
    pub relationship_types: Vec<EntitySchema>,
}

impl SchemaSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label schema, replacing any existing schema with the same name
    pub fn add_label(&mut self, entity: EntitySchema) {
        Self::upsert(&mut self.labels, entity);
    }

    /// Add a relationship type schema, replacing any existing one with the same name
    pub fn add_relationship_type(&mut self, entity: EntitySchema) {
        Self::upsert(&mut self.relationship_types, entity);
    }

    fn upsert(entities: &mut Vec<EntitySchema>, entity: EntitySchema) {
        match entities.iter_mut().find(|e| e.name == entity.name) {
            Some(existing) => *existing = entity,
            None => entities.push(entity),
        }
    }

    pub fn label(&self, name: &str) -> Option<&EntitySchema> {
        self.labels.iter().find(|e| e.name == name)
    }

    pub fn relationship_type(&self, name: &str) -> Option<&EntitySchema> {
        self.relationship_types.iter().find(|e| e.name == name)
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn relationship_type_names(&self) -> Vec<&str> {
        self.relationship_types.iter().map(|e| e.name.as_str()).collect()
    }

    /// Labels first, then relationship types
    pub fn entities(&self) -> impl Iterator<Item = &EntitySchema> {
        self.labels.iter().chain(self.relationship_types.iter())
    }

    pub fn entity_count(&self) -> usize {
        self.labels.len() + self.relationship_types.len()
    }

    pub fn to_json_pretty(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
