//! Turns a snapshot into accessor specifications

use super::accessor::{AccessorParam, GeneratedAccessor};
use super::naming::NameAllocator;
use crate::schema::{EntitySchema, SchemaSnapshot};
use tracing::{debug, warn};

/// Accessors for one snapshot, split by namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessorSet {
    pub nodes: Vec<GeneratedAccessor>,
    pub edges: Vec<GeneratedAccessor>,
}

impl AccessorSet {
    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedAccessor> {
        self.nodes.iter().chain(self.edges.iter())
    }

    /// Find the accessor for a label or relationship type by store name
    pub fn find(&self, entity: &str) -> Option<&GeneratedAccessor> {
        self.iter().find(|a| a.entity == entity)
    }
}

/// Produces one accessor per label and per relationship type
#[derive(Debug, Default)]
pub struct AccessorSynthesizer;

impl AccessorSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, snapshot: &SchemaSnapshot) -> AccessorSet {
        let mut node_names = NameAllocator::new();
        let mut edge_names = NameAllocator::new();

        let set = AccessorSet {
            nodes: snapshot
                .labels
                .iter()
                .map(|entity| self.synthesize_entity(entity, &mut node_names))
                .collect(),
            edges: snapshot
                .relationship_types
                .iter()
                .map(|entity| self.synthesize_entity(entity, &mut edge_names))
                .collect(),
        };
        debug!(
            "Synthesized {} node and {} relationship accessor(s)",
            set.nodes.len(),
            set.edges.len()
        );
        set
    }

    /// Accessor for a single entity; `names` resolves collisions within its namespace
    pub fn synthesize_entity(
        &self,
        entity: &EntitySchema,
        names: &mut NameAllocator,
    ) -> GeneratedAccessor {
        let (fn_name, suffixed) = names.allocate(&entity.name);
        if suffixed {
            warn!(
                "{} '{}' collides with an earlier accessor name; emitted as {}",
                entity.kind, entity.name, fn_name
            );
        }

        GeneratedAccessor {
            entity: entity.name.clone(),
            kind: entity.kind,
            fn_name,
            params: entity
                .properties
                .values()
                .map(AccessorParam::from_spec)
                .collect(),
            endpoints: entity.endpoints.iter().map(|p| p.to_string()).collect(),
        }
    }
}
