//! Structural comparison of two snapshots

use super::types::{EntityKind, EntitySchema, SchemaSnapshot};
use crate::types::StoreType;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A single difference between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SchemaChange {
    EntityAdded {
        kind: EntityKind,
        name: String,
    },
    EntityRemoved {
        kind: EntityKind,
        name: String,
    },
    PropertyAdded {
        kind: EntityKind,
        entity: String,
        property: String,
        types: BTreeSet<StoreType>,
    },
    PropertyRemoved {
        kind: EntityKind,
        entity: String,
        property: String,
    },
    PropertyTypesChanged {
        kind: EntityKind,
        entity: String,
        property: String,
        before: BTreeSet<StoreType>,
        after: BTreeSet<StoreType>,
    },
    EndpointsChanged {
        entity: String,
        added: Vec<String>,
        removed: Vec<String>,
    },
}

fn tags(types: &BTreeSet<StoreType>) -> String {
    types
        .iter()
        .map(|t| t.tag().to_string())
        .collect::<Vec<_>>()
        .join("|")
}

impl fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaChange::EntityAdded { kind, name } => write!(f, "+ {} {}", kind, name),
            SchemaChange::EntityRemoved { kind, name } => write!(f, "- {} {}", kind, name),
            SchemaChange::PropertyAdded {
                kind,
                entity,
                property,
                types,
            } => write!(f, "+ {} {}.{}: {}", kind, entity, property, tags(types)),
            SchemaChange::PropertyRemoved {
                kind,
                entity,
                property,
            } => write!(f, "- {} {}.{}", kind, entity, property),
            SchemaChange::PropertyTypesChanged {
                kind,
                entity,
                property,
                before,
                after,
            } => write!(
                f,
                "~ {} {}.{}: {} -> {}",
                kind,
                entity,
                property,
                tags(before),
                tags(after)
            ),
            SchemaChange::EndpointsChanged {
                entity,
                added,
                removed,
            } => {
                write!(f, "~ relationship type {} endpoints", entity)?;
                for pair in added {
                    write!(f, " +{}", pair)?;
                }
                for pair in removed {
                    write!(f, " -{}", pair)?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered list of changes taking one snapshot to another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub changes: Vec<SchemaChange>,
}

impl SchemaDiff {
    /// Compare `before` against `after`. Labels are compared first, then
    /// relationship types; within each, entities follow `after`'s order with
    /// removals appended.
    pub fn between(before: &SchemaSnapshot, after: &SchemaSnapshot) -> Self {
        let mut changes = Vec::new();
        diff_entities(&before.labels, &after.labels, EntityKind::Node, &mut changes);
        diff_entities(
            &before.relationship_types,
            &after.relationship_types,
            EntityKind::Relationship,
            &mut changes,
        );
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

impl fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changes.is_empty() {
            return write!(f, "No schema changes");
        }
        for change in &self.changes {
            writeln!(f, "{}", change)?;
        }
        Ok(())
    }
}

fn diff_entities(
    before: &[EntitySchema],
    after: &[EntitySchema],
    kind: EntityKind,
    changes: &mut Vec<SchemaChange>,
) {
    for entity in after {
        match before.iter().find(|e| e.name == entity.name) {
            Some(old) => diff_entity(old, entity, changes),
            None => changes.push(SchemaChange::EntityAdded {
                kind,
                name: entity.name.clone(),
            }),
        }
    }

    for entity in before {
        if !after.iter().any(|e| e.name == entity.name) {
            changes.push(SchemaChange::EntityRemoved {
                kind,
                name: entity.name.clone(),
            });
        }
    }
}

fn diff_entity(before: &EntitySchema, after: &EntitySchema, changes: &mut Vec<SchemaChange>) {
    let kind = after.kind;

    for (name, property) in &after.properties {
        match before.properties.get(name) {
            None => changes.push(SchemaChange::PropertyAdded {
                kind,
                entity: after.name.clone(),
                property: name.clone(),
                types: property.types.clone(),
            }),
            Some(old) if old.types != property.types => {
                changes.push(SchemaChange::PropertyTypesChanged {
                    kind,
                    entity: after.name.clone(),
                    property: name.clone(),
                    before: old.types.clone(),
                    after: property.types.clone(),
                })
            }
            Some(_) => {}
        }
    }

    for name in before.properties.keys() {
        if !after.properties.contains_key(name) {
            changes.push(SchemaChange::PropertyRemoved {
                kind,
                entity: after.name.clone(),
                property: name.clone(),
            });
        }
    }

    if before.endpoints != after.endpoints {
        changes.push(SchemaChange::EndpointsChanged {
            entity: after.name.clone(),
            added: after
                .endpoints
                .difference(&before.endpoints)
                .map(|p| p.to_string())
                .collect(),
            removed: before
                .endpoints
                .difference(&after.endpoints)
                .map(|p| p.to_string())
                .collect(),
        });
    }
}
