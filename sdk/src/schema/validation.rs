//! Sanity checks run on a snapshot before code is generated from it

use super::types::{EntityKind, EntitySchema, SchemaSnapshot};
use crate::codegen::naming::NameAllocator;
use crate::types::{GraphError, GraphResult};
use std::collections::HashSet;

/// Validator for introspected snapshots
pub struct SchemaValidator {
    /// Validation errors collected during validation
    errors: Vec<String>,
    /// Validation warnings collected during validation
    warnings: Vec<String>,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Validate a complete snapshot
    pub fn validate(&mut self, snapshot: &SchemaSnapshot) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_unique_names(&snapshot.labels, EntityKind::Node);
        self.validate_unique_names(&snapshot.relationship_types, EntityKind::Relationship);
        self.validate_accessor_names(&snapshot.labels);
        self.validate_accessor_names(&snapshot.relationship_types);

        for entity in snapshot.entities() {
            self.validate_entity(entity);
        }

        let labels: HashSet<&str> = snapshot.label_names().into_iter().collect();
        for rel_type in &snapshot.relationship_types {
            self.validate_endpoints(rel_type, &labels);
        }

        ValidationResult {
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }

    fn validate_unique_names(&mut self, entities: &[EntitySchema], kind: EntityKind) {
        let mut seen = HashSet::new();
        for entity in entities {
            if !seen.insert(entity.name.as_str()) {
                self.errors
                    .push(format!("Duplicate {} '{}' in snapshot", kind, entity.name));
            }
        }
    }

    fn validate_accessor_names(&mut self, entities: &[EntitySchema]) {
        let mut names = NameAllocator::new();
        for entity in entities {
            let (fn_name, suffixed) = names.allocate(&entity.name);
            if suffixed {
                self.warnings.push(format!(
                    "{} '{}' collides with an earlier accessor name and is emitted as {}",
                    capitalize(&entity.kind.to_string()),
                    entity.name,
                    fn_name
                ));
            }
        }
    }

    fn validate_entity(&mut self, entity: &EntitySchema) {
        if entity.name.is_empty() {
            self.errors.push(format!("Empty {} name in snapshot", entity.kind));
            return;
        }

        if entity.kind == EntityKind::Node && !entity.endpoints.is_empty() {
            self.errors.push(format!(
                "Label '{}' cannot carry relationship endpoints",
                entity.name
            ));
        }

        for (name, property) in &entity.properties {
            if name.is_empty() {
                self.errors
                    .push(format!("Empty property name on {} '{}'", entity.kind, entity.name));
                continue;
            }

            if property.types.is_empty() {
                self.warnings.push(format!(
                    "Property '{}.{}' has no observed type and will not be validated",
                    entity.name, name
                ));
            } else if property.is_opaque() {
                self.warnings.push(format!(
                    "Property '{}.{}' ({}) is passed through without validation",
                    entity.name,
                    name,
                    property.expected()
                ));
            } else if property.is_ambiguous() {
                self.warnings.push(format!(
                    "Property '{}.{}' has mixed types {}",
                    entity.name,
                    name,
                    property.expected()
                ));
            }
        }
    }

    fn validate_endpoints(&mut self, rel_type: &EntitySchema, labels: &HashSet<&str>) {
        if rel_type.endpoints.is_empty() {
            self.warnings.push(format!(
                "Relationship type '{}' has no sampled endpoints",
                rel_type.name
            ));
            return;
        }

        for pair in &rel_type.endpoints {
            for label in pair.start_labels.iter().chain(pair.end_labels.iter()) {
                if !labels.contains(label.as_str()) {
                    self.warnings.push(format!(
                        "Relationship type '{}' connects unknown label '{}'",
                        rel_type.name, label
                    ));
                }
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of snapshot validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Problems that make the snapshot unusable for generation
    pub errors: Vec<String>,
    /// Properties or relationships that will be emitted with reduced checks
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of issues (errors + warnings)
    pub fn issue_count(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// Turn collected errors into a Schema error
    pub fn into_result(self) -> GraphResult<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(GraphError::schema(self.errors.join("; ")))
        }
    }

    /// Print all validation results
    pub fn print_results(&self) {
        for error in &self.errors {
            println!("❌ Error: {}", error);
        }
        for warning in &self.warnings {
            println!("⚠️  Warning: {}", warning);
        }

        if self.is_valid() && self.warnings.is_empty() {
            println!("✅ Snapshot validation passed with no issues");
        } else if self.is_valid() {
            println!("✅ Snapshot validation passed with {} warning(s)", self.warnings.len());
        } else {
            println!(
                "❌ Snapshot validation failed with {} error(s) and {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            );
        }
    }
}
