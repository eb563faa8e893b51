//! Snapshot model, validation and diffing

pub mod diff;
pub mod types;
pub mod validation;

pub use diff::{SchemaChange, SchemaDiff};
pub use types::{EndpointPair, EntityKind, EntitySchema, PropertySpec, SchemaSnapshot};
pub use validation::{SchemaValidator, ValidationResult};
