//! Graph module code generation
//!
//! Turns a [`SchemaSnapshot`](crate::schema::SchemaSnapshot) into a single
//! Rust source module with typed accessors for every label and relationship
//! type. Generation is split into naming, accessor synthesis, emission and
//! an atomic file write driven by [`ModuleGenerator`].

pub mod accessor;
pub mod emitter;
pub mod generator;
pub mod naming;
pub mod synthesizer;

use derive_builder::Builder;
use std::path::PathBuf;

pub use accessor::{AccessorOutput, AccessorParam, GeneratedAccessor};
pub use emitter::{ModuleEmitter, ModuleMetadata, extract_schema};
pub use generator::{GenerationOptions, ModuleGenerator, write_atomic};
pub use naming::NameAllocator;
pub use synthesizer::{AccessorSet, AccessorSynthesizer};

/// Result of a code generation run
#[derive(Debug, Clone, Builder)]
pub struct CodegenResult {
    pub generator_name: String,
    pub files_generated: Vec<PathBuf>,
    pub success: bool,
    pub message: String,
    #[builder(default)]
    pub label_count: usize,
    #[builder(default)]
    pub relationship_type_count: usize,
    #[builder(default)]
    pub accessor_count: usize,
    #[builder(default)]
    pub warnings: Vec<String>,
}

impl CodegenResult {
    pub fn print_summary(&self) {
        if self.success {
            println!("✅ {}", self.message);
        } else {
            println!("❌ {}", self.message);
        }
        println!(
            "   {} label(s), {} relationship type(s), {} accessor(s)",
            self.label_count, self.relationship_type_count, self.accessor_count
        );
        for file in &self.files_generated {
            println!("   📄 {}", file.display());
        }
        if !self.warnings.is_empty() {
            println!("⚠️  Warnings:");
            for warning in &self.warnings {
                println!("   - {}", warning);
            }
        }
    }
}
