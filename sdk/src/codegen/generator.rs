//! End-to-end module generation: introspect, validate, synthesize, emit, write

use super::emitter::{ModuleEmitter, ModuleMetadata};
use super::synthesizer::{AccessorSet, AccessorSynthesizer};
use super::{CodegenResult, CodegenResultBuilder};
use crate::introspect::SchemaIntrospector;
use crate::schema::{SchemaSnapshot, SchemaValidator};
use crate::store::{ConnectionConfig, GraphBackend};
use crate::types::{GraphError, GraphResult};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub const DEFAULT_GRAPH_NAME: &str = "new";

/// Options for module generation
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Directory the module is written to; created if missing
    pub output_dir: PathBuf,
    /// Module name prefix; the file is `<graph_name>graph.rs`
    pub graph_name: String,
    /// Entities scanned per label or relationship type, unbounded when `None`
    pub sample_limit: Option<u64>,
    /// Settings recorded in the emitted connection block
    pub connection: ConnectionConfig,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            graph_name: DEFAULT_GRAPH_NAME.to_string(),
            sample_limit: None,
            connection: ConnectionConfig::default(),
        }
    }
}

impl GenerationOptions {
    /// Path of the module this run writes
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}graph.rs", self.graph_name))
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.graph_name.is_empty() {
            return Err(GraphError::configuration("Graph name cannot be empty"));
        }
        if !self
            .graph_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(GraphError::configuration(format!(
                "Graph name '{}' may only contain ASCII letters, digits and underscores",
                self.graph_name
            )));
        }
        if self.sample_limit == Some(0) {
            return Err(GraphError::configuration("Sample limit must be positive"));
        }
        Ok(())
    }
}

/// Pipeline driver
pub struct ModuleGenerator {
    validator: SchemaValidator,
    synthesizer: AccessorSynthesizer,
}

impl ModuleGenerator {
    pub fn new() -> Self {
        Self {
            validator: SchemaValidator::new(),
            synthesizer: AccessorSynthesizer::new(),
        }
    }

    /// Introspect `backend` and write the module. Any failure aborts the run
    /// and leaves a previously written module untouched.
    pub async fn generate(
        &mut self,
        backend: &dyn GraphBackend,
        options: &GenerationOptions,
    ) -> GraphResult<CodegenResult> {
        options.validate()?;

        let snapshot = SchemaIntrospector::new(backend)
            .with_sample_limit(options.sample_limit)
            .snapshot()
            .await?;

        let generated_at = match backend.server_timestamp().await? {
            Some(timestamp) => timestamp,
            None => {
                warn!("Store did not report a timestamp; using the local clock");
                Utc::now().to_rfc3339()
            }
        };

        let metadata = ModuleMetadata {
            graph_name: options.graph_name.clone(),
            generated_at,
            source: backend.describe(),
            connection: options.connection.clone(),
        };
        self.generate_from_snapshot(&snapshot, metadata, options)
    }

    /// Validate, synthesize, emit and write a module for an existing snapshot
    pub fn generate_from_snapshot(
        &mut self,
        snapshot: &SchemaSnapshot,
        metadata: ModuleMetadata,
        options: &GenerationOptions,
    ) -> GraphResult<CodegenResult> {
        options.validate()?;

        let warnings = self.validator.validate(snapshot).into_result()?;
        for warning in &warnings {
            warn!("{}", warning);
        }

        let accessors = self.synthesizer.synthesize(snapshot);
        let code = ModuleEmitter::new(metadata).emit(snapshot, &accessors)?;

        let path = options.output_path();
        write_atomic(&path, &code)?;
        info!("Wrote {} accessor(s) to {}", accessors.len(), path.display());

        summarize(snapshot, &accessors, path, warnings)
    }

    /// Accessors the pipeline would emit for `snapshot`
    pub fn accessors(&self, snapshot: &SchemaSnapshot) -> AccessorSet {
        self.synthesizer.synthesize(snapshot)
    }
}

impl Default for ModuleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(
    snapshot: &SchemaSnapshot,
    accessors: &AccessorSet,
    path: PathBuf,
    warnings: Vec<String>,
) -> GraphResult<CodegenResult> {
    CodegenResultBuilder::default()
        .generator_name("graph-module".to_string())
        .message(format!("Generated {}", path.display()))
        .files_generated(vec![path])
        .success(true)
        .label_count(snapshot.labels.len())
        .relationship_type_count(snapshot.relationship_types.len())
        .accessor_count(accessors.len())
        .warnings(warnings)
        .build()
        .map_err(|e| GraphError::schema(e.to_string()))
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, renamed into place only once fully written.
pub fn write_atomic(path: &Path, contents: &str) -> GraphResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| GraphError::io(&dir, e))?;

    let mut file = NamedTempFile::new_in(&dir).map_err(|e| GraphError::io(&dir, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| GraphError::io(file.path(), e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| GraphError::io(file.path(), e))?;
    file.persist(path)
        .map_err(|e| GraphError::io(path, e.error))?;
    Ok(())
}
