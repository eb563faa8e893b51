use super::{Command, ConnectionArgs, connect};
use anyhow::{Context, Result};
use async_trait::async_trait;
use graphmod_sdk::codegen::extract_schema;
use graphmod_sdk::introspect::SchemaIntrospector;
use graphmod_sdk::schema::SchemaDiff;
use std::fs;
use std::path::PathBuf;

/// Compare the schema baked into a generated module with the live store
pub struct DiffCommand {
    pub project_dir: PathBuf,
    pub connection: ConnectionArgs,
    pub module: PathBuf,
}

#[async_trait]
impl Command for DiffCommand {
    async fn execute(&self) -> Result<()> {
        let source = fs::read_to_string(&self.module)
            .with_context(|| format!("Failed to read module: {}", self.module.display()))?;
        let generated = extract_schema(&source)
            .with_context(|| format!("No schema found in {}", self.module.display()))?;

        let config = self.connection.resolve(&self.project_dir)?;
        let backend = connect(&config).await?;
        let live = SchemaIntrospector::new(&backend)
            .with_sample_limit(config.output.sample_limit)
            .snapshot()
            .await
            .context("Introspection failed")?;

        let diff = SchemaDiff::between(&generated, &live);
        println!("{}", diff);
        if !diff.is_empty() {
            println!(
                "{} change(s); rerun `graphmod generate` to refresh {}",
                diff.len(),
                self.module.display()
            );
        }
        Ok(())
    }
}
