use super::{Command, ConnectionArgs, connect};
use anyhow::{Context, Result};
use async_trait::async_trait;
use graphmod_sdk::codegen::ModuleGenerator;
use std::path::PathBuf;
use tracing::info;

pub struct GenerateCommand {
    pub project_dir: PathBuf,
    pub connection: ConnectionArgs,
    pub graph_name: Option<String>,
    pub output_dir: Option<PathBuf>,
}

#[async_trait]
impl Command for GenerateCommand {
    async fn execute(&self) -> Result<()> {
        let mut config = self.connection.resolve(&self.project_dir)?;
        if let Some(graph_name) = &self.graph_name {
            config.output.graph_name = graph_name.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.output_dir = output_dir.clone();
        }
        config.validate()?;

        let options = config.generation_options();
        info!("Generating {}", options.output_path().display());

        let backend = connect(&config).await?;
        let result = ModuleGenerator::new()
            .generate(&backend, &options)
            .await
            .context("Module generation failed")?;

        result.print_summary();
        Ok(())
    }
}
