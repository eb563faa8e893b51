pub mod diff;
pub mod generate;
pub mod inspect;
pub mod query;

use crate::utils::config::{ConfigManager, GraphmodConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use graphmod_sdk::store::{Neo4jBackend, PropertyTypeProbe};
use std::path::Path;

#[async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Connection flags shared by every command that talks to the store
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Store URI, e.g. bolt://localhost:7687
    #[arg(short = 'u', long)]
    pub uri: Option<String>,

    #[arg(short = 'n', long)]
    pub username: Option<String>,

    /// Falls back to the NEO4J_PASSWORD environment variable
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    #[arg(short = 'd', long)]
    pub database: Option<String>,

    /// How property types are probed: apoc or value-type
    #[arg(long)]
    pub probe: Option<PropertyTypeProbe>,

    /// Entities scanned per label or relationship type
    #[arg(long)]
    pub sample_limit: Option<u64>,
}

impl ConnectionArgs {
    /// Layer these flags over the file and environment settings of `project_dir`
    pub fn resolve(&self, project_dir: &Path) -> Result<GraphmodConfig> {
        let mut manager = ConfigManager::new(project_dir);
        manager.load()?;
        let mut config = manager.get_effective_config()?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut GraphmodConfig) {
        if let Some(uri) = &self.uri {
            config.neo4j.uri = uri.clone();
        }
        if let Some(username) = &self.username {
            config.neo4j.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.neo4j.password = password.clone();
        }
        if let Some(database) = &self.database {
            config.neo4j.database = database.clone();
        }
        if let Some(probe) = self.probe {
            config.neo4j.probe = probe;
        }
        if self.sample_limit.is_some() {
            config.output.sample_limit = self.sample_limit;
        }
    }
}

/// Open the store described by `config`
pub async fn connect(config: &GraphmodConfig) -> Result<Neo4jBackend> {
    Neo4jBackend::connect(config.connection(), config.neo4j.probe)
        .await
        .with_context(|| format!("Failed to connect to {}", config.neo4j.uri))
}
