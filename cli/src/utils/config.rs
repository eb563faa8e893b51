use anyhow::{Context, Result, anyhow};
use graphmod_sdk::codegen::GenerationOptions;
use graphmod_sdk::codegen::generator::DEFAULT_GRAPH_NAME;
use graphmod_sdk::store::neo4j::{DEFAULT_DATABASE, DEFAULT_URI, DEFAULT_USERNAME, PASSWORD_ENV};
use graphmod_sdk::store::{ConnectionConfig, PropertyTypeProbe};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "graphmod.yaml";

/// Project-level settings read from `graphmod.yaml`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphmodConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Store connection settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Neo4jSettings {
    pub uri: String,
    pub username: String,
    /// Only read from the environment or the command line
    #[serde(skip)]
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub probe: PropertyTypeProbe,
}

/// Where and how modules are generated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub graph_name: String,
    pub output_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<u64>,
}

/// Configuration manager that layers file, environment and flag settings
pub struct ConfigManager {
    project_config: Option<GraphmodConfig>,
    project_path: PathBuf,
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            probe: PropertyTypeProbe::default(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            graph_name: DEFAULT_GRAPH_NAME.to_string(),
            output_dir: PathBuf::from("."),
            sample_limit: None,
        }
    }
}

impl Default for GraphmodConfig {
    fn default() -> Self {
        Self {
            neo4j: Neo4jSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl GraphmodConfig {
    /// Load configuration from a specific directory
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref().join(CONFIG_FILE);

        if !config_path.exists() {
            return Err(anyhow!(
                "Configuration file not found at: {}",
                config_path.display()
            ));
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: GraphmodConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Apply overrides from a variable lookup such as `std::env::var`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("NEO4J_URI") {
            self.neo4j.uri = uri;
        }
        if let Some(username) = lookup("NEO4J_USERNAME") {
            self.neo4j.username = username;
        }
        if let Some(password) = lookup(PASSWORD_ENV) {
            self.neo4j.password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            self.neo4j.database = database;
        }
        if let Some(output_dir) = lookup("GRAPHMOD_OUTPUT_DIR") {
            self.output.output_dir = PathBuf::from(output_dir);
        }
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(
            &self.neo4j.uri,
            &self.neo4j.username,
            &self.neo4j.password,
            &self.neo4j.database,
        )
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            output_dir: self.output.output_dir.clone(),
            graph_name: self.output.graph_name.clone(),
            sample_limit: self.output.sample_limit,
            connection: self.connection(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.connection()
            .validate()
            .context("Invalid connection settings")?;
        self.generation_options()
            .validate()
            .context("Invalid output settings")?;
        Ok(())
    }
}

impl ConfigManager {
    /// Create a new configuration manager for a project directory
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_config: None,
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Load project configuration if a config file exists
    pub fn load(&mut self) -> Result<()> {
        if self.has_config_file() {
            self.project_config = Some(GraphmodConfig::load_from_path(&self.project_path)?);
        }

        Ok(())
    }

    /// Get the effective configuration with environment variable overrides
    pub fn get_effective_config(&self) -> Result<GraphmodConfig> {
        self.get_effective_config_with(|key| env::var(key).ok())
    }

    /// Same as [`get_effective_config`](Self::get_effective_config) with a custom variable source
    pub fn get_effective_config_with<F>(&self, lookup: F) -> Result<GraphmodConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.project_config.clone().unwrap_or_default();
        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn has_config_file(&self) -> bool {
        self.project_path.join(CONFIG_FILE).exists()
    }
}
