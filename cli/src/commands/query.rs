use super::{Command, ConnectionArgs, connect};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use graphmod_sdk::codegen::AccessorSynthesizer;
use graphmod_sdk::introspect::SchemaIntrospector;
use graphmod_sdk::runtime::{GraphClient, PropertyFilter};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Run one accessor in process and print its records as JSON
pub struct QueryCommand {
    pub project_dir: PathBuf,
    pub connection: ConnectionArgs,
    /// Label, relationship type, or accessor function name
    pub entity: String,
    pub id: Option<i64>,
    /// `key=value` pairs
    pub filters: Vec<String>,
}

#[async_trait]
impl Command for QueryCommand {
    async fn execute(&self) -> Result<()> {
        let filter = parse_filters(&self.filters)?;

        let config = self.connection.resolve(&self.project_dir)?;
        let backend = Arc::new(connect(&config).await?);
        let snapshot = SchemaIntrospector::new(backend.as_ref())
            .with_sample_limit(config.output.sample_limit)
            .snapshot()
            .await
            .context("Introspection failed")?;

        let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
        let accessor = accessors
            .find(&self.entity)
            .or_else(|| accessors.iter().find(|a| a.fn_name == self.entity))
            .ok_or_else(|| anyhow!("No label or relationship type named '{}'", self.entity))?;

        let client = GraphClient::new(backend);
        let output = accessor.invoke(&client, self.id, filter).await?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

/// Parse `key=value` arguments; values are read as JSON, falling back to a plain string
pub fn parse_filters(args: &[String]) -> Result<PropertyFilter> {
    let mut filter = PropertyFilter::new();
    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Filter '{}' must look like key=value", arg))?;
        if key.is_empty() {
            return Err(anyhow!("Filter '{}' has an empty property name", arg));
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        filter.insert(key, value);
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filters() {
        let filter = parse_filters(&[
            "age=36".to_string(),
            "name=Ada".to_string(),
            "active=true".to_string(),
            "motto=a=b".to_string(),
        ])
        .unwrap();

        assert_eq!(filter.get("age"), Some(&json!(36)));
        assert_eq!(filter.get("name"), Some(&json!("Ada")));
        assert_eq!(filter.get("active"), Some(&json!(true)));
        assert_eq!(filter.get("motto"), Some(&json!("a=b")));
    }

    #[test]
    fn test_parse_filters_rejects_malformed() {
        assert!(parse_filters(&["age".to_string()]).is_err());
        assert!(parse_filters(&["=1".to_string()]).is_err());
    }
}
