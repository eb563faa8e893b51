use super::{Command, ConnectionArgs, connect};
use anyhow::{Context, Result};
use async_trait::async_trait;
use graphmod_sdk::introspect::SchemaIntrospector;
use graphmod_sdk::schema::{EntitySchema, SchemaSnapshot, SchemaValidator};
use std::path::PathBuf;

/// Print what introspection finds without generating a module
pub struct InspectCommand {
    pub project_dir: PathBuf,
    pub connection: ConnectionArgs,
    pub json: bool,
}

#[async_trait]
impl Command for InspectCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.connection.resolve(&self.project_dir)?;
        let backend = connect(&config).await?;

        let snapshot = SchemaIntrospector::new(&backend)
            .with_sample_limit(config.output.sample_limit)
            .snapshot()
            .await
            .context("Introspection failed")?;

        if self.json {
            println!("{}", snapshot.to_json_pretty()?);
            return Ok(());
        }

        print!("{}", render(&snapshot));
        SchemaValidator::new().validate(&snapshot).print_results();
        Ok(())
    }
}

/// Human-readable listing of a snapshot
pub fn render(snapshot: &SchemaSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("Labels ({}):\n", snapshot.labels.len()));
    for label in &snapshot.labels {
        render_entity(&mut out, label);
    }
    out.push_str(&format!(
        "Relationship types ({}):\n",
        snapshot.relationship_types.len()
    ));
    for rel_type in &snapshot.relationship_types {
        render_entity(&mut out, rel_type);
        for pair in &rel_type.endpoints {
            out.push_str(&format!("    {}\n", pair));
        }
    }
    out
}

fn render_entity(out: &mut String, entity: &EntitySchema) {
    out.push_str(&format!("  {}\n", entity.name));
    for (name, property) in &entity.properties {
        out.push_str(&format!("    .{}: {}\n", name, property.expected()));
    }
}
