use anyhow::Result;
use clap::{Parser, Subcommand};
use graphmod_cli::{
    Command, ConnectionArgs, DiffCommand, GenerateCommand, InspectCommand, QueryCommand,
};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "graphmod")]
#[command(about = "Generate typed Rust modules from a Neo4j graph schema")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Directory holding graphmod.yaml
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect the store and write <graph>graph.rs
    Generate {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Module name prefix
        #[arg(short = 'g', long)]
        graph: Option<String>,

        /// Output directory
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Print labels, relationship types and property types
    Inspect {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare a generated module with the live store
    Diff {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Previously generated module
        module: PathBuf,
    },
    /// Run one accessor and print the records as JSON
    Query {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Label, relationship type or accessor name
        entity: String,

        /// Internal id of the node or relationship
        #[arg(long)]
        id: Option<i64>,

        /// Property filter as key=value; repeatable
        #[arg(short = 'f', long = "filter")]
        filters: Vec<String>,
    },
}

impl Commands {
    fn into_command(self, project_dir: PathBuf) -> Box<dyn Command + Send + Sync> {
        match self {
            Commands::Generate {
                connection,
                graph,
                output,
            } => Box::new(GenerateCommand {
                project_dir,
                connection,
                graph_name: graph,
                output_dir: output,
            }),
            Commands::Inspect { connection, json } => Box::new(InspectCommand {
                project_dir,
                connection,
                json,
            }),
            Commands::Diff { connection, module } => Box::new(DiffCommand {
                project_dir,
                connection,
                module,
            }),
            Commands::Query {
                connection,
                entity,
                id,
                filters,
            } => Box::new(QueryCommand {
                project_dir,
                connection,
                entity,
                id,
                filters,
            }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    graphmod_sdk::init_logging(cli.debug);

    let command = cli.command.into_command(cli.project_dir);
    if let Err(e) = command.execute().await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
