//! Graphmod CLI library
//!
//! Programmatic access to the `graphmod` commands and the layered
//! `graphmod.yaml` configuration, for use from build scripts and tools.

pub mod commands;
pub mod utils;

pub use commands::{
    Command, ConnectionArgs, diff::DiffCommand, generate::GenerateCommand,
    inspect::InspectCommand, query::QueryCommand,
};
pub use utils::config::{ConfigManager, GraphmodConfig};
