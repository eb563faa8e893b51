//! Renders a snapshot and its accessors as one Rust source file

use super::accessor::GeneratedAccessor;
use super::synthesizer::AccessorSet;
use crate::schema::{EntityKind, SchemaSnapshot};
use crate::store::ConnectionConfig;
use crate::store::neo4j::PASSWORD_ENV;
use crate::types::{GraphError, GraphResult};
use rust_codegen::{Function, Scope};

pub const GENERATOR_NAME: &str = "graphmod";
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DRIVER_NAME: &str = "neo4rs";

const SCHEMA_CONST: &str = "pub const SCHEMA_JSON: &str = ";

/// Generation-time facts recorded in the module header and connection block
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    pub graph_name: String,
    pub generated_at: String,
    /// Human-readable store identity
    pub source: String,
    /// Password is never emitted
    pub connection: ConnectionConfig,
}

/// Module Emitter
pub struct ModuleEmitter {
    metadata: ModuleMetadata,
}

impl ModuleEmitter {
    pub fn new(metadata: ModuleMetadata) -> Self {
        Self { metadata }
    }

    /// Render the full module in fixed order: header, imports, connection
    /// block, query helpers, normalizers, schema literal, node accessors,
    /// relationship accessors.
    pub fn emit(&self, snapshot: &SchemaSnapshot, accessors: &AccessorSet) -> GraphResult<String> {
        let mut module = String::new();
        module.push_str(&self.header().to_string());
        module.push('\n');
        module.push_str(&self.imports().to_string());
        module.push('\n');
        module.push_str(&self.connection_block().to_string());
        module.push('\n');
        module.push_str(&self.query_helpers().to_string());
        module.push('\n');
        module.push_str(&self.normalizers().to_string());
        module.push('\n');
        module.push_str(&self.schema_literal(snapshot)?.to_string());
        module.push('\n');
        module.push_str(&self.namespace(
            "nodes",
            "Accessors, one per node label",
            &accessors.nodes,
        ));
        module.push('\n');
        module.push_str(&self.namespace(
            "edges",
            "Accessors, one per relationship type",
            &accessors.edges,
        ));
        Ok(module)
    }

    fn header(&self) -> Scope {
        let meta = &self.metadata;
        let lines = [
            format!(
                "//! Graph module `{}` generated from the store schema",
                doc_text(&meta.graph_name)
            ),
            "//!".to_string(),
            format!("//! Generated at: {}", doc_text(&meta.generated_at)),
            format!("//! Source: {}", doc_text(&meta.source)),
            format!("//! Generator: {} {}", GENERATOR_NAME, GENERATOR_VERSION),
            format!("//! Driver: {}", DRIVER_NAME),
            "//!".to_string(),
            "//! This file is auto-generated. Do not edit manually.".to_string(),
        ];
        let mut header = Scope::new();
        header.raw(&lines.join("\n"));
        header
    }

    fn imports(&self) -> Scope {
        let mut scope = Scope::new();
        scope.raw("use graphmod_sdk::schema::SchemaSnapshot;");
        scope.raw("pub use graphmod_sdk::runtime::{DatabaseOperations, GraphClient, PropertyFilter};");
        scope.raw("pub use graphmod_sdk::store::{ConnectionConfig, EdgeTriple, NodeRecord, Properties, Row};");
        scope.raw("pub use graphmod_sdk::types::{GraphError, GraphResult, StoreType};");
        scope
    }

    fn connection_block(&self) -> Scope {
        let connection = &self.metadata.connection;
        let mut scope = Scope::new();
        scope.raw(&format!("pub const URI: &str = {:?};", connection.uri));
        scope.raw(&format!("pub const USERNAME: &str = {:?};", connection.username));
        scope.raw(&format!("pub const DATABASE: &str = {:?};", connection.database));
        scope.raw(&format!(
            "/// Environment variable the password is read from\npub const PASSWORD_ENV: &str = {:?};",
            PASSWORD_ENV
        ));

        let mut config_fn = Function::new("connection_config");
        config_fn
            .doc("Connection settings recorded at generation time, with the password taken from `PASSWORD_ENV`")
            .vis("pub")
            .ret("ConnectionConfig")
            .line("let password = std::env::var(PASSWORD_ENV).unwrap_or_default();")
            .line("ConnectionConfig::new(URI, USERNAME, password, DATABASE)");
        scope.push_fn(config_fn);

        let mut connect_fn = Function::new("connect");
        connect_fn
            .doc("Connect to the store this module was generated from")
            .vis("pub")
            .set_async(true)
            .ret("GraphResult<GraphClient>")
            .line("GraphClient::connect(connection_config()).await");
        scope.push_fn(connect_fn);
        scope
    }

    fn query_helpers(&self) -> Scope {
        let mut scope = Scope::new();

        let mut execute_fn = Function::new("execute_query");
        execute_fn
            .doc("Run parameterized Cypher and return raw rows")
            .vis("pub")
            .set_async(true)
            .arg("client", "&GraphClient")
            .arg("text", "&str")
            .arg("params", "Properties")
            .ret("GraphResult<Vec<Row>>")
            .line("client.execute_query(text, params).await");
        scope.push_fn(execute_fn);

        let mut timestamp_fn = Function::new("server_timestamp");
        timestamp_fn
            .doc("Current store clock")
            .vis("pub")
            .set_async(true)
            .arg("client", "&GraphClient")
            .ret("GraphResult<Option<String>>")
            .line("client.server_timestamp().await");
        scope.push_fn(timestamp_fn);
        scope
    }

    fn normalizers(&self) -> Scope {
        let mut scope = Scope::new();

        let mut nodes_fn = Function::new("normalize_nodes");
        nodes_fn
            .doc("Uniform JSON view of node records")
            .vis("pub")
            .arg("records", "&[NodeRecord]")
            .ret("GraphResult<graphmod_sdk::serde_json::Value>")
            .line("graphmod_sdk::store::normalize(records)");
        scope.push_fn(nodes_fn);

        let mut edges_fn = Function::new("normalize_edges");
        edges_fn
            .doc("Uniform JSON view of (source, relationship, target) triples")
            .vis("pub")
            .arg("records", "&[EdgeTriple]")
            .ret("GraphResult<graphmod_sdk::serde_json::Value>")
            .line("graphmod_sdk::store::normalize(records)");
        scope.push_fn(edges_fn);
        scope
    }

    fn schema_literal(&self, snapshot: &SchemaSnapshot) -> GraphResult<Scope> {
        let json = snapshot.to_json_pretty()?;
        let mut scope = Scope::new();

        scope.raw(&format!(
            "pub const LABELS: &[&str] = &[{}];",
            string_list(snapshot.label_names())
        ));
        scope.raw(&format!(
            "pub const RELATIONSHIP_TYPES: &[&str] = &[{}];",
            string_list(snapshot.relationship_type_names())
        ));
        scope.raw(&format!(
            "/// Schema snapshot this module was generated from\n{}{};",
            SCHEMA_CONST,
            raw_string_literal(&json)
        ));

        let mut schema_fn = Function::new("schema");
        schema_fn
            .doc("Parse the embedded schema snapshot")
            .vis("pub")
            .ret("GraphResult<SchemaSnapshot>")
            .line("SchemaSnapshot::from_json(SCHEMA_JSON)");
        scope.push_fn(schema_fn);
        Ok(scope)
    }

    fn namespace(&self, name: &str, doc: &str, accessors: &[GeneratedAccessor]) -> String {
        let mut scope = Scope::new();
        scope.raw(
            "#[allow(unused_imports)]\nuse super::{EdgeTriple, GraphClient, GraphResult, NodeRecord, PropertyFilter, StoreType};",
        );
        for accessor in accessors {
            scope.push_fn(self.accessor_fn(accessor));
        }

        let mut rendered = format!("/// {}\npub mod {} {{\n", doc, name);
        for line in scope.to_string().lines() {
            if !line.is_empty() {
                rendered.push_str("    ");
                rendered.push_str(line);
            }
            rendered.push('\n');
        }
        rendered.push_str("}\n");
        rendered
    }

    fn accessor_fn(&self, accessor: &GeneratedAccessor) -> Function {
        let (ret, call) = match accessor.kind {
            EntityKind::Node => ("GraphResult<Vec<NodeRecord>>", "match_nodes"),
            EntityKind::Relationship => ("GraphResult<Vec<EdgeTriple>>", "match_edges"),
        };
        let has_validations = accessor.validations().next().is_some();

        let mut function = Function::new(&accessor.fn_name);
        function
            .doc(&accessor_doc(accessor))
            .vis("pub")
            .set_async(true)
            .arg("client", "&GraphClient")
            .arg("id", "Option<i64>")
            .arg(if has_validations { "mut filter" } else { "filter" }, "PropertyFilter")
            .ret(ret);

        for param in accessor.validations() {
            let types: Vec<String> = param.types.iter().map(|t| t.rust_expr()).collect();
            function.line(format!(
                "filter.coerce({:?}, {:?}, &[{}])?;",
                accessor.entity,
                param.property,
                types.join(", ")
            ));
        }
        function.line(format!("client.{}({:?}, id, filter).await", call, accessor.entity));
        function
    }
}

fn accessor_doc(accessor: &GeneratedAccessor) -> String {
    let mut doc = format!(
        "Accessor for {} `{}`.",
        accessor.kind,
        doc_text(&accessor.entity)
    );

    if accessor.params.is_empty() {
        doc.push_str("\n\nNo properties were observed.");
    } else {
        doc.push_str("\n\nProperties:");
        for param in &accessor.params {
            doc.push_str(&format!(
                "\n- `{}`: `{}` ({}{})",
                doc_text(&param.property),
                param.rust_type,
                param.expected(),
                if param.validated { "" } else { ", unvalidated" }
            ));
        }
    }

    if !accessor.endpoints.is_empty() {
        doc.push_str("\n\nObserved endpoints:");
        for pair in &accessor.endpoints {
            doc.push_str(&format!("\n- {}", doc_text(pair)));
        }
    }

    doc.push_str(&format!(
        "\n\nQuery template: {}",
        doc_text(&accessor.query_template(None, &Default::default()))
    ));
    doc
}

/// Names from the store may contain anything; keep doc comments on one line each
fn doc_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn string_list(names: Vec<&str>) -> String {
    names
        .iter()
        .map(|n| format!("{:?}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw string literal delimited by enough `#`s to hold `text`
pub fn raw_string_literal(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '#' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}

/// Recover the schema snapshot embedded in a previously emitted module
pub fn extract_schema(source: &str) -> GraphResult<SchemaSnapshot> {
    let start = source
        .find(SCHEMA_CONST)
        .ok_or_else(|| GraphError::schema("No SCHEMA_JSON literal found in module"))?;
    let literal = &source[start + SCHEMA_CONST.len()..];

    let literal = literal
        .strip_prefix('r')
        .ok_or_else(|| GraphError::schema("SCHEMA_JSON is not a raw string literal"))?;
    let hashes = literal.chars().take_while(|c| *c == '#').count();
    let body = literal[hashes..]
        .strip_prefix('"')
        .ok_or_else(|| GraphError::schema("Malformed SCHEMA_JSON literal"))?;

    let closing = format!("\"{}", "#".repeat(hashes));
    let end = body
        .find(&closing)
        .ok_or_else(|| GraphError::schema("Unterminated SCHEMA_JSON literal"))?;
    SchemaSnapshot::from_json(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::synthesizer::AccessorSynthesizer;
    use crate::schema::{EndpointPair, EntitySchema};
    use crate::types::StoreType;

    fn metadata() -> ModuleMetadata {
        ModuleMetadata {
            graph_name: "movies".into(),
            generated_at: "2024-05-01T12:00:00Z".into(),
            source: "bolt://localhost:7687 (database 'neo4j')".into(),
            connection: ConnectionConfig::new("bolt://localhost:7687", "neo4j", "hunter2", "neo4j"),
        }
    }

    fn snapshot() -> SchemaSnapshot {
        let mut snapshot = SchemaSnapshot::new();
        let mut person = EntitySchema::node("Person");
        person.observe("name", StoreType::String);
        person.observe("age", StoreType::Integer);
        person.observe("tags", StoreType::List);
        snapshot.add_label(person);
        snapshot.add_label(EntitySchema::node("Category"));

        let mut knows = EntitySchema::relationship("KNOWS");
        knows.observe("since", StoreType::Integer);
        knows.observe("since", StoreType::String);
        knows.add_endpoint(EndpointPair::new(vec!["Person".into()], vec!["Person".into()]));
        snapshot.add_relationship_type(knows);
        snapshot
    }

    fn emit(snapshot: &SchemaSnapshot) -> String {
        let accessors = AccessorSynthesizer::new().synthesize(snapshot);
        ModuleEmitter::new(metadata()).emit(snapshot, &accessors).unwrap()
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let code = emit(&snapshot());
        let order = [
            "//! Graph module `movies`",
            "pub const URI: &str",
            "pub async fn execute_query",
            "pub fn normalize_nodes",
            "pub const SCHEMA_JSON",
            "pub mod nodes {",
            "pub mod edges {",
        ];
        let positions: Vec<usize> = order.iter().map(|s| code.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", code);
    }

    #[test]
    fn test_header_and_connection_block() {
        let code = emit(&snapshot());
        assert!(code.contains("//! Generated at: 2024-05-01T12:00:00Z"));
        assert!(code.contains(&format!("//! Generator: graphmod {}", GENERATOR_VERSION)));
        assert!(code.contains("//! Driver: neo4rs"));
        assert!(code.contains("pub const URI: &str = \"bolt://localhost:7687\";"));
        assert!(code.contains("pub const PASSWORD_ENV: &str = \"NEO4J_PASSWORD\";"));
        assert!(!code.contains("hunter2"));
    }

    fn signature<'a>(code: &'a str, name: &str) -> &'a str {
        let start = code.find(&format!("pub async fn {}(", name)).unwrap();
        let end = start + code[start..].find('{').unwrap();
        &code[start..end]
    }

    #[test]
    fn test_accessor_bodies() {
        let code = emit(&snapshot());
        let person = signature(&code, "person");
        assert!(person.contains("client: &GraphClient"));
        assert!(person.contains("id: Option<i64>"));
        assert!(person.contains("mut filter: PropertyFilter"));
        assert!(person.contains("-> GraphResult<Vec<NodeRecord>>"));
        assert!(code.contains("filter.coerce(\"Person\", \"age\", &[StoreType::Integer])?;"));
        assert!(code.contains("filter.coerce(\"Person\", \"name\", &[StoreType::String])?;"));
        assert!(!code.contains("\"tags\", &["));
        assert!(code.contains("client.match_nodes(\"Person\", id, filter).await"));

        let category = signature(&code, "category");
        assert!(category.contains("filter: PropertyFilter"));
        assert!(!category.contains("mut filter"));

        let knows = signature(&code, "knows");
        assert!(knows.contains("-> GraphResult<Vec<EdgeTriple>>"));
        assert!(code.contains(
            "filter.coerce(\"KNOWS\", \"since\", &[StoreType::String, StoreType::Integer])?;"
        ));
        assert!(code.contains("client.match_edges(\"KNOWS\", id, filter).await"));
        assert!(code.contains("/// - (:Person)->(:Person)"));
    }

    #[test]
    fn test_unusual_names_stay_in_literals() {
        let mut snapshot = SchemaSnapshot::new();
        let mut weird = EntitySchema::node("Bad\"Label\nX");
        weird.observe("quote\"d", StoreType::Integer);
        snapshot.add_label(weird);

        let code = emit(&snapshot);
        assert!(code.contains("pub async fn bad_label_x("));
        assert!(code.contains("filter.coerce(\"Bad\\\"Label\\nX\", \"quote\\\"d\", &[StoreType::Integer])?;"));
    }

    fn assert_valid_rust(code: &str) -> syn::File {
        syn::parse_file(code).unwrap_or_else(|e| {
            panic!("Generated code is not valid Rust:\n{}\n\nError: {}", code, e)
        })
    }

    fn namespace_fns(file: &syn::File, namespace: &str) -> Vec<String> {
        file.items
            .iter()
            .find_map(|item| match item {
                syn::Item::Mod(module) if module.ident == namespace => module.content.as_ref(),
                _ => None,
            })
            .map(|(_, items)| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        syn::Item::Fn(function) => Some(function.sig.ident.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_emitted_module_parses() {
        let file = assert_valid_rust(&emit(&snapshot()));
        assert_eq!(file.attrs.len(), 8, "header lines are inner doc attributes");
        assert_eq!(namespace_fns(&file, "nodes"), vec!["person", "category"]);
        assert_eq!(namespace_fns(&file, "edges"), vec!["knows"]);
    }

    #[test]
    fn test_awkward_names_still_parse() {
        let mut snapshot = SchemaSnapshot::new();
        for label in ["type", "self", "Self", "Foo-Bar", "foo_bar", "2024 Event"] {
            let mut entity = EntitySchema::node(label);
            entity.observe("match", StoreType::Boolean);
            snapshot.add_label(entity);
        }
        let mut weird = EntitySchema::node("Bad\"Label\u{1b}X#");
        weird.observe("quote\"d\t## */", StoreType::Integer);
        weird.observe("tags", StoreType::List);
        snapshot.add_label(weird);

        let mut metadata = metadata();
        metadata.graph_name = "odd\ngraph".into();
        metadata.source = "bolt://host\r\n//! injected".into();
        let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
        let code = ModuleEmitter::new(metadata).emit(&snapshot, &accessors).unwrap();

        let file = assert_valid_rust(&code);
        assert_eq!(
            namespace_fns(&file, "nodes"),
            vec!["r#type", "self_", "self_2", "foo_bar", "foo_bar_2", "_2024_event", "bad_label_x"]
        );
        assert!(namespace_fns(&file, "edges").is_empty());
        assert_eq!(extract_schema(&code).unwrap(), snapshot);
    }

    #[test]
    fn test_schema_literal_round_trips() {
        let mut snapshot = snapshot();
        let mut hashes = EntitySchema::node("Tag\"#");
        hashes.observe("x\"##", StoreType::String);
        snapshot.add_label(hashes);

        let code = emit(&snapshot);
        assert_eq!(extract_schema(&code).unwrap(), snapshot);
    }

    #[test]
    fn test_raw_string_literal() {
        assert_eq!(raw_string_literal("{}"), "r#\"{}\"#");
        assert_eq!(raw_string_literal("a\"#b"), "r##\"a\"#b\"##");
    }

    #[test]
    fn test_extract_schema_errors() {
        assert!(extract_schema("fn main() {}").is_err());
        assert!(extract_schema("pub const SCHEMA_JSON: &str = r#\"{\"labels\": [").is_err());
    }
}
