//! End-to-end checks of introspection, accessor synthesis and module emission
//! against the in-memory graph backend.

use graphmod_sdk::codegen::{
    AccessorOutput, AccessorSynthesizer, GenerationOptions, ModuleGenerator, extract_schema,
};
use graphmod_sdk::introspect::SchemaIntrospector;
use graphmod_sdk::runtime::{GraphClient, PropertyFilter};
use graphmod_sdk::schema::SchemaDiff;
use graphmod_sdk::store::{NodeRecord, RelationshipRecord};
use graphmod_sdk::testing::MemoryGraph;
use graphmod_sdk::types::{GraphError, StoreType};
use serde_json::json;
use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

async fn social_graph() -> Arc<MemoryGraph> {
    let graph = Arc::new(MemoryGraph::new().with_server_timestamp("2024-05-01T12:00:00Z"));
    let ada = graph
        .add_node(&["Person"], json!({"name": "Ada", "age": 36}))
        .await
        .unwrap();
    let alan = graph
        .add_node(&["Person"], json!({"name": "Alan", "age": 41}))
        .await
        .unwrap();
    graph.add_node(&["Category"], json!({})).await.unwrap();
    graph
        .add_relationship(ada.id, alan.id, "KNOWS", json!({"since": 1936}))
        .await
        .unwrap();
    graph
}

fn options(dir: &TempDir) -> GenerationOptions {
    GenerationOptions {
        output_dir: dir.path().to_path_buf(),
        graph_name: "social".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_node_accessor_returns_uniform_records() {
    let graph = Arc::new(MemoryGraph::new());
    graph
        .add_node(&["Person"], json!({"name": "Ada", "age": 36}))
        .await
        .unwrap();

    let snapshot = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();
    let person = snapshot.label("Person").unwrap();
    assert_eq!(
        person.property("name").unwrap().types,
        BTreeSet::from([StoreType::String])
    );
    assert_eq!(
        person.property("age").unwrap().types,
        BTreeSet::from([StoreType::Integer])
    );

    let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
    let client = GraphClient::new(graph.clone());
    let output = accessors
        .find("Person")
        .unwrap()
        .invoke(&client, None, PropertyFilter::new())
        .await
        .unwrap();

    let value = serde_json::to_value(&output).unwrap();
    let id = value[0]["id"].as_i64().unwrap();
    assert_eq!(
        value,
        json!([{"id": id, "labels": ["Person"], "props": {"name": "Ada", "age": 36}}])
    );
}

#[tokio::test]
async fn test_non_coercible_filter_is_rejected() {
    let graph = social_graph().await;
    let snapshot = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();
    let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
    let client = GraphClient::new(graph.clone());

    let err = accessors
        .find("Person")
        .unwrap()
        .invoke(&client, None, PropertyFilter::new().with("age", "thirty-six"))
        .await
        .unwrap_err();

    match err {
        GraphError::TypeMismatch {
            entity,
            property,
            expected,
            actual,
        } => {
            assert_eq!(entity, "Person");
            assert_eq!(property, "age");
            assert_eq!(expected, "INTEGER");
            assert_eq!(actual, "STRING");
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_coercible_filter_matches() {
    let graph = social_graph().await;
    let snapshot = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();
    let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
    let client = GraphClient::new(graph.clone());

    let output = accessors
        .find("Person")
        .unwrap()
        .invoke(&client, None, PropertyFilter::new().with("age", "41"))
        .await
        .unwrap();
    let AccessorOutput::Nodes(nodes) = output else {
        panic!("node accessor returned edges");
    };
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].get("name"), Some(&json!("Alan")));
}

#[tokio::test]
async fn test_zero_property_label_is_callable() {
    let graph = social_graph().await;
    let snapshot = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();
    assert!(snapshot.label("Category").unwrap().properties.is_empty());

    let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
    let category = accessors.find("Category").unwrap();
    assert_eq!(category.fn_name, "category");

    let client = GraphClient::new(graph.clone());
    let AccessorOutput::Nodes(nodes) = category
        .invoke(&client, None, PropertyFilter::new())
        .await
        .unwrap()
    else {
        panic!("node accessor returned edges");
    };
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].props.is_empty());
}

#[tokio::test]
async fn test_relationship_accessor_returns_triples() {
    let graph = social_graph().await;
    let snapshot = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();
    let knows = snapshot.relationship_type("KNOWS").unwrap();
    assert_eq!(knows.endpoints.len(), 1);

    let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
    let client = GraphClient::new(graph.clone());
    let AccessorOutput::Edges(edges) = accessors
        .find("KNOWS")
        .unwrap()
        .invoke(&client, None, PropertyFilter::new())
        .await
        .unwrap()
    else {
        panic!("relationship accessor returned nodes");
    };

    assert_eq!(edges.len(), 1);
    let (source, relationship, target): (NodeRecord, RelationshipRecord, NodeRecord) =
        edges[0].clone().into();
    assert_eq!(source.get("name"), Some(&json!("Ada")));
    assert_eq!(relationship.rel_type, "KNOWS");
    assert_eq!(relationship.start_id, source.id);
    assert_eq!(relationship.end_id, target.id);
    assert_eq!(target.get("name"), Some(&json!("Alan")));
}

#[tokio::test]
async fn test_lookup_by_identity() {
    let graph = social_graph().await;
    let snapshot = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();
    let accessors = AccessorSynthesizer::new().synthesize(&snapshot);
    let client = GraphClient::new(graph.clone());
    let person = accessors.find("Person").unwrap();

    let AccessorOutput::Nodes(all) = person
        .invoke(&client, None, PropertyFilter::new())
        .await
        .unwrap()
    else {
        panic!("node accessor returned edges");
    };
    for node in &all {
        let AccessorOutput::Nodes(found) = person
            .invoke(&client, Some(node.id), PropertyFilter::new())
            .await
            .unwrap()
        else {
            panic!("node accessor returned edges");
        };
        assert_eq!(found, vec![node.clone()]);
    }
}

#[tokio::test]
async fn test_generation_is_idempotent() {
    let graph = social_graph().await;
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();

    let mut generator = ModuleGenerator::new();
    generator
        .generate(graph.as_ref(), &options(&first_dir))
        .await
        .unwrap();
    generator
        .generate(graph.as_ref(), &options(&second_dir))
        .await
        .unwrap();

    let first = fs::read_to_string(first_dir.path().join("socialgraph.rs")).unwrap();
    let second = fs::read_to_string(second_dir.path().join("socialgraph.rs")).unwrap();
    assert_eq!(first, second);

    let snapshot = extract_schema(&first).unwrap();
    assert!(SchemaDiff::between(&snapshot, &extract_schema(&second).unwrap()).is_empty());
    assert_eq!(generator.accessors(&snapshot).len(), 3);
}

#[tokio::test]
async fn test_generated_module_covers_every_entity() {
    let graph = social_graph().await;
    let temp_dir = TempDir::new().unwrap();

    let result = ModuleGenerator::new()
        .generate(graph.as_ref(), &options(&temp_dir))
        .await
        .unwrap();
    assert_eq!(result.label_count, 2);
    assert_eq!(result.relationship_type_count, 1);

    let code = fs::read_to_string(temp_dir.path().join("socialgraph.rs")).unwrap();
    assert!(code.contains("pub async fn person("));
    assert!(code.contains("pub async fn category("));
    assert!(code.contains("pub async fn knows("));
    assert!(code.contains("filter.coerce(\"Person\", \"age\", &[StoreType::Integer])?;"));
    assert!(code.contains("//! Source: memory://graph"));
}

#[tokio::test]
async fn test_schema_change_shows_in_diff() {
    let graph = social_graph().await;
    let before = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();

    graph
        .add_node(&["Person"], json!({"name": "Grace", "age": "old"}))
        .await
        .unwrap();
    let after = SchemaIntrospector::new(graph.as_ref()).snapshot().await.unwrap();

    let diff = SchemaDiff::between(&before, &after);
    assert_eq!(diff.len(), 1);
    assert!(diff.to_string().contains("Person.age"));
}

#[tokio::test]
async fn test_unreachable_store_leaves_module_intact() {
    let graph = social_graph().await;
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("socialgraph.rs");
    fs::write(&path, "// previous module\n").unwrap();

    graph.set_unreachable(true);
    let err = ModuleGenerator::new()
        .generate(graph.as_ref(), &options(&temp_dir))
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::Connection { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "// previous module\n");
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}
