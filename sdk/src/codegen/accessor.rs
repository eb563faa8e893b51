//! Structured accessor specification

use crate::runtime::{GraphClient, PropertyFilter};
use crate::schema::{EntityKind, PropertySpec};
use crate::store::{EdgeTriple, NodeRecord, Properties, cypher};
use crate::types::{GraphResult, StoreType};
use serde::Serialize;

/// One known property of the accessor's entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorParam {
    pub property: String,
    /// Rust type the property maps to
    pub rust_type: &'static str,
    /// Accepted tags, in coercion order
    pub types: Vec<StoreType>,
    /// False for opaque properties, which are passed through unchecked
    pub validated: bool,
}

impl AccessorParam {
    pub fn from_spec(spec: &PropertySpec) -> Self {
        Self {
            property: spec.name.clone(),
            rust_type: spec.rust_type(),
            types: spec.types.iter().cloned().collect(),
            validated: !spec.is_opaque(),
        }
    }

    /// Tags joined with `|`
    pub fn expected(&self) -> String {
        self.types
            .iter()
            .map(|t| t.tag())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Everything needed to emit, or run in process, one accessor function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAccessor {
    /// Label or relationship type the accessor is scoped to
    pub entity: String,
    pub kind: EntityKind,
    /// Rust function name, already escaped
    pub fn_name: String,
    pub params: Vec<AccessorParam>,
    /// Observed endpoint pairs, for documentation only
    pub endpoints: Vec<String>,
}

/// Records returned by an in-process accessor call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AccessorOutput {
    Nodes(Vec<NodeRecord>),
    Edges(Vec<EdgeTriple>),
}

impl AccessorOutput {
    pub fn len(&self) -> usize {
        match self {
            AccessorOutput::Nodes(nodes) => nodes.len(),
            AccessorOutput::Edges(edges) => edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GeneratedAccessor {
    /// Parameters that get a validation step
    pub fn validations(&self) -> impl Iterator<Item = &AccessorParam> {
        self.params.iter().filter(|p| p.validated)
    }

    pub fn param(&self, property: &str) -> Option<&AccessorParam> {
        self.params.iter().find(|p| p.property == property)
    }

    /// Run every validation step against `filter`, coercing values in place
    pub fn validate(&self, filter: &mut PropertyFilter) -> GraphResult<()> {
        for param in self.validations() {
            filter.coerce(&self.entity, &param.property, &param.types)?;
        }
        Ok(())
    }

    /// Query text for a call with the given identity and filter keys
    pub fn query_template(&self, id: Option<i64>, filter: &Properties) -> String {
        match self.kind {
            EntityKind::Node => cypher::match_nodes(&self.entity, id, filter, None).text,
            EntityKind::Relationship => cypher::match_relationships(&self.entity, id, filter).text,
        }
    }

    /// Call the accessor in process, with the same checks the emitted code performs
    pub async fn invoke(
        &self,
        client: &GraphClient,
        id: Option<i64>,
        mut filter: PropertyFilter,
    ) -> GraphResult<AccessorOutput> {
        self.validate(&mut filter)?;
        match self.kind {
            EntityKind::Node => Ok(AccessorOutput::Nodes(
                client.match_nodes(&self.entity, id, filter).await?,
            )),
            EntityKind::Relationship => Ok(AccessorOutput::Edges(
                client.match_edges(&self.entity, id, filter).await?,
            )),
        }
    }
}
