//! Core types for the module generator: store type tags and errors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Store-native property type tag as reported by schema introspection.
///
/// Tags are parsed from any of the dialects a Neo4j instance may report
/// (`apoc.meta.type`, `valueType()`, `db.schema.nodeTypeProperties()`), so the
/// same property yields the same tag regardless of the probe used.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Map,
    Date,
    DateTime,
    LocalDateTime,
    Time,
    LocalTime,
    Duration,
    Point,
    Bytes,
    /// Any tag the mapper does not recognize, preserved verbatim
    Unknown(String),
}

impl StoreType {
    /// Parse a raw tag reported by the store. Never fails: unrecognized tags
    /// become [`StoreType::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let tag = raw.trim();
        let tag = tag.strip_suffix(" NOT NULL").unwrap_or(tag).trim();
        let upper = tag.to_ascii_uppercase();

        if upper.ends_with("[]")
            || upper.ends_with("ARRAY")
            || upper.starts_with("LIST")
        {
            return StoreType::List;
        }

        match upper.as_str() {
            "STRING" | "CHAR" => StoreType::String,
            "INTEGER" | "LONG" | "INT" | "SHORT" | "BYTE" => StoreType::Integer,
            "FLOAT" | "DOUBLE" => StoreType::Float,
            "BOOLEAN" | "BOOL" => StoreType::Boolean,
            "MAP" => StoreType::Map,
            "DATE" => StoreType::Date,
            "DATE_TIME" | "DATETIME" | "ZONED DATETIME" | "ZONED_DATE_TIME" => StoreType::DateTime,
            "LOCAL_DATE_TIME" | "LOCALDATETIME" | "LOCAL DATETIME" => StoreType::LocalDateTime,
            "TIME" | "ZONED TIME" | "ZONED_TIME" => StoreType::Time,
            "LOCAL_TIME" | "LOCALTIME" | "LOCAL TIME" => StoreType::LocalTime,
            "DURATION" => StoreType::Duration,
            "POINT" => StoreType::Point,
            "BYTES" | "BYTE_ARRAY" => StoreType::Bytes,
            _ => StoreType::Unknown(tag.to_string()),
        }
    }

    /// Get the Rust type name a generated accessor exposes for this tag
    pub fn rust_type(&self) -> &'static str {
        match self {
            StoreType::String => "String",
            StoreType::Integer => "i64",
            StoreType::Float => "f64",
            StoreType::Boolean => "bool",
            _ => "serde_json::Value",
        }
    }

    /// Scalar tags are validated and coerced at call time; everything else is
    /// passed through untouched.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            StoreType::String | StoreType::Integer | StoreType::Float | StoreType::Boolean
        )
    }

    /// Canonical tag name, used in error messages and emitted code
    pub fn tag(&self) -> &str {
        match self {
            StoreType::String => "STRING",
            StoreType::Integer => "INTEGER",
            StoreType::Float => "FLOAT",
            StoreType::Boolean => "BOOLEAN",
            StoreType::List => "LIST",
            StoreType::Map => "MAP",
            StoreType::Date => "DATE",
            StoreType::DateTime => "DATE_TIME",
            StoreType::LocalDateTime => "LOCAL_DATE_TIME",
            StoreType::Time => "TIME",
            StoreType::LocalTime => "LOCAL_TIME",
            StoreType::Duration => "DURATION",
            StoreType::Point => "POINT",
            StoreType::Bytes => "BYTES",
            StoreType::Unknown(tag) => tag,
        }
    }

    /// Rust expression constructing this tag, for emitted code
    pub fn rust_expr(&self) -> String {
        match self {
            StoreType::Unknown(tag) => format!("StoreType::Unknown({:?}.to_string())", tag),
            other => format!("StoreType::{:?}", other),
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Error taxonomy shared by the generator and by generated modules
#[derive(Error, Debug)]
pub enum GraphError {
    /// Store unreachable or authentication failure
    #[error("Connection error: {reason}")]
    Connection { reason: String },

    /// Malformed or store-rejected query
    #[error("Query failed: {reason}")]
    Query { reason: String },

    /// A filter value could not be validated or coerced to its schema type
    #[error("Type mismatch for '{entity}.{property}': expected {expected}, got {actual}")]
    TypeMismatch {
        entity: String,
        property: String,
        expected: String,
        actual: String,
    },

    /// Output could not be written
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is unusable for generation
    #[error("Schema error: {reason}")]
    Schema { reason: String },

    /// Invalid connection or generation settings
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// Snapshot literal or record (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl GraphError {
    /// Create a Connection error
    pub fn connection<R: AsRef<str>>(reason: R) -> Self {
        Self::Connection {
            reason: reason.as_ref().to_string(),
        }
    }

    /// Create a Query error
    pub fn query<R: AsRef<str>>(reason: R) -> Self {
        Self::Query {
            reason: reason.as_ref().to_string(),
        }
    }

    /// Create a TypeMismatch error
    pub fn type_mismatch<E: AsRef<str>, P: AsRef<str>, Ex: AsRef<str>, A: AsRef<str>>(
        entity: E,
        property: P,
        expected: Ex,
        actual: A,
    ) -> Self {
        Self::TypeMismatch {
            entity: entity.as_ref().to_string(),
            property: property.as_ref().to_string(),
            expected: expected.as_ref().to_string(),
            actual: actual.as_ref().to_string(),
        }
    }

    /// Create an Io error bound to the path that failed
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Schema error
    pub fn schema<R: AsRef<str>>(reason: R) -> Self {
        Self::Schema {
            reason: reason.as_ref().to_string(),
        }
    }

    /// Create a Configuration error
    pub fn configuration<R: AsRef<str>>(reason: R) -> Self {
        Self::Configuration {
            reason: reason.as_ref().to_string(),
        }
    }

    /// Only call-time validation failures can be handled by the caller; every
    /// other variant aborts a generation run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(error: serde_json::Error) -> Self {
        GraphError::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<neo4rs::Error> for GraphError {
    fn from(error: neo4rs::Error) -> Self {
        use neo4rs::Error as E;
        match error {
            E::IOError { .. }
            | E::UrlParseError(_)
            | E::UnsupportedScheme(_)
            | E::InvalidDnsName(_)
            | E::ConnectionError
            | E::AuthenticationError(_)
            | E::InvalidConfig => GraphError::connection(error.to_string()),
            E::Neo4j(ref inner) if inner.code().starts_with("Neo.ClientError.Security.") => {
                GraphError::connection(error.to_string())
            }
            other => GraphError::query(other.to_string()),
        }
    }
}

impl From<neo4rs::DeError> for GraphError {
    fn from(error: neo4rs::DeError) -> Self {
        GraphError::Serialization {
            message: error.to_string(),
        }
    }
}

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
