//! Open property-filter record passed to generated accessors

use super::coerce::coerce_value;
use crate::store::Properties;
use crate::types::{GraphError, GraphResult, StoreType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property name to value filters. Keys absent from the schema are passed to
/// the store unchecked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyFilter {
    values: Properties,
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn as_properties(&self) -> &Properties {
        &self.values
    }

    pub fn into_properties(self) -> Properties {
        self.values
    }

    /// Validate the value supplied for `property`, if any, against `types`,
    /// replacing it with the coerced value. Fails with TypeMismatch when no
    /// conversion exists.
    pub fn coerce(&mut self, entity: &str, property: &str, types: &[StoreType]) -> GraphResult<()> {
        let Some(value) = self.values.get_mut(property) else {
            return Ok(());
        };

        match coerce_value(value, types) {
            Ok(coerced) => {
                *value = coerced;
                Ok(())
            }
            Err(actual) => Err(GraphError::type_mismatch(
                entity,
                property,
                types
                    .iter()
                    .map(|t| t.tag())
                    .collect::<Vec<_>>()
                    .join("|"),
                actual,
            )),
        }
    }
}

impl From<Properties> for PropertyFilter {
    fn from(values: Properties) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertyFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (key, value) in iter {
            filter.insert(key, value);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_rewrites_value() {
        let mut filter = PropertyFilter::new().with("age", "36");
        filter.coerce("Person", "age", &[StoreType::Integer]).unwrap();
        assert_eq!(filter.get("age"), Some(&json!(36)));
    }

    #[test]
    fn test_coerce_reports_type_mismatch() {
        let mut filter = PropertyFilter::new().with("age", "thirty-six");
        let err = filter
            .coerce("Person", "age", &[StoreType::Integer])
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
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_absent_and_unknown_properties() {
        let mut filter = PropertyFilter::new().with("nickname", json!([1, 2]));
        filter.coerce("Person", "age", &[StoreType::Integer]).unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get("nickname"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_collect_and_serialize() {
        let filter: PropertyFilter = vec![("name", "Ada")].into_iter().collect();
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"name": "Ada"}));
    }
}
