//! The closed tagged-value variant underlying a configuration document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered mapping of keys to configuration values.
///
/// Insertion order is preserved so a document round-trips through load and
/// save with its keys in the original order.
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// A single value inside a configuration document.
///
/// The variant order matters for deserialisation: untagged matching tries
/// variants top to bottom, so booleans must precede integers and integers
/// must precede floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// An explicit null (or absent) value.
    Null,

    /// A boolean.
    Bool(bool),

    /// A signed integer.
    Integer(i64),

    /// A floating-point number.
    Float(f64),

    /// A string.
    String(String),

    /// An ordered sequence of values.
    Sequence(Vec<ConfigValue>),

    /// A nested mapping.
    Mapping(ConfigMap),
}

impl ConfigValue {
    /// Returns the zero value for this value's type.
    ///
    /// Strings become empty, integers `0`, floats `0.0`, booleans `false`,
    /// sequences empty, and mappings keep their keys with every value zeroed
    /// recursively. Nulls stay null. The result depends only on the shape of
    /// the input, so the function is idempotent.
    #[must_use]
    pub fn zeroed(&self) -> ConfigValue {
        match self {
            Self::Null => Self::Null,
            Self::Bool(_) => Self::Bool(false),
            Self::Integer(_) => Self::Integer(0),
            Self::Float(_) => Self::Float(0.0),
            Self::String(_) => Self::String(String::new()),
            Self::Sequence(_) => Self::Sequence(Vec::new()),
            Self::Mapping(map) => Self::Mapping(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.zeroed()))
                    .collect(),
            ),
        }
    }

    /// Returns the nested mapping if this value is one.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&ConfigMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_mapping() -> ConfigValue {
        let yaml = r"
            name: amf
            replicas: 2
            cpu: 0.5
            enabled: true
            ports: [80, 443]
            extra: ~
        ";
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn scalars_zero_per_type() {
        assert_eq!(
            ConfigValue::String("hi".to_owned()).zeroed(),
            ConfigValue::String(String::new())
        );
        assert_eq!(ConfigValue::Integer(42).zeroed(), ConfigValue::Integer(0));
        assert_eq!(ConfigValue::Float(2.5).zeroed(), ConfigValue::Float(0.0));
        assert_eq!(ConfigValue::Bool(true).zeroed(), ConfigValue::Bool(false));
        assert_eq!(ConfigValue::Null.zeroed(), ConfigValue::Null);
    }

    #[test]
    fn sequences_zero_to_empty() {
        let seq = ConfigValue::Sequence(vec![ConfigValue::Integer(1), ConfigValue::Integer(2)]);
        assert_eq!(seq.zeroed(), ConfigValue::Sequence(Vec::new()));
    }

    #[test]
    fn mappings_zero_recursively_keeping_keys() {
        let zeroed = sample_mapping().zeroed();
        let map = zeroed.as_mapping().unwrap();

        assert_eq!(map.len(), 6);
        assert_eq!(map["name"], ConfigValue::String(String::new()));
        assert_eq!(map["replicas"], ConfigValue::Integer(0));
        assert_eq!(map["cpu"], ConfigValue::Float(0.0));
        assert_eq!(map["enabled"], ConfigValue::Bool(false));
        assert_eq!(map["ports"], ConfigValue::Sequence(Vec::new()));
        assert_eq!(map["extra"], ConfigValue::Null);
    }

    #[test]
    fn zeroed_is_idempotent() {
        let value = sample_mapping();
        assert_eq!(value.zeroed().zeroed(), value.zeroed());
    }

    #[test]
    fn yaml_types_map_to_expected_variants() {
        let value: ConfigValue = serde_yaml::from_str("count: 3\nratio: 1.5").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map["count"], ConfigValue::Integer(3));
        assert_eq!(map["ratio"], ConfigValue::Float(1.5));
    }

    #[test]
    fn serialises_to_json_as_well_as_yaml() {
        let value = sample_mapping();
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"replicas\":2"));
    }
}
