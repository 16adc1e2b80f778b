//! Loading and saving of values documents.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ValuesError, ValuesResult};
use crate::value::{ConfigMap, ConfigValue};

/// An ordered, arbitrarily nested values document.
///
/// The document is owned by the caller for the duration of a request. The
/// console never invents keys: editing only replaces values or appends
/// entries to existing sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    root: ConfigMap,
}

impl ConfigDocument {
    /// Create a document from an already-built mapping.
    #[must_use]
    pub fn new(root: ConfigMap) -> Self {
        Self { root }
    }

    /// The top-level mapping.
    #[must_use]
    pub fn root(&self) -> &ConfigMap {
        &self.root
    }

    /// Parse a document from YAML text.
    ///
    /// An empty (or all-null) document parses to an empty mapping. Any other
    /// non-mapping top level is rejected up front rather than propagated as a
    /// partially-usable structure.
    pub fn from_yaml_str(input: &str) -> ValuesResult<Self> {
        let value: ConfigValue = serde_yaml::from_str(input).map_err(ValuesError::Parse)?;
        match value {
            ConfigValue::Mapping(root) => Ok(Self { root }),
            ConfigValue::Null => Ok(Self::default()),
            _ => Err(ValuesError::NotAMapping),
        }
    }

    /// Load a document from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ValuesResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ValuesError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Serialise the document to canonical YAML.
    pub fn to_yaml(&self) -> ValuesResult<String> {
        serde_yaml::to_string(&self.root).map_err(ValuesError::Serialise)
    }

    /// Write the document to a YAML file, replacing any prior content.
    pub fn save(&self, path: impl AsRef<Path>) -> ValuesResult<()> {
        let path = path.as_ref();
        let text = self.to_yaml()?;
        std::fs::write(path, text).map_err(|source| ValuesError::Write {
            path: path.to_owned(),
            source,
        })
    }
}
