//! Helmdeck values model
//!
//! This crate provides the configuration document model used by the helmdeck
//! console: an ordered, arbitrarily nested mapping of scalar values, sequences
//! and sub-mappings, loaded from and saved to YAML.
//!
//! On top of the model it implements template derivation: for every
//! list-of-records found anywhere in a document, a zero-valued record with the
//! same keys is derived from the list's first element. A UI uses these records
//! to let an operator append a blank entry to the list.
//!
//! # Example
//!
//! ```
//! use helmdeck_values::{derive_templates, ConfigDocument};
//!
//! let doc = ConfigDocument::from_yaml_str(
//!     "subscribers:\n  - imsi: '001010000000001'\n    count: 10\n",
//! )
//! .unwrap();
//!
//! let templates = derive_templates(&doc);
//! assert!(templates.contains_key("subscribers"));
//! ```

#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod template;
pub mod value;

// Re-export commonly used types at the crate root
pub use document::ConfigDocument;
pub use error::{ValuesError, ValuesResult};
pub use template::{derive_templates, TemplateRecord};
pub use value::{ConfigMap, ConfigValue};
