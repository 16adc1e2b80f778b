//! Template derivation for lists of records.
//!
//! A document may contain sequences of mappings anywhere in its nesting, for
//! example a list of subscriber profiles. For each such sequence the console
//! offers a blank entry to append; the blank is derived here by zeroing the
//! sequence's first element, which acts as the schema sample.

use indexmap::IndexMap;

use crate::document::ConfigDocument;
use crate::value::{ConfigMap, ConfigValue};

/// A zero-valued record with the same keys as the sampled sequence element.
pub type TemplateRecord = ConfigMap;

/// Derive a template record for every sequence-of-records in the document.
///
/// Keys are dotted paths from the document root ("amf.interfaces"). Only
/// non-empty sequences whose first element is a mapping are templated:
/// sequences of scalars have no record schema to infer, and empty sequences
/// have no sample at all, so neither produces an entry. A missing entry and
/// an empty record are distinct conditions for a consumer, and that asymmetry
/// is deliberate.
///
/// The function is pure: the document is only read, and the returned records
/// share no structure with it.
#[must_use]
pub fn derive_templates(doc: &ConfigDocument) -> IndexMap<String, TemplateRecord> {
    let mut templates = IndexMap::new();
    walk_mapping(doc.root(), "", &mut templates);
    templates
}

/// Depth-first walk over mapping nodes.
///
/// Sequence elements are not descended into; a sequence either yields a
/// template from its first element or nothing.
fn walk_mapping(map: &ConfigMap, path: &str, out: &mut IndexMap<String, TemplateRecord>) {
    for (key, value) in map {
        let child_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };

        match value {
            ConfigValue::Sequence(items) => {
                if let Some(ConfigValue::Mapping(first)) = items.first() {
                    let record = first
                        .iter()
                        .map(|(k, v)| (k.clone(), v.zeroed()))
                        .collect();
                    out.insert(child_path, record);
                }
            }
            ConfigValue::Mapping(nested) => walk_mapping(nested, &child_path, out),
            _ => {}
        }
    }
}
