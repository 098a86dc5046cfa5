use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::parse_context::{AccessorInfo, PathSegment};
use crate::types::{StyleValue, ValueType};

/// A typed value resolved for one accessor out of a raw feature or
/// variable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedValue {
    pub slug: String,
    pub value_type: ValueType,
    pub value: StyleValue,
}

/// Resolve every registered accessor against a raw nested object,
/// producing the flat lookup the evaluation context is built from.
///
/// An accessor whose path does not resolve uses its default when one is
/// set and is omitted otherwise. A leaf that cannot be coerced into the
/// registered type is also omitted; the accessor then evaluates as
/// undefined rather than failing the render pass.
pub fn process_accessor_values(
    raw: &Value,
    accessors: &HashMap<String, AccessorInfo>,
) -> HashMap<String, ProcessedValue> {
    let mut processed = HashMap::with_capacity(accessors.len());

    for (key, info) in accessors.iter() {
        let leaf = match walk(raw, &info.path) {
            Some(leaf) => Some(leaf),
            None => info.default.as_ref(),
        };

        let leaf = match leaf {
            Some(leaf) => leaf,
            None => continue,
        };

        if let Ok(value) = StyleValue::coerce(leaf, info.value_type) {
            processed.insert(
                key.clone(),
                ProcessedValue {
                    slug: info.slug.clone(),
                    value_type: info.value_type,
                    value,
                },
            );
        }
    }

    processed
}

fn walk<'a>(raw: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    let mut current = raw;

    for segment in path.iter() {
        current = match segment {
            PathSegment::Key(key) => current.as_object()?.get(key)?,
            PathSegment::Index(idx) => current.as_array()?.get(*idx)?,
        };
    }

    Some(current)
}
