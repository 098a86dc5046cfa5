use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::types::ValueType;

/// One step of an accessor path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn to_json(&self) -> Value {
        match self {
            PathSegment::Key(key) => json!(key),
            PathSegment::Index(idx) => json!(idx),
        }
    }

    fn slug_part(&self) -> String {
        match self {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(idx) => idx.to_string(),
        }
    }
}

/// Metadata recorded for one unique accessor. Two accessors are the same
/// accessor iff `(path, value_type, default)` match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorInfo {
    pub path: Vec<PathSegment>,
    pub value_type: ValueType,
    pub default: Option<Value>,
    pub slug: String,
}

/// The canonical serialization of `(path, type, default)`, used as the
/// lookup key for an accessor in both the parsing context and the
/// evaluation context.
pub fn accessor_key(path: &[PathSegment], ty: ValueType, default: Option<&Value>) -> String {
    let segments: Vec<Value> = path.iter().map(|seg| seg.to_json()).collect();
    json!([segments, ty.to_string(), default]).to_string()
}

/// Mutable state accumulated over a single parse: the accessors the
/// expression reads, and whether it reads the feature id or geometry
/// type. Slug counters are scoped here; there is no global state.
#[derive(Debug, Clone, Default)]
pub struct ParsingContext {
    properties: HashMap<String, AccessorInfo>,
    variables: HashMap<String, AccessorInfo>,
    feature_id: bool,
    geometry_type: bool,
}

impl ParsingContext {
    pub fn new() -> ParsingContext {
        ParsingContext::default()
    }

    /// Register a feature-property accessor, deduplicating on
    /// `(path, type, default)`. Returns the lookup key; a repeated
    /// registration keeps the first slug.
    pub fn register_property(
        &mut self,
        path: Vec<PathSegment>,
        ty: ValueType,
        default: Option<Value>,
    ) -> String {
        register(&mut self.properties, path, ty, default)
    }

    /// Register a style-variable accessor. Variables keep their own slug
    /// counter, independent of properties.
    pub fn register_variable(
        &mut self,
        path: Vec<PathSegment>,
        ty: ValueType,
        default: Option<Value>,
    ) -> String {
        register(&mut self.variables, path, ty, default)
    }

    pub fn mark_feature_id(&mut self) {
        self.feature_id = true;
    }

    pub fn mark_geometry_type(&mut self) {
        self.geometry_type = true;
    }

    pub fn uses_feature_id(&self) -> bool {
        self.feature_id
    }

    pub fn uses_geometry_type(&self) -> bool {
        self.geometry_type
    }

    pub fn properties<'a>(&'a self) -> &'a HashMap<String, AccessorInfo> {
        &self.properties
    }

    pub fn variables<'a>(&'a self) -> &'a HashMap<String, AccessorInfo> {
        &self.variables
    }
}

fn register(
    accessors: &mut HashMap<String, AccessorInfo>,
    path: Vec<PathSegment>,
    ty: ValueType,
    default: Option<Value>,
) -> String {
    let key = accessor_key(&path, ty, default.as_ref());

    if !accessors.contains_key(&key) {
        let slug = format!(
            "{}_{}",
            path.iter()
                .map(|seg| seg.slug_part())
                .collect::<Vec<String>>()
                .join("_"),
            accessors.len()
        );
        accessors.insert(
            key.clone(),
            AccessorInfo {
                path,
                value_type: ty,
                default,
                slug,
            },
        );
    }

    key
}

#[cfg(test)]
mod test {
    use super::{ParsingContext, PathSegment};
    use crate::types::ValueType;
    use serde_json::json;

    #[test]
    fn test_register_dedup_keeps_first_slug() {
        let mut ctx = ParsingContext::new();

        let key1 = ctx.register_property(
            vec![PathSegment::Key("foo".to_owned())],
            ValueType::Number,
            None,
        );
        let key2 = ctx.register_property(
            vec![PathSegment::Key("foo".to_owned())],
            ValueType::Number,
            None,
        );

        assert_eq!(key1, key2);
        assert_eq!(ctx.properties().len(), 1);
        assert_eq!(ctx.properties()[&key1].slug, "foo_0");
    }

    #[test]
    fn test_differing_type_registers_twice() {
        let mut ctx = ParsingContext::new();

        let key1 = ctx.register_property(
            vec![PathSegment::Key("foo".to_owned())],
            ValueType::Number,
            None,
        );
        let key2 = ctx.register_property(
            vec![PathSegment::Key("foo".to_owned())],
            ValueType::String,
            None,
        );

        assert_ne!(key1, key2);
        assert_eq!(ctx.properties()[&key1].slug, "foo_0");
        assert_eq!(ctx.properties()[&key2].slug, "foo_1");
    }

    #[test]
    fn test_differing_default_registers_twice() {
        let mut ctx = ParsingContext::new();

        let key1 = ctx.register_property(
            vec![PathSegment::Key("foo".to_owned())],
            ValueType::Number,
            Some(json!(1)),
        );
        let key2 = ctx.register_property(
            vec![PathSegment::Key("foo".to_owned())],
            ValueType::Number,
            Some(json!(2)),
        );

        assert_ne!(key1, key2);
        assert_eq!(ctx.properties().len(), 2);
    }

    #[test]
    fn test_variable_counter_is_independent() {
        let mut ctx = ParsingContext::new();

        ctx.register_property(
            vec![PathSegment::Key("foo".to_owned())],
            ValueType::Number,
            None,
        );
        let key = ctx.register_variable(
            vec![PathSegment::Key("bar".to_owned())],
            ValueType::Number,
            None,
        );

        assert_eq!(ctx.variables()[&key].slug, "bar_0");
    }

    #[test]
    fn test_nested_slug() {
        let mut ctx = ParsingContext::new();

        let key = ctx.register_property(
            vec![
                PathSegment::Key("deeply".to_owned()),
                PathSegment::Key("nested".to_owned()),
                PathSegment::Key("property".to_owned()),
            ],
            ValueType::Number,
            None,
        );

        assert_eq!(ctx.properties()[&key].slug, "deeply_nested_property_0");
    }
}
